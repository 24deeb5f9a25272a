use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::composite::CompositorKind;
use crate::foundation::error::{TimemaskError, TimemaskResult};

pub const DEFAULT_DURATION_MS: u64 = 30_000;
pub const DURATION_STEP_MS: u64 = 2_500;
pub const MIN_DURATION_MS: u64 = DURATION_STEP_MS;
pub const DEFAULT_CAPACITY: usize = 128;

/// Application state owned by the host and handed to a [`crate::TemporalSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Settings {
    pub show_hud: bool,
    /// Show the mask as the main image and the composite in the inset.
    pub show_mask: bool,
    pub show_inset: bool,
    pub mirrored: bool,
    pub auto_advance: bool,
    /// How long a mask stays selected before auto-advance moves on.
    pub duration_ms: u64,
    /// Inset size as a fraction of the main view.
    pub inset_scale: f32,
    /// Number of frames of history.
    pub capacity: usize,
    pub compositor: CompositorKind,
    pub masks: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_hud: true,
            show_mask: false,
            show_inset: true,
            mirrored: false,
            auto_advance: true,
            duration_ms: DEFAULT_DURATION_MS,
            inset_scale: 0.12,
            capacity: DEFAULT_CAPACITY,
            compositor: CompositorKind::default(),
            masks: Vec::new(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> TimemaskResult<()> {
        if self.capacity == 0 {
            return Err(TimemaskError::validation("capacity must be > 0"));
        }
        if self.duration_ms < MIN_DURATION_MS {
            return Err(TimemaskError::validation(format!(
                "duration_ms must be >= {MIN_DURATION_MS}"
            )));
        }
        if !self.inset_scale.is_finite() || self.inset_scale <= 0.0 || self.inset_scale > 1.0 {
            return Err(TimemaskError::validation("inset_scale must be in (0, 1]"));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> TimemaskResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| TimemaskError::serde(format!("{}: {e}", path.display())))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> TimemaskResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings dir '{}'", parent.display()))?;
        }
        let f = File::create(path)
            .with_context(|| format!("create settings '{}'", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(f), self)
            .map_err(|e| TimemaskError::serde(format!("{}: {e}", path.display())))?;
        tracing::info!(path = %path.display(), "saved settings");
        Ok(())
    }

    pub fn increase_duration(&mut self) {
        self.duration_ms = self.duration_ms.saturating_add(DURATION_STEP_MS);
    }

    pub fn decrease_duration(&mut self) {
        self.duration_ms = self
            .duration_ms
            .saturating_sub(DURATION_STEP_MS)
            .max(MIN_DURATION_MS);
    }
}
