use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::imageops::FilterType;

use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::mask::TemporalMask;

/// Supplies masks already converted to grayscale and sized to the frame geometry.
pub trait MaskSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn label(&self, index: usize) -> String;

    fn load(&mut self, index: usize, width: u32, height: u32) -> TimemaskResult<TemporalMask>;
}

/// Image extensions accepted for masks and frame sequences.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "bmp"
            )
        })
        .unwrap_or(false)
}

/// Decode a mask image, convert it to luma and resize it to exactly `width` x `height`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_mask_file(path: &Path, width: u32, height: u32) -> TimemaskResult<TemporalMask> {
    if !is_supported_image(path) {
        return Err(TimemaskError::validation(format!(
            "unsupported mask file '{}' (expected png, jpg or bmp)",
            path.display()
        )));
    }
    let img = image::open(path).with_context(|| format!("decode mask '{}'", path.display()))?;
    let mut luma = img.to_luma8();
    if luma.dimensions() != (width, height) {
        tracing::debug!(
            from = ?luma.dimensions(),
            to = ?(width, height),
            "resizing mask"
        );
        luma = image::imageops::resize(&luma, width, height, FilterType::Triangle);
    }
    Ok(TemporalMask::from_luma_image(luma))
}

/// Mask images on disk.
#[derive(Clone, Debug, Default)]
pub struct FileMasks {
    paths: Vec<PathBuf>,
}

impl FileMasks {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl MaskSource for FileMasks {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn label(&self, index: usize) -> String {
        self.paths
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    fn load(&mut self, index: usize, width: u32, height: u32) -> TimemaskResult<TemporalMask> {
        let path = self
            .paths
            .get(index)
            .ok_or(TimemaskError::IndexOutOfRange {
                index,
                len: self.paths.len(),
            })?;
        load_mask_file(path, width, height)
    }
}

/// Masks held in memory. They must already have the requested size.
#[derive(Clone, Debug, Default)]
pub struct StaticMasks {
    masks: Vec<(String, TemporalMask)>,
}

impl StaticMasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, mask: TemporalMask) -> Self {
        self.masks.push((label.into(), mask));
        self
    }
}

impl MaskSource for StaticMasks {
    fn len(&self) -> usize {
        self.masks.len()
    }

    fn label(&self, index: usize) -> String {
        self.masks
            .get(index)
            .map(|(l, _)| l.clone())
            .unwrap_or_default()
    }

    fn load(&mut self, index: usize, width: u32, height: u32) -> TimemaskResult<TemporalMask> {
        let (label, mask) = self
            .masks
            .get(index)
            .ok_or(TimemaskError::IndexOutOfRange {
                index,
                len: self.masks.len(),
            })?;
        if mask.width() != width || mask.height() != height {
            return Err(TimemaskError::geometry(format!(
                "mask '{label}' is {}x{}, expected {width}x{height}",
                mask.width(),
                mask.height()
            )));
        }
        Ok(mask.clone())
    }
}

/// Cyclic selection over a [`MaskSource`].
pub struct MaskPlaylist {
    source: Box<dyn MaskSource>,
    index: usize,
}

impl MaskPlaylist {
    pub fn new(source: Box<dyn MaskSource>) -> TimemaskResult<Self> {
        if source.is_empty() {
            return Err(TimemaskError::validation("mask playlist is empty"));
        }
        Ok(Self { source, index: 0 })
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_label(&self) -> String {
        self.source.label(self.index)
    }

    pub fn select(&mut self, index: usize) -> TimemaskResult<()> {
        if index >= self.len() {
            return Err(TimemaskError::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    pub fn next(&mut self) -> usize {
        self.index = (self.index + 1) % self.len();
        self.index
    }

    pub fn prev(&mut self) -> usize {
        self.index = self.index.checked_sub(1).unwrap_or(self.len() - 1);
        self.index
    }

    pub fn load_current(&mut self, width: u32, height: u32) -> TimemaskResult<TemporalMask> {
        tracing::debug!(index = self.index, label = %self.current_label(), "loading mask");
        self.source.load(self.index, width, height)
    }
}

impl std::fmt::Debug for MaskPlaylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskPlaylist")
            .field("len", &self.len())
            .field("index", &self.index)
            .finish()
    }
}
