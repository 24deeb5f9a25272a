use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::command::Command;
use crate::composite::Compositor;
use crate::foundation::core::FrameDims;
use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::frame::Frame;
use crate::frame_buffer::FrameBuffer;
use crate::mask::TemporalMask;
use crate::mask_source::{FileMasks, MaskPlaylist, load_mask_file};
use crate::settings::Settings;

/// Number of remote messages kept for the HUD.
pub const MAX_MESSAGES: usize = 20;

/// What the host should do after a command was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    None,
    SettingsChanged,
    MaskChanged,
    /// The host owns the output surface and decides where the frame goes.
    SaveFrameRequested,
    SettingsReloaded,
}

/// Images to present for the current tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct View {
    pub main: Frame,
    pub inset: Option<Frame>,
}

/// One running effect: history, compositor, current mask and the host-owned settings.
///
/// Ticks must be serialized by the caller; the session holds no locks.
pub struct TemporalSession {
    frames: FrameBuffer,
    compositor: Box<dyn Compositor>,
    playlist: MaskPlaylist,
    mask: TemporalMask,
    output: Frame,
    settings: Settings,
    settings_path: Option<PathBuf>,
    last_mask_change: Duration,
    messages: VecDeque<String>,
}

impl TemporalSession {
    #[tracing::instrument(skip(settings, playlist), fields(masks = playlist.len()))]
    pub fn new(
        dims: FrameDims,
        settings: Settings,
        mut playlist: MaskPlaylist,
    ) -> TimemaskResult<Self> {
        settings.validate()?;
        let frames = FrameBuffer::new(settings.capacity, dims)?;
        let mask = playlist.load_current(dims.width, dims.height)?;
        Ok(Self {
            frames,
            compositor: settings.compositor.create(),
            playlist,
            mask,
            output: Frame::blank(dims),
            settings,
            settings_path: None,
            last_mask_change: Duration::ZERO,
            messages: VecDeque::new(),
        })
    }

    /// Persist settings to `path` whenever a command changes them, and reload from it on
    /// [`Command::LoadSettings`].
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn dims(&self) -> FrameDims {
        self.frames.dims()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    pub fn mask(&self) -> &TemporalMask {
        &self.mask
    }

    pub fn output(&self) -> &Frame {
        &self.output
    }

    pub fn playlist(&self) -> &MaskPlaylist {
        &self.playlist
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    /// Ingest `frame` and composite. `now` is the host clock, used only for auto-advance.
    pub fn tick(&mut self, frame: &Frame, now: Duration) -> TimemaskResult<&Frame> {
        if frame.dims() != self.dims() {
            return Err(TimemaskError::geometry(format!(
                "frame is {}, session expects {}",
                frame.dims(),
                self.dims()
            )));
        }

        let dwell = Duration::from_millis(self.settings.duration_ms);
        if self.settings.auto_advance && now > self.last_mask_change + dwell {
            self.playlist.next();
            self.reload_mask(now)?;
            tracing::info!(mask = %self.playlist.current_label(), "auto-advanced mask");
        }

        self.frames.push(frame)?;
        self.compositor
            .render(&self.frames, &self.mask, &mut self.output)?;
        Ok(&self.output)
    }

    pub fn handle(&mut self, command: Command, now: Duration) -> TimemaskResult<SessionEvent> {
        tracing::debug!(%command, "handling command");
        if command.apply(&mut self.settings) {
            self.persist()?;
            return Ok(SessionEvent::SettingsChanged);
        }
        match command {
            Command::NextMask => {
                self.playlist.next();
                self.reload_mask(now)?;
                Ok(SessionEvent::MaskChanged)
            }
            Command::PrevMask => {
                self.playlist.prev();
                self.reload_mask(now)?;
                Ok(SessionEvent::MaskChanged)
            }
            Command::SaveFrame => Ok(SessionEvent::SaveFrameRequested),
            Command::LoadSettings => self.reload_settings(now),
            _ => Ok(SessionEvent::None),
        }
    }

    /// Replace the current mask with an image file, leaving the playlist where it is.
    ///
    /// Restarts the auto-advance dwell.
    pub fn load_mask_path(&mut self, path: &Path, now: Duration) -> TimemaskResult<()> {
        let dims = self.dims();
        self.mask = load_mask_file(path, dims.width, dims.height)?;
        self.last_mask_change = now;
        tracing::info!(path = %path.display(), "loaded mask file");
        Ok(())
    }

    /// Log a remote message and run it if it names a command.
    pub fn handle_message(&mut self, message: &str, now: Duration) -> TimemaskResult<SessionEvent> {
        self.push_message(format!("New message: {message}"));
        match message.parse::<Command>() {
            Ok(command) => self.handle(command, now),
            Err(err) => {
                tracing::debug!(%err, "ignoring message");
                Ok(SessionEvent::None)
            }
        }
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push_back(message.into());
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    /// Main image plus optional inset, mirrored when requested.
    pub fn view(&self) -> TimemaskResult<View> {
        let mask_frame = self.mask.to_frame(self.dims().channels)?;
        let (mut main, other) = if self.settings.show_mask {
            (mask_frame, self.output.clone())
        } else {
            (self.output.clone(), mask_frame)
        };

        let mut inset = if self.settings.show_inset {
            let w = ((self.dims().width as f32 * self.settings.inset_scale).round() as u32).max(1);
            let h = ((self.dims().height as f32 * self.settings.inset_scale).round() as u32).max(1);
            Some(other.scaled_nearest(w, h)?)
        } else {
            None
        };

        if self.settings.mirrored {
            main.flip_horizontal()?;
            if let Some(inset) = inset.as_mut() {
                inset.flip_horizontal()?;
            }
        }
        Ok(View { main, inset })
    }

    pub fn hud_lines(&self, fps: f64) -> Vec<String> {
        let s = &self.settings;
        let mut lines = vec![
            format!("      Frame rate: {fps:.2}"),
            format!(
                "      Mask: {} ({}/{})",
                self.playlist.current_label(),
                self.playlist.index() + 1,
                self.playlist.len()
            ),
            format!(
                "      History: {}/{} frames, {}",
                self.frames.len(),
                self.frames.capacity(),
                self.compositor.kind().as_str()
            ),
            format!(" (H)  HUD: {}", s.show_hud),
            format!(
                " (T)  Display: {}",
                if s.show_mask { "mask" } else { "output" }
            ),
            format!(" (M)  Mirror: {}", s.mirrored),
            format!(" (I)  Inset: {}", s.show_inset),
            format!(" (A)  Auto-advance: {}", s.auto_advance),
            format!("([/]) Duration: {} ms", s.duration_ms),
            " (B)  Prev Mask".to_string(),
            " (N)  Next Mask".to_string(),
            " (R)  Save Frame".to_string(),
            " (L)  Load Settings".to_string(),
            String::new(),
        ];
        lines.extend(self.messages.iter().cloned());
        lines
    }

    fn reload_mask(&mut self, now: Duration) -> TimemaskResult<()> {
        let dims = self.dims();
        self.mask = self.playlist.load_current(dims.width, dims.height)?;
        self.last_mask_change = now;
        Ok(())
    }

    fn persist(&self) -> TimemaskResult<()> {
        match &self.settings_path {
            Some(path) => self.settings.save(path),
            None => Ok(()),
        }
    }

    /// Applies the settings file as a whole or not at all.
    fn reload_settings(&mut self, now: Duration) -> TimemaskResult<SessionEvent> {
        let Some(path) = self.settings_path.clone() else {
            return Ok(SessionEvent::None);
        };
        let loaded = Settings::load(&path)?;
        let dims = self.dims();

        let frames = if loaded.capacity != self.settings.capacity {
            Some(FrameBuffer::new(loaded.capacity, dims)?)
        } else {
            None
        };
        let masks = if !loaded.masks.is_empty() && loaded.masks != self.settings.masks {
            let files = FileMasks::new(loaded.masks.clone());
            let mut playlist = MaskPlaylist::new(Box::new(files))?;
            let mask = playlist.load_current(dims.width, dims.height)?;
            Some((playlist, mask))
        } else {
            None
        };

        if let Some(frames) = frames {
            self.frames = frames;
        }
        if loaded.compositor != self.settings.compositor {
            self.compositor = loaded.compositor.create();
        }
        if let Some((playlist, mask)) = masks {
            self.playlist = playlist;
            self.mask = mask;
            self.last_mask_change = now;
        }
        self.settings = loaded;
        tracing::info!(path = %path.display(), "reloaded settings");
        Ok(SessionEvent::SettingsReloaded)
    }
}

impl std::fmt::Debug for TemporalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalSession")
            .field("dims", &self.dims())
            .field("frames", &self.frames.len())
            .field("compositor", &self.compositor.kind())
            .field("playlist", &self.playlist)
            .finish()
    }
}
