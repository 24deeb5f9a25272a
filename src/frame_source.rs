use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::FrameDims;
use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::frame::Frame;
use crate::mask_source::is_supported_image;

/// Produces one orientation-normalized frame per tick.
pub trait FrameSource {
    fn dims(&self) -> FrameDims;

    /// `None` once the source is exhausted.
    fn next_frame(&mut self) -> TimemaskResult<Option<Frame>>;
}

/// Still images from a directory, played back in file-name order.
#[derive(Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    next: usize,
    dims: FrameDims,
    mirror: bool,
}

impl ImageSequence {
    /// Every png/jpg/bmp file directly inside `dir`. The first image fixes the geometry.
    pub fn open_dir(dir: &Path, mirror: bool) -> TimemaskResult<Self> {
        let mut paths = Vec::new();
        let entries =
            std::fs::read_dir(dir).with_context(|| format!("read frames dir '{}'", dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("read entry in '{}'", dir.display()))?
                .path();
            if path.is_file() && is_supported_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Self::from_paths(paths, mirror)
    }

    pub fn from_paths(paths: Vec<PathBuf>, mirror: bool) -> TimemaskResult<Self> {
        let first = paths
            .first()
            .ok_or_else(|| TimemaskError::validation("image sequence has no frames"))?;
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("read dimensions of '{}'", first.display()))?;
        Ok(Self {
            paths,
            next: 0,
            dims: FrameDims::rgb(width, height)?,
            mirror,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FrameSource for ImageSequence {
    fn dims(&self) -> FrameDims {
        self.dims
    }

    fn next_frame(&mut self) -> TimemaskResult<Option<Frame>> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let img = image::open(path)
            .with_context(|| format!("decode frame '{}'", path.display()))?
            .to_rgb8();
        let mut frame = Frame::from_rgb_image(img)?;
        if frame.dims() != self.dims {
            return Err(TimemaskError::geometry(format!(
                "frame '{}' is {}, sequence is {}",
                path.display(),
                frame.dims(),
                self.dims
            )));
        }
        if self.mirror {
            frame.flip_horizontal()?;
        }
        Ok(Some(frame))
    }
}
