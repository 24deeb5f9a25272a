use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::frame::Frame;
use crate::frame_buffer::FrameBuffer;
use crate::mask::TemporalMask;

pub mod banded;
pub mod interpolated;

pub use banded::BandedCompositor;
pub use interpolated::InterpolatedCompositor;

/// Builds one output frame from the buffered history and a temporal mask.
///
/// Implementors only provide [`Compositor::composite_history`]; [`Compositor::render`] owns the
/// geometry checks and the empty / single-frame cases shared by every variant.
pub trait Compositor {
    fn kind(&self) -> CompositorKind;

    /// Composite a buffer holding at least two frames. `out`, `mask` and `frames` have already
    /// been checked to share the same width and height.
    fn composite_history(
        &self,
        frames: &FrameBuffer,
        mask: &TemporalMask,
        out: &mut Frame,
    ) -> TimemaskResult<()>;

    /// Overwrite `out` with the composite of `frames` under `mask`.
    ///
    /// Geometry is validated before any pixel is written, so on error `out` is left untouched.
    fn render(
        &self,
        frames: &FrameBuffer,
        mask: &TemporalMask,
        out: &mut Frame,
    ) -> TimemaskResult<()> {
        check_geometry(frames, mask, out)?;
        match frames.len() {
            0 => {
                out.fill(0);
                Ok(())
            }
            1 => {
                out.data_mut().copy_from_slice(frames.at(0)?);
                Ok(())
            }
            _ => self.composite_history(frames, mask, out),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositorKind {
    /// Continuous per-pixel blend of the two bracketing frames.
    #[default]
    Interpolated,
    /// Discrete bands built by repeated thresholding; kept as a reference algorithm.
    Banded,
}

impl CompositorKind {
    pub fn create(self) -> Box<dyn Compositor> {
        match self {
            Self::Interpolated => Box::new(InterpolatedCompositor),
            Self::Banded => Box::new(BandedCompositor),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interpolated => "interpolated",
            Self::Banded => "banded",
        }
    }
}

impl std::str::FromStr for CompositorKind {
    type Err = TimemaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interpolated" | "interp" => Ok(Self::Interpolated),
            "banded" | "threshold" => Ok(Self::Banded),
            other => Err(TimemaskError::validation(format!(
                "unknown compositor '{other}'"
            ))),
        }
    }
}

fn check_geometry(frames: &FrameBuffer, mask: &TemporalMask, out: &Frame) -> TimemaskResult<()> {
    let dims = frames.dims();
    mask.ensure_matches(dims)?;
    if out.dims() != dims {
        return Err(TimemaskError::geometry(format!(
            "output frame is {}, buffer holds {dims}",
            out.dims()
        )));
    }
    Ok(())
}
