use crate::composite::{Compositor, CompositorKind};
use crate::foundation::error::TimemaskResult;
use crate::frame::Frame;
use crate::frame_buffer::FrameBuffer;
use crate::mask::TemporalMask;

/// Discrete compositor: `S - 1` global threshold passes, one band per buffered frame.
///
/// Higher mask values land in earlier bands and therefore show older frames. Band edges are hard,
/// which makes this variant visibly banded; it is kept as a reference for the interpolated one.
#[derive(Clone, Copy, Debug, Default)]
pub struct BandedCompositor;

/// Threshold for band `i` of a buffer holding `size` frames, `1 <= i < size`.
pub(crate) fn band_threshold(size: usize, i: usize) -> u8 {
    ((size - i - 1) * 255 / size) as u8
}

impl Compositor for BandedCompositor {
    fn kind(&self) -> CompositorKind {
        CompositorKind::Banded
    }

    fn composite_history(
        &self,
        frames: &FrameBuffer,
        mask: &TemporalMask,
        out: &mut Frame,
    ) -> TimemaskResult<()> {
        let size = frames.len();
        let c = usize::from(frames.dims().channels);

        out.data_mut().copy_from_slice(frames.at(size - 1)?);
        let mut remaining = mask.data().to_vec();

        for i in 1..size {
            let threshold = band_threshold(size, i);
            let band = frames.at(i)?;
            let dst = out.data_mut();
            for (p, m) in remaining.iter_mut().enumerate() {
                if *m > threshold {
                    *m = 0;
                    dst[p * c..(p + 1) * c].copy_from_slice(&band[p * c..(p + 1) * c]);
                }
            }
        }
        Ok(())
    }
}
