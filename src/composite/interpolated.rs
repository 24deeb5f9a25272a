use crate::composite::{Compositor, CompositorKind};
use crate::foundation::error::TimemaskResult;
use crate::frame::Frame;
use crate::frame_buffer::FrameBuffer;
use crate::mask::TemporalMask;

/// Continuous compositor: every pixel blends the two buffered frames bracketing its fractional
/// history depth.
///
/// Depth is measured in frames back from the newest one. Mask `0` selects full depth (the oldest
/// frame) and `255` selects a depth just above zero; samples are divided by 256, so the newest
/// frame is never reached exactly.
#[derive(Clone, Copy, Debug, Default)]
pub struct InterpolatedCompositor;

/// Frame pair and weight selected by one mask sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BlendTap {
    /// Depth of the newer frame of the pair, `0 <= depth <= size - 2`.
    pub(crate) depth: usize,
    /// Weight of the older frame (`depth + 1`), in `[0, 1]`.
    pub(crate) remainder: f32,
}

impl BlendTap {
    /// `size` must be at least 2.
    pub(crate) fn for_sample(size: usize, sample: u8) -> Self {
        let fraction = 1.0 - f64::from(sample) / 256.0;
        let exact = (size - 1) as f64 * fraction;
        let depth = (exact.floor() as usize).min(size - 2);
        Self {
            depth,
            remainder: (exact - depth as f64) as f32,
        }
    }

    pub(crate) fn blend(self, newer: u8, older: u8) -> u8 {
        let r = self.remainder;
        let v = f32::from(newer) * (1.0 - r) + f32::from(older) * r;
        v.round().clamp(0.0, 255.0) as u8
    }
}

fn tap_table(size: usize) -> [BlendTap; 256] {
    std::array::from_fn(|m| BlendTap::for_sample(size, m as u8))
}

impl Compositor for InterpolatedCompositor {
    fn kind(&self) -> CompositorKind {
        CompositorKind::Interpolated
    }

    fn composite_history(
        &self,
        frames: &FrameBuffer,
        mask: &TemporalMask,
        out: &mut Frame,
    ) -> TimemaskResult<()> {
        let size = frames.len();
        let dims = frames.dims();
        let c = usize::from(dims.channels);
        let width = dims.width as usize;

        // Indexed by depth: 0 is the newest frame.
        let history = (0..size)
            .map(|depth| frames.at(size - 1 - depth))
            .collect::<TimemaskResult<Vec<&[u8]>>>()?;
        let taps = tap_table(size);

        let samples = mask.data();
        let dst = out.data_mut();
        for y in 0..dims.height as usize {
            for x in 0..width {
                let p = y * width + x;
                let tap = taps[usize::from(samples[p])];
                let newer = &history[tap.depth][p * c..(p + 1) * c];
                let older = &history[tap.depth + 1][p * c..(p + 1) * c];
                for ch in 0..c {
                    dst[p * c + ch] = tap.blend(newer[ch], older[ch]);
                }
            }
        }
        Ok(())
    }
}
