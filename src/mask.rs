use crate::foundation::core::FrameDims;
use crate::foundation::error::{TimemaskError, TimemaskResult};
use crate::frame::Frame;

/// Single-channel depth map, one sample per output pixel.
///
/// For the interpolated compositor `0` selects the oldest history and `255` the newest frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TemporalMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Procedurally generated masks, handy when no mask image is available.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskPattern {
    /// Oldest history on the left edge, newest on the right.
    Horizontal,
    /// Oldest history on the top edge, newest on the bottom.
    Vertical,
    /// Newest at the center, fading to the oldest history at the corners.
    Radial,
}

impl std::str::FromStr for MaskPattern {
    type Err = TimemaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizontal" | "h" => Ok(Self::Horizontal),
            "vertical" | "v" => Ok(Self::Vertical),
            "radial" | "r" => Ok(Self::Radial),
            other => Err(TimemaskError::validation(format!(
                "unknown mask pattern '{other}'"
            ))),
        }
    }
}

impl TemporalMask {
    pub fn uniform(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; (width as usize) * (height as usize)],
        }
    }

    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> TimemaskResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| TimemaskError::validation("mask size overflow"))?;
        if data.len() != expected {
            return Err(TimemaskError::geometry(format!(
                "mask data has {} samples, expected {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_luma_image(img: image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }

    pub fn from_pattern(pattern: MaskPattern, width: u32, height: u32) -> Self {
        let mut data = Vec::with_capacity((width as usize) * (height as usize));
        let cx = (width.saturating_sub(1)) as f32 / 2.0;
        let cy = (height.saturating_sub(1)) as f32 / 2.0;
        let max_d = (cx * cx + cy * cy).sqrt();
        for y in 0..height {
            for x in 0..width {
                let v = match pattern {
                    MaskPattern::Horizontal => ramp(x, width),
                    MaskPattern::Vertical => ramp(y, height),
                    MaskPattern::Radial => {
                        if max_d <= 0.0 {
                            255
                        } else {
                            let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                            let d = (dx * dx + dy * dy).sqrt() / max_d;
                            (255.0 * (1.0 - d)).round().clamp(0.0, 255.0) as u8
                        }
                    }
                };
                data.push(v);
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn matches(&self, dims: FrameDims) -> bool {
        dims.same_size(self.width, self.height)
    }

    pub fn ensure_matches(&self, dims: FrameDims) -> TimemaskResult<()> {
        if self.matches(dims) {
            return Ok(());
        }
        Err(TimemaskError::geometry(format!(
            "mask is {}x{}, frames are {}x{}",
            self.width, self.height, dims.width, dims.height
        )))
    }

    /// Gray replicated into every channel of `dims`, for displaying the mask itself.
    pub fn to_frame(&self, channels: u8) -> TimemaskResult<Frame> {
        let dims = FrameDims::new(self.width, self.height, channels)?;
        let c = usize::from(channels);
        let mut data = Vec::with_capacity(dims.byte_len());
        for &v in &self.data {
            data.extend(std::iter::repeat_n(v, c));
        }
        Frame::from_raw(dims, data)
    }
}

fn ramp(pos: u32, len: u32) -> u8 {
    if len <= 1 {
        return 0;
    }
    ((pos as u64 * 255) / u64::from(len - 1)) as u8
}
