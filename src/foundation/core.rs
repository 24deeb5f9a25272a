use crate::foundation::error::{TimemaskError, TimemaskResult};

/// Channel count of camera frames (interleaved RGB8).
pub const RGB_CHANNELS: u8 = 3;

/// Fixed geometry shared by every frame that flows through a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
}

impl FrameDims {
    pub fn new(width: u32, height: u32, channels: u8) -> TimemaskResult<Self> {
        if width == 0 || height == 0 {
            return Err(TimemaskError::validation(
                "frame width/height must be non-zero",
            ));
        }
        if channels == 0 {
            return Err(TimemaskError::validation("frame channels must be non-zero"));
        }
        let dims = Self {
            width,
            height,
            channels,
        };
        dims.checked_byte_len()?;
        Ok(dims)
    }

    pub fn rgb(width: u32, height: u32) -> TimemaskResult<Self> {
        Self::new(width, height, RGB_CHANNELS)
    }

    pub fn pixel_count(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn byte_len(self) -> usize {
        self.pixel_count() * usize::from(self.channels)
    }

    pub fn checked_byte_len(self) -> TimemaskResult<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|v| v.checked_mul(usize::from(self.channels)))
            .ok_or_else(|| TimemaskError::validation("frame buffer size overflow"))
    }

    pub fn same_size(self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl std::fmt::Display for FrameDims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.width, self.height, self.channels)
    }
}
