use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma, Pixel, Rgb, Rgba};

use crate::foundation::core::{FrameDims, RGB_CHANNELS};
use crate::foundation::error::{TimemaskError, TimemaskResult};

/// Interleaved, row-major 8-bit image with fixed geometry.
///
/// Used both for captured input frames and for the caller-owned output frame that a
/// [`crate::Compositor`] overwrites on every tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    dims: FrameDims,
    data: Vec<u8>,
}

impl Frame {
    /// Zero-filled frame.
    pub fn blank(dims: FrameDims) -> Self {
        Self {
            dims,
            data: vec![0; dims.byte_len()],
        }
    }

    pub fn filled(dims: FrameDims, value: u8) -> Self {
        Self {
            dims,
            data: vec![value; dims.byte_len()],
        }
    }

    pub fn from_raw(dims: FrameDims, data: Vec<u8>) -> TimemaskResult<Self> {
        if data.len() != dims.byte_len() {
            return Err(TimemaskError::geometry(format!(
                "frame data has {} bytes, expected {} for {dims}",
                data.len(),
                dims.byte_len()
            )));
        }
        Ok(Self { dims, data })
    }

    pub fn from_rgb_image(img: image::RgbImage) -> TimemaskResult<Self> {
        let (width, height) = img.dimensions();
        let dims = FrameDims::rgb(width, height)?;
        Self::from_raw(dims, img.into_raw())
    }

    pub fn to_rgb_image(&self) -> TimemaskResult<image::RgbImage> {
        if self.dims.channels != RGB_CHANNELS {
            return Err(TimemaskError::validation(format!(
                "cannot convert {}-channel frame to rgb image",
                self.dims.channels
            )));
        }
        image::RgbImage::from_raw(self.dims.width, self.dims.height, self.data.clone())
            .ok_or_else(|| TimemaskError::geometry("rgb image buffer length mismatch"))
    }

    pub fn dims(&self) -> FrameDims {
        self.dims
    }

    pub fn width(&self) -> u32 {
        self.dims.width
    }

    pub fn height(&self) -> u32 {
        self.dims.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Channel samples of pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let c = usize::from(self.dims.channels);
        let i = (y as usize * self.dims.width as usize + x as usize) * c;
        &self.data[i..i + c]
    }

    /// Nearest-neighbour resample, used for thumbnails.
    pub fn scaled_nearest(&self, width: u32, height: u32) -> TimemaskResult<Frame> {
        let dims = FrameDims::new(width, height, self.dims.channels)?;
        let data = match self.dims.channels {
            1 => resize_nearest::<Luma<u8>>(self, width, height)?,
            3 => resize_nearest::<Rgb<u8>>(self, width, height)?,
            4 => resize_nearest::<Rgba<u8>>(self, width, height)?,
            c => return Err(unsupported_layout(c)),
        };
        Frame::from_raw(dims, data)
    }

    /// Mirror around the vertical axis, in place.
    pub fn flip_horizontal(&mut self) -> TimemaskResult<()> {
        let FrameDims {
            width,
            height,
            channels,
        } = self.dims;
        let data = self.data.as_mut_slice();
        match channels {
            1 => flip_in_place::<Luma<u8>>(width, height, data),
            3 => flip_in_place::<Rgb<u8>>(width, height, data),
            4 => flip_in_place::<Rgba<u8>>(width, height, data),
            c => Err(unsupported_layout(c)),
        }
    }
}

fn unsupported_layout(channels: u8) -> TimemaskError {
    TimemaskError::validation(format!(
        "{channels}-channel frames cannot be resampled (expected 1, 3 or 4)"
    ))
}

fn resize_nearest<P>(src: &Frame, width: u32, height: u32) -> TimemaskResult<Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    let view = ImageBuffer::<P, &[u8]>::from_raw(src.width(), src.height(), src.data())
        .ok_or_else(|| TimemaskError::geometry("frame buffer length mismatch"))?;
    Ok(imageops::resize(&view, width, height, FilterType::Nearest).into_raw())
}

fn flip_in_place<P>(width: u32, height: u32, data: &mut [u8]) -> TimemaskResult<()>
where
    P: Pixel<Subpixel = u8>,
{
    let mut view = ImageBuffer::<P, &mut [u8]>::from_raw(width, height, data)
        .ok_or_else(|| TimemaskError::geometry("frame buffer length mismatch"))?;
    imageops::flip_horizontal_in_place(&mut view);
    Ok(())
}
