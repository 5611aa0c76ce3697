//! Lossless image carrier.
//!
//! Any format the `image` crate decodes can be loaded; the pixel data is
//! flattened to interleaved RGB8 (alpha is dropped) and always saved back
//! as PNG, since a lossy encoder would destroy the embedded message.

use std::path::Path;

use graphstega_core::Carrier;
use image::{ExtendedColorType, ImageFormat};

use crate::error::CarrierError;

/// An RGB8 pixel buffer; one pixel is one engine sample.
#[derive(Debug, Clone)]
pub struct ImageCarrier {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl ImageCarrier {
    /// Decode the image at `path` into interleaved RGB8.
    pub fn load(path: &Path) -> Result<Self, CarrierError> {
        let decoded = image::open(path)?.into_rgb8();
        let (width, height) = decoded.dimensions();
        Ok(Self {
            pixels: decoded.into_raw(),
            width,
            height,
        })
    }

    /// Wrap an existing interleaved RGB8 buffer.
    pub fn from_rgb8(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, CarrierError> {
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(CarrierError::UnsupportedFormat {
                reason: format!(
                    "pixel buffer is {} bytes, {width}x{height} RGB8 needs {expected}",
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Encode as PNG at `path`.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        image::save_buffer_with_format(
            path,
            &self.pixels,
            self.width,
            self.height,
            ExtendedColorType::Rgb8,
            ImageFormat::Png,
        )?;
        Ok(())
    }
}

impl Carrier for ImageCarrier {
    fn bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    fn bytes_per_sample(&self) -> usize {
        3
    }
}
