//! # graphstega-carrier
//!
//! Concrete carriers for the embedding engine: lossless RGB images and
//! 8-bit PCM WAV files. Each carrier exposes its raw payload bytes through
//! [`graphstega_core::Carrier`] and owns its load/save logic; the engine
//! never sees a file format.

#![deny(unsafe_code)]

pub mod error;
pub mod png;
pub mod wav;

use std::path::Path;

use graphstega_core::Carrier;

pub use error::CarrierError;
pub use png::ImageCarrier;
pub use wav::WavCarrier;

/// A carrier of either supported format, dispatched by file extension.
#[derive(Debug, Clone)]
pub enum AnyCarrier {
    Image(ImageCarrier),
    Wav(WavCarrier),
}

impl AnyCarrier {
    /// Load a carrier, picking the format from the file extension
    /// (`.wav` is audio, everything else is treated as an image).
    pub fn load(path: &Path) -> Result<Self, CarrierError> {
        let is_wav = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if is_wav {
            WavCarrier::load(path).map(Self::Wav)
        } else {
            ImageCarrier::load(path).map(Self::Image)
        }
    }

    /// Write the carrier back out in its own format.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        match self {
            Self::Image(c) => c.save(path),
            Self::Wav(c) => c.save(path),
        }
    }
}

impl Carrier for AnyCarrier {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Image(c) => c.bytes(),
            Self::Wav(c) => c.bytes(),
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Image(c) => c.bytes_mut(),
            Self::Wav(c) => c.bytes_mut(),
        }
    }

    fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Image(c) => c.bytes_per_sample(),
            Self::Wav(c) => c.bytes_per_sample(),
        }
    }
}
