//! 8-bit PCM WAV carrier.
//!
//! The data chunk's PCM stream is presented as a flat byte buffer; the
//! engine groups three consecutive PCM bytes into one sample. Channel
//! layout and sample rate are preserved verbatim on save. Files that are
//! not 8-bit integer PCM are rejected at load.

use std::path::Path;

use graphstega_core::Carrier;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::CarrierError;

#[derive(Debug, Clone)]
pub struct WavCarrier {
    spec: WavSpec,
    data: Vec<u8>,
}

impl WavCarrier {
    /// Read the PCM stream of an 8-bit integer WAV file.
    pub fn load(path: &Path) -> Result<Self, CarrierError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 8 {
            return Err(CarrierError::UnsupportedFormat {
                reason: format!(
                    "only 8-bit integer PCM is supported, got {}-bit {:?}",
                    spec.bits_per_sample, spec.sample_format
                ),
            });
        }
        let data = reader
            .samples::<i8>()
            .map(|s| s.map(to_byte))
            .collect::<Result<Vec<u8>, _>>()?;
        Ok(Self { spec, data })
    }

    /// Wrap raw PCM bytes under the given WAV spec (8-bit PCM enforced).
    pub fn from_pcm(spec: WavSpec, data: Vec<u8>) -> Result<Self, CarrierError> {
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 8 {
            return Err(CarrierError::UnsupportedFormat {
                reason: "WavCarrier only holds 8-bit integer PCM".to_string(),
            });
        }
        Ok(Self { spec, data })
    }

    #[must_use]
    pub const fn spec(&self) -> WavSpec {
        self.spec
    }

    /// Write the (possibly modified) PCM stream back out.
    pub fn save(&self, path: &Path) -> Result<(), CarrierError> {
        let mut writer = WavWriter::create(path, self.spec)?;
        for &byte in &self.data {
            writer.write_sample(from_byte(byte))?;
        }
        writer.finalize()?;
        Ok(())
    }
}

// Offset-binary mapping between hound's signed 8-bit samples and the byte
// view the engine mutates; `from_byte` inverts `to_byte` exactly, so the
// data chunk round-trips.
fn to_byte(s: i8) -> u8 {
    (i16::from(s) + 128) as u8
}

fn from_byte(b: u8) -> i8 {
    (i16::from(b) - 128) as i8
}

impl Carrier for WavCarrier {
    fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn bytes_per_sample(&self) -> usize {
        3
    }
}
