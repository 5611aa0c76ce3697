//! Carrier load/save errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarrierError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("image: {0}")]
    Image(#[from] image::ImageError),

    #[error("wav: {0}")]
    Wav(#[from] hound::Error),

    /// The file decoded but cannot serve as a carrier.
    #[error("unsupported carrier format: {reason}")]
    UnsupportedFormat { reason: String },
}
