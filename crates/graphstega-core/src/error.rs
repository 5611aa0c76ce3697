//! Engine error kinds.
//!
//! Every error here is fatal to the call that raised it; the engine performs
//! no retries. [`EngineError::Cancelled`] additionally means the carrier
//! buffer may be partially modified and must be discarded.

use thiserror::Error;

/// Errors raised by embedding and extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The carrier does not present three-byte samples.
    #[error("carrier has {bytes_per_sample} bytes per sample; only 3 is supported")]
    UnsupportedCarrier { bytes_per_sample: usize },

    /// The framed message needs more vertices than the carrier provides.
    #[error(
        "message needs {needed_vertices} vertices but the carrier provides {available_vertices}"
    )]
    CarrierTooSmall {
        needed_vertices: usize,
        available_vertices: usize,
    },

    /// Cooperative cancellation was requested mid-embed.
    #[error("embedding cancelled")]
    Cancelled,

    /// The extracted signature bytes do not match; usually a wrong seed.
    #[error("embedded signature not found (wrong seed, or carrier holds no message)")]
    SignatureMismatch,

    /// The extracted length prefix exceeds what the carrier can hold.
    #[error("embedded length {length} exceeds remaining carrier capacity {capacity}")]
    LengthOutOfRange { length: usize, capacity: usize },
}
