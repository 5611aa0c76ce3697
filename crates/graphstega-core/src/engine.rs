//! Public engine surface.
//!
//! [`Engine`] binds a parameter set and runs embed/extract calls against
//! any [`Carrier`]. The carrier's byte buffer is exclusively borrowed for
//! the duration of a call.

use serde::Serialize;

use crate::carrier::Carrier;
use crate::embed::run_embed;
use crate::error::EngineError;
use crate::extract::run_extract;
use crate::message::FRAME_OVERHEAD;
use crate::params::Parameters;
use crate::progress::{CancelToken, NoopReporter, Reporter};
use crate::sample::BYTES_PER_SAMPLE;

/// Outcome statistics of one embed call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedReport {
    /// User payload bytes embedded (excluding the frame).
    pub payload_bytes: usize,
    /// Whole samples in the carrier.
    pub samples: usize,
    /// Vertices built over the sample stream.
    pub vertices_total: usize,
    /// Vertices carrying a message chunk.
    pub message_vertices: usize,
    /// Message vertices that already encoded their chunk at build time.
    pub already_aligned: usize,
    /// Vertices served by a direct message-to-message swap.
    pub matched_direct: usize,
    /// Vertices served by a reserve donor.
    pub matched_reserve: usize,
    /// Vertices forced to their target by the adjuster.
    pub adjusted: usize,
    /// Candidate edges discovered across all batches and reserve passes.
    pub edges_found: usize,
    /// Matching batches run.
    pub batches: usize,
    /// Reserve passes actually run.
    pub reserve_passes: usize,
}

/// Embedding/extraction engine bound to one parameter set.
#[derive(Debug, Clone)]
pub struct Engine {
    params: Parameters,
}

impl Engine {
    #[must_use]
    pub fn new(params: Parameters) -> Self {
        Self { params }
    }

    #[must_use]
    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// User payload bytes this carrier can hold under the engine's
    /// parameters (the frame overhead is already subtracted).
    pub fn capacity(&self, carrier: &dyn Carrier) -> Result<usize, EngineError> {
        ensure_supported(carrier)?;
        Ok(payload_capacity(carrier.bytes().len(), &self.params))
    }

    /// Hide `payload` in the carrier. On any error the buffer may be
    /// partially modified and must be discarded.
    pub fn embed(
        &self,
        carrier: &mut dyn Carrier,
        payload: &[u8],
    ) -> Result<EmbedReport, EngineError> {
        self.embed_with(carrier, payload, &NoopReporter, &CancelToken::new())
    }

    /// [`Self::embed`] with progress reporting and cancellation.
    pub fn embed_with(
        &self,
        carrier: &mut dyn Carrier,
        payload: &[u8],
        reporter: &dyn Reporter,
        cancel: &CancelToken,
    ) -> Result<EmbedReport, EngineError> {
        ensure_supported(carrier)?;
        run_embed(carrier.bytes_mut(), payload, &self.params, reporter, cancel)
    }

    /// Recover the payload embedded under the same seed and parameters.
    pub fn extract(&self, carrier: &dyn Carrier) -> Result<Vec<u8>, EngineError> {
        ensure_supported(carrier)?;
        run_extract(carrier.bytes(), &self.params)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Parameters::default())
    }
}

fn ensure_supported(carrier: &dyn Carrier) -> Result<(), EngineError> {
    let bytes_per_sample = carrier.bytes_per_sample();
    if bytes_per_sample == BYTES_PER_SAMPLE {
        Ok(())
    } else {
        Err(EngineError::UnsupportedCarrier { bytes_per_sample })
    }
}

/// Embeddable bytes including the signature/length frame.
#[must_use]
pub fn total_bandwidth(buffer_len: usize, params: &Parameters) -> usize {
    buffer_len / BYTES_PER_SAMPLE / params.samples_per_vertex()
        * usize::from(params.message_bits_per_vertex())
        / 8
}

/// User payload bytes after subtracting the frame overhead.
#[must_use]
pub fn payload_capacity(buffer_len: usize, params: &Parameters) -> usize {
    total_bandwidth(buffer_len, params).saturating_sub(FRAME_OVERHEAD)
}
