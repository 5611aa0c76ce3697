//! Vertices and vertex construction.
//!
//! A vertex owns `s` samples drawn consecutively from the seeded permutation
//! and carries at most one message chunk. Ownership is by index into the
//! [`SampleStore`]: index sets of distinct vertices never overlap, so a
//! sample has exactly one owner.

use crate::error::EngineError;
use crate::params::Parameters;
use crate::permute::IndexPermutation;
use crate::sample::SampleStore;

/// A group of `s` samples; the unit that encodes one message chunk.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// Owned sample indices, in draw order.
    pub(crate) sample_ids: Vec<u32>,
    /// Cached aggregate mod value; refreshed when an owned sample changes.
    pub(crate) value: u8,
    /// Assigned message chunk, or `None` for a reserve vertex.
    pub(crate) chunk: Option<u8>,
    /// Cleared once the vertex has been consumed by a swap or adjustment.
    pub(crate) is_valid: bool,
    /// Edge indices into the current batch's arena; cleared between batches.
    pub(crate) edges: Vec<u32>,
}

impl Vertex {
    /// A reserve vertex carries no chunk and only lends samples.
    #[must_use]
    pub(crate) fn is_reserve(&self) -> bool {
        self.chunk.is_none()
    }

    /// Recompute the cached aggregate from the store.
    pub(crate) fn refresh_value(&mut self, store: &SampleStore) {
        self.value = aggregate_mod(&self.sample_ids, store);
    }
}

/// `(sum of the samples' mod values) AND mask`.
fn aggregate_mod(sample_ids: &[u32], store: &SampleStore) -> u8 {
    let sum: u16 = sample_ids
        .iter()
        .map(|&id| u16::from(store.sample(id).mod_value()))
        .sum();
    (sum & u16::from(store.mask())) as u8
}

/// Pack the permuted sample stream into vertices and assign one chunk to
/// each of the first `chunks.len()` of them; the rest become reserves.
///
/// Every sample of a message-bearing vertex receives the same delta, so a
/// single sample swap (or adjustment) realises the whole vertex's chunk.
/// Vertices whose current value already equals their chunk are consumed on
/// the spot and skip the matching entirely.
pub(crate) fn build_vertices(
    store: &mut SampleStore,
    chunks: &[u8],
    params: &Parameters,
    perm: &mut IndexPermutation,
) -> Result<Vec<Vertex>, EngineError> {
    let s = params.samples_per_vertex();
    let mask = u16::from(params.mask());
    let mod_factor = u16::from(params.mod_factor());
    let available = store.len() / s;
    if chunks.len() > available {
        return Err(EngineError::CarrierTooSmall {
            needed_vertices: chunks.len(),
            available_vertices: available,
        });
    }

    let mut vertices = Vec::with_capacity(available);
    for i in 0..available {
        let sample_ids: Vec<u32> = perm.by_ref().take(s).map(|id| id as u32).collect();
        debug_assert_eq!(sample_ids.len(), s);
        let value = aggregate_mod(&sample_ids, store);

        let (chunk, is_valid) = match chunks.get(i) {
            Some(&chunk) => {
                let delta = (mod_factor + u16::from(chunk) - u16::from(value)) & mask;
                for &id in &sample_ids {
                    let target = (u16::from(store.sample(id).mod_value()) + delta) & mask;
                    store.set_target(id, target as u8);
                }
                (Some(chunk), delta != 0)
            }
            // Reserve: samples keep the sentinel target of 0.
            None => (None, true),
        };

        vertices.push(Vertex {
            sample_ids,
            value,
            chunk,
            is_valid,
            edges: Vec::new(),
        });
    }
    Ok(vertices)
}
