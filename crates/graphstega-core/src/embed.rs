//! The embed pipeline.
//!
//! Strictly sequential within one call: frame and chunk the payload, draw
//! vertices from the permuted sample stream, then run the batched matching
//! loop. Whatever the matching (direct, then reserve passes) cannot serve
//! is handed to the adjuster, so the call always yields a carrier that
//! extracts cleanly.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::adjust;
use crate::engine::EmbedReport;
use crate::error::EngineError;
use crate::graph::{edges, matcher, reserve, spatial::SpatialIndex};
use crate::message;
use crate::params::Parameters;
use crate::permute::IndexPermutation;
use crate::progress::{CancelToken, PROGRESS_GRANULARITY, Phase, Reporter};
use crate::sample::SampleStore;
use crate::vertex;

/// Domain separation for the adjuster's random draws, keeping them off the
/// permutation stream while staying a pure function of the seed.
const ADJUSTER_STREAM: u64 = 0x6164_6a75_7374_6572;

pub(crate) fn run_embed(
    buffer: &mut [u8],
    payload: &[u8],
    params: &Parameters,
    reporter: &dyn Reporter,
    cancel: &CancelToken,
) -> Result<EmbedReport, EngineError> {
    let framed = message::frame(payload);
    let chunks = message::pack_chunks(&framed, params.message_bits_per_vertex());

    let mut store = SampleStore::from_buffer(buffer, params.mask());
    let mut perm = IndexPermutation::new(params.seed(), store.len());
    let mut vertices = vertex::build_vertices(&mut store, &chunks, params, &mut perm)?;

    let message_count = chunks.len();
    let vertices_total = vertices.len();
    let already_aligned = vertices[..message_count]
        .iter()
        .filter(|v| !v.is_valid)
        .count();

    // Batched greedy matching among the message vertices.
    let shift = params.precision_shift();
    let mut leftovers: Vec<u32> = Vec::new();
    let mut edges_found = 0usize;
    let mut batches = 0usize;
    let mut lo = 0usize;
    while lo < message_count {
        cancel.check()?;
        let hi = (lo + params.vertices_per_matching()).min(message_count);
        let index = SpatialIndex::index_message_vertices(shift, lo..hi, &vertices, &store);
        let arena = edges::find_edges(lo..hi, &mut vertices, &store, &index, params, reporter, cancel)?;
        edges_found += arena.len();
        let batch_ids: Vec<u32> = (lo..hi).map(|i| i as u32).collect();
        leftovers.extend(matcher::run(&batch_ids, &mut vertices, &arena, &mut store));
        batches += 1;
        lo = hi;
    }
    let matched_direct = message_count - already_aligned - leftovers.len();

    // Reserve passes over the accumulated leftovers.
    let mut reserve_passes = 0usize;
    let mut matched_reserve = 0usize;
    for _ in 0..params.reserve_matching() {
        if leftovers.is_empty() {
            break;
        }
        cancel.check()?;
        let reserves =
            SpatialIndex::index_reserve_vertices(shift, message_count..vertices_total, &vertices, &store);
        let arena = reserve::find_reserve_edges(
            &leftovers,
            &mut vertices,
            &store,
            &reserves,
            params,
            reporter,
            cancel,
        )?;
        edges_found += arena.len();
        let before = leftovers.len();
        leftovers = matcher::run(&leftovers, &mut vertices, &arena, &mut store);
        matched_reserve += before - leftovers.len();
        for v in &mut vertices[message_count..] {
            v.edges.clear();
        }
        reserve_passes += 1;
    }

    // Residue: force each remaining vertex to its target directly.
    let adjusted = leftovers.len();
    let stride = (adjusted / PROGRESS_GRANULARITY).max(1);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed() ^ ADJUSTER_STREAM);
    for (done, &u) in leftovers.iter().enumerate() {
        if done % stride == 0 {
            reporter.tick(Phase::Adjust, done, adjusted);
        }
        adjust::adjust_vertex(&mut vertices[u as usize], &mut store, params, &mut rng);
    }

    store.flush_into(buffer);
    Ok(EmbedReport {
        payload_bytes: payload.len(),
        samples: store.len(),
        vertices_total,
        message_vertices: message_count,
        already_aligned,
        matched_direct,
        matched_reserve,
        adjusted,
        edges_found,
        batches,
        reserve_passes,
    })
}
