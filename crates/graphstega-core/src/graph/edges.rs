//! Edge discovery over the spatial index.
//!
//! For each live sample the finder scans the quantised colour neighbourhood
//! for partner samples whose `(mod, target)` pair mirrors its own, so that
//! swapping the two bytes-for-bytes advances both vertices toward their
//! chunks. Edge weight is the squared colour distance of the trade.
//!
//! The window is scanned as a lexicographic half-space: the x axis only
//! upward, y only upward while `x == x0`, z only upward while additionally
//! `y == y0`, and inside the home cell itself only partners with a larger
//! vertex id. Every unordered sample pair is therefore visited from exactly
//! one side and no duplicate-edge set is needed.

use crate::error::EngineError;
use crate::graph::spatial::SpatialIndex;
use crate::params::Parameters;
use crate::progress::{CancelToken, PROGRESS_GRANULARITY, Phase, Reporter};
use crate::sample::{BYTES_PER_SAMPLE, SampleStore};
use crate::vertex::Vertex;

/// A candidate sample-for-sample trade between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    pub a: u32,
    pub b: u32,
    pub a_slot: u8,
    pub b_slot: u8,
    pub weight: u32,
}

impl Edge {
    /// Seen from endpoint `u`: `(other vertex, u's slot, other's slot)`.
    pub(crate) fn counterpart(&self, u: u32) -> (u32, u8, u8) {
        debug_assert!(u == self.a || u == self.b);
        if u == self.a {
            (self.b, self.a_slot, self.b_slot)
        } else {
            (self.a, self.b_slot, self.a_slot)
        }
    }
}

/// Batch-owned edge storage; vertices hold indices into it, so dropping the
/// arena frees the whole batch at once.
#[derive(Debug, Default)]
pub(crate) struct EdgeArena {
    edges: Vec<Edge>,
}

impl EdgeArena {
    pub(crate) fn get(&self, id: u32) -> &Edge {
        &self.edges[id as usize]
    }

    pub(crate) fn weight(&self, id: u32) -> u32 {
        self.edges[id as usize].weight
    }

    pub(crate) fn len(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn push(&mut self, edge: Edge) -> u32 {
        let id = self.edges.len() as u32;
        self.edges.push(edge);
        id
    }
}

/// Squared Euclidean distance of two samples' channel bytes.
pub(crate) fn squared_distance(a: [u8; BYTES_PER_SAMPLE], b: [u8; BYTES_PER_SAMPLE]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

/// Discover all edges among the still-valid message vertices in `batch`,
/// registering each on both endpoints' edge lists.
pub(crate) fn find_edges(
    batch: std::ops::Range<usize>,
    vertices: &mut [Vertex],
    store: &SampleStore,
    index: &SpatialIndex,
    params: &Parameters,
    reporter: &dyn Reporter,
    cancel: &CancelToken,
) -> Result<EdgeArena, EngineError> {
    let shift = params.precision_shift();
    let dim_max = u16::from(255u8 >> shift);
    let max_delta = u16::from(params.distance_max() >> shift);
    let total = batch.len();
    let stride = (total / PROGRESS_GRANULARITY).max(1);

    let mut arena = EdgeArena::default();
    for (done, u) in batch.enumerate() {
        cancel.check()?;
        if done % stride == 0 {
            reporter.tick(Phase::EdgeSearch, done, total);
        }
        if !vertices[u].is_valid {
            continue;
        }
        for slot in 0..vertices[u].sample_ids.len() {
            let sid = vertices[u].sample_ids[slot];
            let s_u = store.sample(sid);
            let values = s_u.values();
            let [x0, y0, z0] = index.quantise(values);
            // The partner must currently hold our target and want what we hold.
            let want_mod = s_u.target_mod_value();
            let want_target = s_u.mod_value();

            for x in x0..=(x0 + max_delta).min(dim_max) {
                let y_lo = if x == x0 { y0 } else { y0.saturating_sub(max_delta) };
                for y in y_lo..=(y0 + max_delta).min(dim_max) {
                    let first_pair = x == x0 && y == y0;
                    let z_lo = if first_pair { z0 } else { z0.saturating_sub(max_delta) };
                    for z in z_lo..=(z0 + max_delta).min(dim_max) {
                        let home = first_pair && z == z0;
                        for r in index.cell([x, y, z], want_mod, want_target) {
                            if home && r.vertex as usize <= u {
                                continue;
                            }
                            // Intra-vertex trades are never applied by the
                            // matcher; don't emit them.
                            if r.vertex as usize == u {
                                continue;
                            }
                            let partner_sid = vertices[r.vertex as usize].sample_ids[r.slot as usize];
                            let weight = squared_distance(values, store.sample(partner_sid).values());
                            let eid = arena.push(Edge {
                                a: u as u32,
                                b: r.vertex,
                                a_slot: slot as u8,
                                b_slot: r.slot,
                                weight,
                            });
                            let partner = r.vertex as usize;
                            vertices[u].edges.push(eid);
                            vertices[partner].edges.push(eid);
                        }
                    }
                }
            }
        }
    }
    Ok(arena)
}
