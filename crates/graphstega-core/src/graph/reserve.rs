//! Reserve matching.
//!
//! Message vertices the greedy pass could not serve get a second chance
//! against the reserve vertices, which carry no chunk and can donate any
//! sample. These are cross-set queries, so the colour window is symmetric
//! in every axis and no asymmetry filter is needed; the donor merely has to
//! hold the mod value the leftover sample wants.

use crate::error::EngineError;
use crate::graph::edges::{Edge, EdgeArena, squared_distance};
use crate::graph::spatial::SpatialIndex;
use crate::params::Parameters;
use crate::progress::{CancelToken, PROGRESS_GRANULARITY, Phase, Reporter};
use crate::sample::SampleStore;
use crate::vertex::Vertex;

/// Discover edges from each leftover's samples to reserve donors indexed
/// under the sentinel target.
pub(crate) fn find_reserve_edges(
    leftovers: &[u32],
    vertices: &mut [Vertex],
    store: &SampleStore,
    reserves: &SpatialIndex,
    params: &Parameters,
    reporter: &dyn Reporter,
    cancel: &CancelToken,
) -> Result<EdgeArena, EngineError> {
    let shift = params.precision_shift();
    let dim_max = u16::from(255u8 >> shift);
    let max_delta = u16::from(params.distance_max() >> shift);
    let total = leftovers.len();
    let stride = (total / PROGRESS_GRANULARITY).max(1);

    let mut arena = EdgeArena::default();
    for (done, &u) in leftovers.iter().enumerate() {
        cancel.check()?;
        if done % stride == 0 {
            reporter.tick(Phase::ReserveSearch, done, total);
        }
        debug_assert!(vertices[u as usize].is_valid);
        for slot in 0..vertices[u as usize].sample_ids.len() {
            let sid = vertices[u as usize].sample_ids[slot];
            let s_u = store.sample(sid);
            let values = s_u.values();
            let [x0, y0, z0] = reserves.quantise(values);
            let want_mod = s_u.target_mod_value();

            for x in x0.saturating_sub(max_delta)..=(x0 + max_delta).min(dim_max) {
                for y in y0.saturating_sub(max_delta)..=(y0 + max_delta).min(dim_max) {
                    for z in z0.saturating_sub(max_delta)..=(z0 + max_delta).min(dim_max) {
                        for r in reserves.cell([x, y, z], want_mod, 0) {
                            let donor_sid =
                                vertices[r.vertex as usize].sample_ids[r.slot as usize];
                            let weight =
                                squared_distance(values, store.sample(donor_sid).values());
                            let eid = arena.push(Edge {
                                a: u,
                                b: r.vertex,
                                a_slot: slot as u8,
                                b_slot: r.slot,
                                weight,
                            });
                            let donor = r.vertex as usize;
                            vertices[u as usize].edges.push(eid);
                            vertices[donor].edges.push(eid);
                        }
                    }
                }
            }
        }
    }
    Ok(arena)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::matcher;
    use crate::params::Preset;
    use crate::progress::NoopReporter;

    /// One leftover message vertex (sample 0) and reserve vertices over the
    /// remaining samples.
    fn fixture(buffer: &[u8], target: u8) -> (SampleStore, Vec<Vertex>) {
        let mut store = SampleStore::from_buffer(buffer, 0b11);
        store.set_target(0, target);
        let mut vertices: Vec<Vertex> = (0..store.len())
            .map(|i| Vertex {
                sample_ids: vec![i as u32],
                value: 0,
                chunk: if i == 0 { Some(0) } else { None },
                is_valid: true,
                edges: Vec::new(),
            })
            .collect();
        for v in &mut vertices {
            v.refresh_value(&store);
        }
        (store, vertices)
    }

    fn find(
        store: &SampleStore,
        vertices: &mut [Vertex],
        params: &Parameters,
    ) -> EdgeArena {
        let reserves = SpatialIndex::index_reserve_vertices(
            params.precision_shift(),
            1..vertices.len(),
            vertices,
            store,
        );
        find_reserve_edges(
            &[0],
            vertices,
            store,
            &reserves,
            params,
            &NoopReporter,
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_reserve_donor_found_by_mod_value() {
        // Leftover holds mod 1 and wants 2; reserve sample 1 holds mod 2.
        let buffer = [1, 0, 0, 2, 0, 0, 3, 0, 0];
        let (store, mut vertices) = fixture(&buffer, 2);
        let params = Preset::Default.parameters();
        let arena = find(&store, &mut vertices, &params);
        assert_eq!(arena.len(), 1);
        let e = arena.get(0);
        assert_eq!((e.a, e.b), (0, 1));
    }

    #[test]
    fn test_reserve_window_is_symmetric() {
        // The donor sits *below* the leftover in every channel; the
        // message-side scan would never look there, the reserve scan must.
        let buffer = [108, 108, 108, 102, 102, 102];
        let (mut store, mut vertices) = fixture(&buffer, 0);
        store.set_target(0, store.sample(1).mod_value());
        let params = Preset::Default.parameters();
        let arena = find(&store, &mut vertices, &params);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_reserve_match_consumes_donor() {
        let buffer = [1, 0, 0, 2, 0, 0, 4, 5, 5, 9, 0, 0];
        let (mut store, mut vertices) = fixture(&buffer, 2);
        let params = Preset::Default.parameters();
        let arena = find(&store, &mut vertices, &params);
        assert_eq!(arena.len(), 2);
        let leftovers = matcher::run(&[0], &mut vertices, &arena, &mut store);
        assert!(leftovers.is_empty());
        assert!(!vertices[0].is_valid);
        // The lightest donor (sample 1, identical in two channels) was taken.
        assert!(!vertices[1].is_valid);
        assert_eq!(store.sample(0).mod_value(), 2);
    }

    #[test]
    fn test_consumed_reserves_are_not_reindexed() {
        let buffer = [1, 0, 0, 2, 0, 0];
        let (store, mut vertices) = fixture(&buffer, 2);
        vertices[1].is_valid = false;
        let params = Preset::Default.parameters();
        let arena = find(&store, &mut vertices, &params);
        assert_eq!(arena.len(), 0);
    }
}
