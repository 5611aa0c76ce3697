//! Greedy minimum-weight matching.
//!
//! Vertices are visited in ascending order of edge degree, so the ones with
//! the fewest options choose first; each then takes its lightest edge whose
//! other endpoint is still free. Committing an edge swaps the two samples
//! and consumes both vertices.

use crate::graph::edges::EdgeArena;
use crate::sample::SampleStore;
use crate::vertex::Vertex;

/// Run one matching pass over `left`, returning the vertices that found no
/// partner. Every vertex in `left` has its edge list cleared on return.
pub(crate) fn run(
    left: &[u32],
    vertices: &mut [Vertex],
    arena: &EdgeArena,
    store: &mut SampleStore,
) -> Vec<u32> {
    let mut order: Vec<u32> = left.to_vec();
    // Stable: ties keep input order.
    order.sort_by_key(|&u| vertices[u as usize].edges.len());

    let mut leftovers = Vec::new();
    for &u in &order {
        if !vertices[u as usize].is_valid {
            continue;
        }
        let mut edge_ids = std::mem::take(&mut vertices[u as usize].edges);
        edge_ids.sort_by_key(|&e| arena.weight(e));

        let mut matched = false;
        for &eid in &edge_ids {
            let (v, u_slot, v_slot) = arena.get(eid).counterpart(u);
            if v == u || !vertices[v as usize].is_valid {
                continue;
            }
            let a = vertices[u as usize].sample_ids[u_slot as usize];
            let b = vertices[v as usize].sample_ids[v_slot as usize];
            store.swap_values(a, b);
            vertices[u as usize].is_valid = false;
            vertices[v as usize].is_valid = false;
            vertices[u as usize].refresh_value(store);
            vertices[v as usize].refresh_value(store);
            matched = true;
            break;
        }
        if !matched {
            leftovers.push(u);
        }
    }

    for &u in left {
        vertices[u as usize].edges.clear();
    }
    leftovers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::edges::{Edge, find_edges};
    use crate::graph::spatial::SpatialIndex;
    use crate::params::Preset;
    use crate::progress::{CancelToken, NoopReporter};

    fn single_sample_vertices(store: &SampleStore) -> Vec<Vertex> {
        (0..store.len())
            .map(|i| {
                let mut v = Vertex {
                    sample_ids: vec![i as u32],
                    value: 0,
                    chunk: Some(0),
                    is_valid: true,
                    edges: Vec::new(),
                };
                v.refresh_value(store);
                v
            })
            .collect()
    }

    fn find(store: &SampleStore, vertices: &mut [Vertex]) -> EdgeArena {
        let params = Preset::Default.parameters();
        let index = SpatialIndex::index_message_vertices(
            params.precision_shift(),
            0..vertices.len(),
            vertices,
            store,
        );
        find_edges(
            0..vertices.len(),
            vertices,
            store,
            &index,
            &params,
            &NoopReporter,
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_complementary_pair_is_matched_and_swapped() {
        let mut store = SampleStore::from_buffer(&[1, 0, 0, 2, 0, 0], 0b11);
        store.set_target(0, 2);
        store.set_target(1, 1);
        let mut vertices = single_sample_vertices(&store);
        let arena = find(&store, &mut vertices);
        let leftovers = run(&[0, 1], &mut vertices, &arena, &mut store);

        assert!(leftovers.is_empty());
        assert!(!vertices[0].is_valid);
        assert!(!vertices[1].is_valid);
        // The swap moved each sample to its slot's target mod value.
        assert_eq!(store.sample(0).mod_value(), 2);
        assert_eq!(store.sample(1).mod_value(), 1);
    }

    #[test]
    fn test_lightest_edge_wins() {
        // Vertex 0 (mod 1, wants 2) can trade with vertex 1 (weight 1) or
        // vertex 2 (heavier); both partners hold mod 2 and want mod 1.
        let mut store = SampleStore::from_buffer(&[1, 0, 0, 2, 0, 0, 6, 0, 0], 0b11);
        store.set_target(0, 2);
        store.set_target(1, 1);
        store.set_target(2, 1);
        let mut vertices = single_sample_vertices(&store);
        let arena = find(&store, &mut vertices);
        let leftovers = run(&[0, 1, 2], &mut vertices, &arena, &mut store);

        // 1 and 2 have degree 1 each, 0 has degree 2; degree order puts a
        // partner first, and it picks its only edge to 0.
        assert_eq!(leftovers.len(), 1);
        assert!(!vertices[0].is_valid);
        let leftover = leftovers[0] as usize;
        assert!(vertices[leftover].is_valid, "leftover must stay valid");
    }

    #[test]
    fn test_leftovers_keep_validity_and_lists_are_cleared() {
        let mut store = SampleStore::from_buffer(&[1, 0, 0, 3, 0, 0], 0b11);
        store.set_target(0, 2); // nobody holds mod 2
        store.set_target(1, 2);
        let mut vertices = single_sample_vertices(&store);
        let arena = find(&store, &mut vertices);
        assert_eq!(arena.len(), 0);
        let leftovers = run(&[0, 1], &mut vertices, &arena, &mut store);
        assert_eq!(leftovers, vec![0, 1]);
        assert!(vertices.iter().all(|v| v.is_valid));
        assert!(vertices.iter().all(|v| v.edges.is_empty()));
    }

    #[test]
    fn test_consumed_vertices_are_not_leftovers() {
        // Three mutually-tradable vertices: one pair matches, the odd one
        // out is a leftover.
        let mut store = SampleStore::from_buffer(&[1, 0, 0, 1, 0, 0, 1, 0, 0], 0b11);
        for id in 0..3 {
            store.set_target(id, 1);
        }
        let mut vertices = single_sample_vertices(&store);
        let arena = find(&store, &mut vertices);
        let leftovers = run(&[0, 1, 2], &mut vertices, &arena, &mut store);
        assert_eq!(leftovers.len(), 1);
        assert_eq!(
            vertices.iter().filter(|v| !v.is_valid).count(),
            2,
            "exactly one pair consumed"
        );
    }

    #[test]
    fn test_self_edges_are_never_applied() {
        // An artificial self-edge must be skipped, not committed.
        let mut store = SampleStore::from_buffer(&[1, 0, 0, 2, 0, 0], 0b11);
        let mut vertices = vec![Vertex {
            sample_ids: vec![0, 1],
            value: 0,
            chunk: Some(0),
            is_valid: true,
            edges: vec![0],
        }];
        vertices[0].refresh_value(&store);
        let mut arena = EdgeArena::default();
        arena.push(Edge {
            a: 0,
            b: 0,
            a_slot: 0,
            b_slot: 1,
            weight: 1,
        });
        let leftovers = run(&[0], &mut vertices, &arena, &mut store);
        assert_eq!(leftovers, vec![0]);
        assert!(vertices[0].is_valid);
        assert_eq!(store.sample(0).values(), [1, 0, 0]);
    }
}
