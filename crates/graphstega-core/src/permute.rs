//! Seeded sample permutation.
//!
//! Embedding and extraction must draw sample indices in exactly the same
//! order, so the permutation is a deterministic function of `(seed, len)`
//! alone. Both sides consume only the prefix they need; the incremental
//! Fisher-Yates below keeps memory proportional to that prefix instead of
//! materialising the whole shuffle.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Draws each index in `[0, len)` exactly once, in seeded pseudo-random order.
#[derive(Debug, Clone)]
pub struct IndexPermutation {
    rng: ChaCha8Rng,
    /// Sparse view of the virtual array `[0, len)` after the swaps performed
    /// so far; untouched slots map to themselves.
    swaps: HashMap<usize, usize>,
    next: usize,
    len: usize,
}

impl IndexPermutation {
    /// Permutation of `[0, len)` determined by `seed`.
    #[must_use]
    pub fn new(seed: u64, len: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            swaps: HashMap::new(),
            next: 0,
            len,
        }
    }

    /// Indices not yet drawn.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len - self.next
    }

    fn slot(&self, i: usize) -> usize {
        self.swaps.get(&i).copied().unwrap_or(i)
    }
}

impl Iterator for IndexPermutation {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.len {
            return None;
        }
        let i = self.next;
        let j = self.rng.gen_range(i..self.len);
        let drawn = self.slot(j);
        let displaced = self.slot(i);
        self.swaps.insert(j, displaced);
        self.swaps.remove(&i);
        self.next = i + 1;
        Some(drawn)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.remaining();
        (rest, Some(rest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_a_permutation() {
        let mut drawn: Vec<usize> = IndexPermutation::new(7, 100).collect();
        drawn.sort_unstable();
        assert_eq!(drawn, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_deterministic_for_equal_seed_and_len() {
        let a: Vec<usize> = IndexPermutation::new(42, 64).collect();
        let b: Vec<usize> = IndexPermutation::new(42, 64).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_prefix_is_stable() {
        // Consuming only a prefix must match the full sequence's prefix.
        let full: Vec<usize> = IndexPermutation::new(3, 1000).collect();
        let prefix: Vec<usize> = IndexPermutation::new(3, 1000).take(10).collect();
        assert_eq!(prefix, full[..10]);
    }

    #[test]
    fn test_seeds_differ() {
        let a: Vec<usize> = IndexPermutation::new(1, 64).collect();
        let b: Vec<usize> = IndexPermutation::new(2, 64).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_and_singleton() {
        assert_eq!(IndexPermutation::new(0, 0).next(), None);
        let mut one = IndexPermutation::new(0, 1);
        assert_eq!(one.next(), Some(0));
        assert_eq!(one.next(), None);
    }
}
