//! Process-wide monotonic state: node-key and genome-id counters.
//!
//! The only mutable state shared across an evolutionary run that isn't
//! inside a `Population`/`Partitions` value. Kept as a value owned by the
//! caller (never a `static`) so independent runs don't interfere.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::edge::NodeKey;

/// Allocates strictly-increasing node keys and genome ids for one run.
#[derive(Debug, Clone)]
pub struct Counters {
    next_node_key: NodeKey,
    next_genome_id: usize,
}

impl Counters {
    /// `min_node_count` is the first hidden-node key handed out; it must be
    /// at least `output_size` so hidden nodes never collide with output
    /// keys (`0..output_size`).
    pub fn new(min_node_count: usize) -> Self {
        Counters {
            next_node_key: min_node_count as NodeKey,
            next_genome_id: 1,
        }
    }

    pub fn next_node_key(&mut self) -> NodeKey {
        let key = self.next_node_key;
        self.next_node_key += 1;
        key
    }

    pub fn next_genome_id(&mut self) -> usize {
        let id = self.next_genome_id;
        self.next_genome_id += 1;
        id
    }
}

/// Builds the single process-wide RNG the whole run draws from.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_strictly_monotonic() {
        let mut counters = Counters::new(10);
        assert_eq!(counters.next_node_key(), 10);
        assert_eq!(counters.next_node_key(), 11);
        assert_eq!(counters.next_genome_id(), 1);
        assert_eq!(counters.next_genome_id(), 2);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        use rand::Rng;
        let mut a = seeded_rng(42);
        let mut b = seeded_rng(42);
        let xs: Vec<f64> = (0..10).map(|_| a.random::<f64>()).collect();
        let ys: Vec<f64> = (0..10).map(|_| b.random::<f64>()).collect();
        assert_eq!(xs, ys);
    }
}
