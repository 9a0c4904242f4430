//! A directed, weighted connection between two node keys.
//!
//! `uv` is the edge's identity within a genome: a genome holds at most one
//! `Edge` per ordered pair.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::Config;

pub type NodeKey = i64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub uv: (NodeKey, NodeKey),
    pub weight: f64,
    pub active: bool,
}

impl Edge {
    pub fn new(u: NodeKey, v: NodeKey, config: &Config, rng: &mut impl Rng) -> Self {
        let weight = Normal::new(0.0, config.weight_init_scale)
            .expect("valid weight init scale")
            .sample(rng);
        Edge::with_weight(u, v, weight)
    }

    pub fn with_weight(u: NodeKey, v: NodeKey, weight: f64) -> Self {
        Edge {
            uv: (u, v),
            weight,
            active: true,
        }
    }

    /// Distance between this edge and `other`, scaled by `EDGE_DIST_COEFF`.
    pub fn dist(&self, other: &Edge, config: &Config) -> f64 {
        let mut d = (self.weight - other.weight).abs();
        if self.active != other.active {
            d += 1.0;
        }
        config.edge_dist_coeff * d
    }

    pub fn mutate_(&mut self, config: &Config, rng: &mut impl Rng) {
        let r: f64 = rng.random();
        if r < config.weight_mutate_rate {
            let delta = Normal::new(0.0, config.weight_mutate_scale)
                .expect("valid weight mutate scale")
                .sample(rng);
            self.weight = (self.weight + delta).clamp(-30.0, 30.0);
        } else if r < config.weight_mutate_rate + config.weight_reinit_rate {
            self.weight = Normal::new(0.0, config.weight_init_scale)
                .expect("valid weight init scale")
                .sample(rng);
        }

        if rng.random::<f64>() < config.active_mutate_rate {
            self.active = rng.random::<f64>() < 0.5;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn config() -> Config {
        Config::default()
    }

    #[test]
    fn dist_to_self_is_zero() {
        let edge = Edge::with_weight(-1, 0, 0.5);
        assert_eq!(edge.dist(&edge, &config()), 0.0);
    }

    #[test]
    fn dist_penalizes_active_mismatch() {
        let config = config();
        let a = Edge::with_weight(-1, 0, 1.0);
        let mut b = a;
        b.active = false;
        assert_eq!(a.dist(&b, &config), config.edge_dist_coeff);
    }

    #[test]
    fn mutate_clamps_weight_within_bounds() {
        let config = config();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut edge = Edge::new(-1, 0, &config, &mut rng);
        for _ in 0..10_000 {
            edge.mutate_(&config, &mut rng);
            assert!(edge.weight >= -30.0 && edge.weight <= 30.0);
        }
    }
}
