//! A neuron: bias, activation, aggregation, and a (currently unused)
//! response scalar kept for crossover/compatibility.

use rand::seq::IndexedRandom;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::activation::{Activation, Aggregation};
use crate::config::Config;
use crate::edge::NodeKey;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub key: NodeKey,
    pub bias: f64,
    pub response: f64,
    pub activation: Activation,
    pub aggregation: Aggregation,
}

impl Node {
    pub fn new(key: NodeKey, config: &Config, rng: &mut impl Rng) -> Self {
        let normal = Normal::new(0.0, config.bias_init_scale).expect("valid bias init scale");
        Node {
            key,
            bias: normal.sample(rng),
            response: 1.0,
            activation: Activation::Sigmoid,
            aggregation: Aggregation::default(),
        }
    }

    /// Distance between this node and `other`, scaled by `NODE_DIST_COEFF`.
    pub fn dist(&self, other: &Node, config: &Config) -> f64 {
        let mut d = (self.bias - other.bias).abs();
        if self.activation != other.activation {
            d += 1.0;
        }
        if self.aggregation != other.aggregation {
            d += 1.0;
        }
        config.node_dist_coeff * d
    }

    pub fn mutate_(&mut self, config: &Config, rng: &mut impl Rng) {
        let r: f64 = rng.random();
        if r < config.bias_mutate_rate {
            let delta = Normal::new(0.0, config.bias_mutate_scale)
                .expect("valid bias mutate scale")
                .sample(rng);
            self.bias = (self.bias + delta).clamp(-30.0, 30.0);
        } else if r < config.bias_mutate_rate + config.bias_reinit_rate {
            self.bias = Normal::new(0.0, config.bias_init_scale)
                .expect("valid bias init scale")
                .sample(rng);
        }

        if rng.random::<f64>() < config.activation_mutate_rate {
            self.activation = *Activation::ALL.choose(rng).expect("activation set is non-empty");
        }

        if rng.random::<f64>() < config.aggregation_mutate_rate {
            self.aggregation = *Aggregation::ALL.choose(rng).expect("aggregation set is non-empty");
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
        let node = Node::new(0, &config(), &mut rand::rngs::StdRng::seed_from_u64(1));
        assert_eq!(node.dist(&node, &config()), 0.0);
    }

    #[test]
    fn dist_counts_activation_and_aggregation_mismatch() {
        let config = config();
        let mut a = Node::new(0, &config, &mut rand::rngs::StdRng::seed_from_u64(1));
        let mut b = a;
        a.bias = 0.0;
        b.bias = 0.0;
        b.activation = Activation::Tanh;
        assert_eq!(a.dist(&b, &config), config.node_dist_coeff);
    }

    #[test]
    fn mutate_draws_aggregation_from_the_full_set_when_forced() {
        let config = Config {
            aggregation_mutate_rate: 1.0,
            bias_mutate_rate: 0.0,
            bias_reinit_rate: 0.0,
            activation_mutate_rate: 0.0,
            ..Config::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut node = Node::new(0, &config, &mut rng);
        node.mutate_(&config, &mut rng);
        assert!(Aggregation::ALL.contains(&node.aggregation));
    }

    #[test]
    fn mutate_clamps_bias_within_bounds() {
        let config = config();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let mut node = Node::new(0, &config, &mut rng);
        for _ in 0..10_000 {
            node.mutate_(&config, &mut rng);
            assert!(node.bias >= -30.0 && node.bias <= 30.0);
        }
    }
}
