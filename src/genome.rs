//! `Genome`: a DAG of nodes and edges with fixed input/output key sets.
//!
//! Each genome exclusively owns its nodes and edges; crossover always
//! copies by value into a fresh child rather than sharing structure.

use std::collections::HashMap;

use rand::seq::{IndexedRandom, IteratorRandom};
use rand::Rng;

use crate::config::Config;
use crate::cycle::creates_cycle;
use crate::edge::{Edge, NodeKey};
use crate::node::Node;
use crate::rng::Counters;

#[derive(Debug, Clone)]
pub struct Genome {
    pub key: usize,
    pub input_keys: Vec<NodeKey>,
    pub output_keys: Vec<NodeKey>,
    pub nodes: HashMap<NodeKey, Node>,
    pub edges: HashMap<(NodeKey, NodeKey), Edge>,
}

impl Genome {
    /// Fresh, fully-connected input -> output topology: one node per output
    /// key, one edge per (input, output) pair.
    pub fn new(
        key: usize,
        input_size: usize,
        output_size: usize,
        config: &Config,
        rng: &mut impl Rng,
    ) -> Self {
        let input_keys: Vec<NodeKey> = (1..=input_size as NodeKey).map(|i| -i).collect();
        let output_keys: Vec<NodeKey> = (0..output_size as NodeKey).collect();

        let mut nodes = HashMap::with_capacity(output_size);
        for &k in &output_keys {
            nodes.insert(k, Node::new(k, config, rng));
        }

        let mut edges = HashMap::with_capacity(input_size * output_size);
        for &u in &input_keys {
            for &v in &output_keys {
                edges.insert((u, v), Edge::new(u, v, config, rng));
            }
        }

        Genome {
            key,
            input_keys,
            output_keys,
            nodes,
            edges,
        }
    }

    fn empty_child(&self, key: usize) -> Genome {
        Genome {
            key,
            input_keys: self.input_keys.clone(),
            output_keys: self.output_keys.clone(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }

    /// `dist = nodes_dist + edges_dist`. Symmetric; zero against itself.
    pub fn dist(&self, other: &Genome, config: &Config) -> f64 {
        self.nodes_dist(other, config) + self.edges_dist(other, config)
    }

    fn nodes_dist(&self, other: &Genome, config: &Config) -> f64 {
        if self.nodes.is_empty() && other.nodes.is_empty() {
            return 0.0;
        }

        let mut matched = 0.0;
        let mut disjoint = 0usize;

        for (key, node) in &self.nodes {
            match other.nodes.get(key) {
                Some(other_node) => matched += node.dist(other_node, config),
                None => disjoint += 1,
            }
        }
        for key in other.nodes.keys() {
            if !self.nodes.contains_key(key) {
                disjoint += 1;
            }
        }

        let max_count = self.nodes.len().max(other.nodes.len());
        (matched + config.node_disjoint_coeff * disjoint as f64) / max_count as f64
    }

    fn edges_dist(&self, other: &Genome, config: &Config) -> f64 {
        if self.edges.is_empty() && other.edges.is_empty() {
            return 0.0;
        }

        let mut matched = 0.0;
        let mut disjoint = 0usize;

        for (key, edge) in &self.edges {
            match other.edges.get(key) {
                Some(other_edge) => matched += edge.dist(other_edge, config),
                None => disjoint += 1,
            }
        }
        for key in other.edges.keys() {
            if !self.edges.contains_key(key) {
                disjoint += 1;
            }
        }

        let max_count = self.edges.len().max(other.edges.len());
        (matched + config.edge_disjoint_coeff * disjoint as f64) / max_count as f64
    }

    /// Crossover, asymmetric: `self` is the fitter parent (p1). Returns a
    /// fresh child with `self`'s input/output arity.
    pub fn crossover(
        &self,
        other: &Genome,
        child_key: usize,
        config: &Config,
        counters: &mut Counters,
        rng: &mut impl Rng,
    ) -> Genome {
        let mut child = self.empty_child(child_key);
        self.crossover_edges(other, &mut child, rng);
        self.crossover_nodes(other, &mut child, config, counters, rng);
        child
    }

    fn crossover_edges(&self, other: &Genome, child: &mut Genome, rng: &mut impl Rng) {
        for (&key, edge_p1) in &self.edges {
            let edge = match other.edges.get(&key) {
                None => *edge_p1,
                Some(edge_p2) => {
                    let weight = if rng.random_bool(0.5) {
                        edge_p1.weight
                    } else {
                        edge_p2.weight
                    };
                    let active = if rng.random_bool(0.5) {
                        edge_p1.active
                    } else {
                        edge_p2.active
                    };
                    Edge {
                        uv: key,
                        weight,
                        active,
                    }
                }
            };
            child.edges.insert(key, edge);
        }
    }

    fn crossover_nodes(
        &self,
        other: &Genome,
        child: &mut Genome,
        config: &Config,
        counters: &mut Counters,
        rng: &mut impl Rng,
    ) {
        for (&key, node_p1) in &self.nodes {
            let node = match other.nodes.get(&key) {
                None => *node_p1,
                Some(node_p2) => {
                    let mut new_node = Node::new(counters.next_node_key(), config, rng);
                    new_node.bias = if rng.random_bool(0.5) {
                        node_p1.bias
                    } else {
                        node_p2.bias
                    };
                    new_node.response = if rng.random_bool(0.5) {
                        node_p1.response
                    } else {
                        node_p2.response
                    };
                    new_node.activation = if rng.random_bool(0.5) {
                        node_p1.activation
                    } else {
                        node_p2.activation
                    };
                    new_node.aggregation = if rng.random_bool(0.5) {
                        node_p1.aggregation
                    } else {
                        node_p2.aggregation
                    };
                    new_node
                }
            };
            child.nodes.insert(node.key, node);
        }
    }

    pub fn mutate_(&mut self, config: &Config, counters: &mut Counters, rng: &mut impl Rng) {
        self.mutate_add_node(config, counters, rng);
        self.mutate_del_node(config, rng);
        self.mutate_add_edge(config, rng);
        self.mutate_del_edge(config, rng);
        self.mutate_node_properties(config, rng);
        self.mutate_edge_properties(config, rng);
    }

    fn mutate_add_node(&mut self, config: &Config, counters: &mut Counters, rng: &mut impl Rng) {
        if rng.random::<f64>() >= config.node_add_prob || self.edges.is_empty() {
            return;
        }

        let &key = self
            .edges
            .keys()
            .choose(rng)
            .expect("edges is non-empty");
        let (u, v) = key;
        let old_weight = self.edges.get(&key).unwrap().weight;
        self.edges.get_mut(&key).unwrap().active = false;

        let new_key = counters.next_node_key();
        self.nodes.insert(new_key, Node::new(new_key, config, rng));

        self.edges
            .insert((u, new_key), Edge::with_weight(u, new_key, 1.0));
        self.edges
            .insert((new_key, v), Edge::with_weight(new_key, v, old_weight));
    }

    fn mutate_del_node(&mut self, config: &Config, rng: &mut impl Rng) {
        if rng.random::<f64>() >= config.node_del_prob {
            return;
        }

        let candidate = self
            .nodes
            .keys()
            .filter(|k| !self.output_keys.contains(k))
            .choose(rng)
            .copied();

        let Some(del_key) = candidate else {
            return;
        };

        self.edges
            .retain(|&(u, v), _| u != del_key && v != del_key);
        self.nodes.remove(&del_key);
    }

    fn mutate_add_edge(&mut self, config: &Config, rng: &mut impl Rng) {
        if rng.random::<f64>() >= config.edge_add_prob {
            return;
        }

        let Some(&out_node) = self.nodes.keys().choose(rng) else {
            return;
        };

        let possible_inputs: Vec<NodeKey> = self
            .nodes
            .keys()
            .copied()
            .chain(self.input_keys.iter().copied())
            .collect();
        let Some(&in_node) = possible_inputs.choose(rng) else {
            return;
        };

        let key = (in_node, out_node);
        if self.edges.contains_key(&key) {
            return;
        }
        if self.output_keys.contains(&in_node) && self.output_keys.contains(&out_node) {
            return;
        }
        if creates_cycle(self.edges.keys(), in_node, out_node) {
            return;
        }

        self.edges.insert(key, Edge::new(in_node, out_node, config, rng));
    }

    fn mutate_del_edge(&mut self, config: &Config, rng: &mut impl Rng) {
        if rng.random::<f64>() >= config.edge_del_prob || self.edges.is_empty() {
            return;
        }
        let &key = self.edges.keys().choose(rng).expect("edges is non-empty");
        self.edges.remove(&key);
    }

    fn mutate_node_properties(&mut self, config: &Config, rng: &mut impl Rng) {
        for node in self.nodes.values_mut() {
            node.mutate_(config, rng);
        }
    }

    fn mutate_edge_properties(&mut self, config: &Config, rng: &mut impl Rng) {
        for edge in self.edges.values_mut() {
            edge.mutate_(config, rng);
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

    fn rng(seed: u64) -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(seed)
    }

    #[test]
    fn initial_topology_matches_spec() {
        let genome = Genome::new(1, 2, 1, &config(), &mut rng(0));
        assert_eq!(genome.input_keys, vec![-1, -2]);
        assert_eq!(genome.output_keys, vec![0]);
        assert_eq!(genome.nodes.len(), 1);
        assert!(genome.edges.contains_key(&(-1, 0)));
        assert!(genome.edges.contains_key(&(-2, 0)));
    }

    #[test]
    fn dist_to_self_is_zero() {
        let genome = Genome::new(1, 2, 1, &config(), &mut rng(0));
        assert_eq!(genome.dist(&genome, &config()), 0.0);
    }

    #[test]
    fn dist_is_symmetric() {
        let a = Genome::new(1, 2, 1, &config(), &mut rng(1));
        let b = Genome::new(2, 2, 1, &config(), &mut rng(2));
        assert!((a.dist(&b, &config()) - b.dist(&a, &config())).abs() < 1e-12);
    }

    #[test]
    fn crossover_of_identical_parents_preserves_edge_keys() {
        let config = config();
        let mut counters = Counters::new(config.min_node_count);
        let parent = Genome::new(1, 2, 1, &config, &mut rng(3));
        let child = parent.crossover(&parent, 2, &config, &mut counters, &mut rng(4));
        let parent_keys: std::collections::HashSet<_> = parent.edges.keys().copied().collect();
        let child_keys: std::collections::HashSet<_> = child.edges.keys().copied().collect();
        assert_eq!(parent_keys, child_keys);
    }

    #[test]
    fn add_edge_rejects_self_loop_and_output_to_output() {
        let config = config();
        let mut genome = Genome::new(1, 2, 2, &config, &mut rng(5));
        let before_edges = genome.edges.clone();
        let mut attempts_rng = rng(6);
        for _ in 0..1000 {
            genome.mutate_add_edge(&config, &mut attempts_rng);
        }
        for (&(u, v), _) in &genome.edges {
            assert_ne!(u, v);
            if genome.output_keys.contains(&u) {
                assert!(!genome.output_keys.contains(&v) || before_edges.contains_key(&(u, v)));
            }
        }
    }

    #[test]
    fn add_node_deactivates_split_edge_and_adds_new_node() {
        let config = Config {
            node_add_prob: 1.0,
            node_del_prob: 0.0,
            edge_add_prob: 0.0,
            edge_del_prob: 0.0,
            bias_mutate_rate: 0.0,
            bias_reinit_rate: 0.0,
            activation_mutate_rate: 0.0,
            weight_mutate_rate: 0.0,
            weight_reinit_rate: 0.0,
            active_mutate_rate: 0.0,
            ..config()
        };
        let mut counters = Counters::new(config.min_node_count);
        let mut genome = Genome::new(1, 2, 1, &config, &mut rng(8));
        let original_weight = genome.edges[&(-1, 0)].weight;
        genome.mutate_(&config, &mut counters, &mut rng(9));

        let new_key = *genome
            .nodes
            .keys()
            .find(|&&k| k >= config.min_node_count as NodeKey)
            .expect("a hidden node was created");

        assert!(!genome.edges.values().any(|e| e.uv == (-1, 0) && e.active));
        assert!(genome.edges.contains_key(&(-1, new_key)));
        assert!(genome.edges.contains_key(&(new_key, 0)));
        assert_eq!(genome.edges[&(new_key, 0)].weight, original_weight);
        assert_eq!(genome.edges[&(-1, new_key)].weight, 1.0);
    }
}
