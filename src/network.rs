//! Genotype to phenotype compilation: turn a `Genome`'s active edges into a
//! feedforward evaluation order, then evaluate it.

use std::collections::{HashMap, HashSet};

use crate::activation::Aggregation;
use crate::edge::NodeKey;
use crate::error::{NeatError, Result};
use crate::genome::Genome;

struct EvalNode {
    key: NodeKey,
    activation: crate::activation::Activation,
    aggregation: Aggregation,
    bias: f64,
    incoming: Vec<(NodeKey, f64)>,
}

/// A compiled, feedforward phenotype: a fixed evaluation order over
/// [`EvalNode`]s derived from one genome's active edges.
pub struct FeedforwardNetwork {
    input_keys: Vec<NodeKey>,
    output_keys: Vec<NodeKey>,
    eval_nodes: Vec<EvalNode>,
}

impl FeedforwardNetwork {
    /// Compiles `genome`'s active sub-DAG into an evaluation order.
    pub fn new(genome: &Genome) -> Self {
        let edges: Vec<(NodeKey, NodeKey)> = genome
            .edges
            .values()
            .filter(|e| e.active)
            .map(|e| e.uv)
            .collect();

        let required = required_nodes(&edges, &genome.input_keys, &genome.output_keys);
        let layers = make_layers(&required, &edges, &genome.input_keys);
        let eval_nodes = make_eval_nodes(&layers, &edges, genome);

        FeedforwardNetwork {
            input_keys: genome.input_keys.clone(),
            output_keys: genome.output_keys.clone(),
            eval_nodes,
        }
    }

    /// Runs one forward pass. `inputs.len()` must equal the genome's
    /// `input_size`.
    pub fn forward(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        if inputs.len() != self.input_keys.len() {
            return Err(NeatError::InputSizeMismatch {
                expected: self.input_keys.len(),
                actual: inputs.len(),
            });
        }

        let mut values: HashMap<NodeKey, f64> = HashMap::new();
        for &k in self.input_keys.iter().chain(self.output_keys.iter()) {
            values.insert(k, 0.0);
        }
        for (&k, &x) in self.input_keys.iter().zip(inputs) {
            values.insert(k, x);
        }

        for node in &self.eval_nodes {
            let weighted: Vec<f64> = node
                .incoming
                .iter()
                .map(|&(src, w)| values[&src] * w)
                .collect();
            let agg = node.aggregation.aggregate(&weighted);
            values.insert(node.key, node.activation.activate(node.bias + agg));
        }

        Ok(self.output_keys.iter().map(|k| values[k]).collect())
    }
}

/// Nodes reachable by walking backwards from the outputs along active
/// edges, stopping at input keys.
fn required_nodes(
    edges: &[(NodeKey, NodeKey)],
    input_keys: &[NodeKey],
    output_keys: &[NodeKey],
) -> HashSet<NodeKey> {
    let mut required: HashSet<NodeKey> = output_keys.iter().copied().collect();
    let mut seen = required.clone();

    loop {
        let layer: HashSet<NodeKey> = edges
            .iter()
            .filter(|&&(u, v)| seen.contains(&v) && !seen.contains(&u))
            .map(|&(u, _)| u)
            .collect();
        if layer.is_empty() {
            break;
        }

        let layer_nodes: HashSet<NodeKey> = layer
            .iter()
            .filter(|u| !input_keys.contains(u))
            .copied()
            .collect();
        if layer_nodes.is_empty() {
            break;
        }

        required.extend(layer_nodes);
        seen.extend(layer);
    }

    required
}

/// Forward topological layering: each layer holds the required nodes whose
/// entire incoming set is already in `seen`.
fn make_layers(
    required: &HashSet<NodeKey>,
    edges: &[(NodeKey, NodeKey)],
    input_keys: &[NodeKey],
) -> Vec<HashSet<NodeKey>> {
    let mut layers = Vec::new();
    let mut seen: HashSet<NodeKey> = input_keys.iter().copied().collect();

    loop {
        let candidates: HashSet<NodeKey> = edges
            .iter()
            .filter(|&&(u, v)| seen.contains(&u) && !seen.contains(&v))
            .map(|&(_, v)| v)
            .collect();

        let layer: HashSet<NodeKey> = candidates
            .into_iter()
            .filter(|w| {
                required.contains(w)
                    && edges.iter().filter(|&&(_, v)| v == *w).all(|&(u, _)| seen.contains(&u))
            })
            .collect();

        if layer.is_empty() {
            break;
        }

        seen.extend(layer.iter().copied());
        layers.push(layer);
    }

    layers
}

fn make_eval_nodes(
    layers: &[HashSet<NodeKey>],
    edges: &[(NodeKey, NodeKey)],
    genome: &Genome,
) -> Vec<EvalNode> {
    let mut eval_nodes = Vec::new();
    for layer in layers {
        for &key in layer {
            let incoming: Vec<(NodeKey, f64)> = edges
                .iter()
                .filter(|&&(_, v)| v == key)
                .map(|&(u, v)| (u, genome.edges[&(u, v)].weight))
                .collect();
            let node = &genome.nodes[&key];
            eval_nodes.push(EvalNode {
                key,
                activation: node.activation,
                aggregation: node.aggregation,
                bias: node.bias,
                incoming,
            });
        }
    }
    eval_nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use rand::SeedableRng;

    #[test]
    fn feedforward_over_fresh_topology_matches_input_output_arity() {
        let config = Config::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let genome = Genome::new(1, 3, 2, &config, &mut rng);
        let network = FeedforwardNetwork::new(&genome);
        let output = network.forward(&[1.0, 0.5, -0.2]).unwrap();
        assert_eq!(output.len(), 2);
    }

    #[test]
    fn wrong_input_size_is_an_error() {
        let config = Config::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let genome = Genome::new(1, 3, 1, &config, &mut rng);
        let network = FeedforwardNetwork::new(&genome);
        assert!(network.forward(&[1.0]).is_err());
    }

    #[test]
    fn hidden_node_behind_inactive_edge_is_not_evaluated() {
        let config = Config::default();
        let mut counters = crate::rng::Counters::new(config.min_node_count);
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let mut genome = Genome::new(1, 1, 1, &config, &mut rng);

        let hidden = counters.next_node_key();
        genome
            .nodes
            .insert(hidden, crate::node::Node::new(hidden, &config, &mut rng));
        genome
            .edges
            .insert((-1, hidden), crate::edge::Edge::with_weight(-1, hidden, 1.0));
        let mut dangling = crate::edge::Edge::with_weight(hidden, 0, 1.0);
        dangling.active = false;
        genome.edges.insert((hidden, 0), dangling);

        let network = FeedforwardNetwork::new(&genome);
        assert!(!network.eval_nodes.iter().any(|n| n.key == hidden));
    }
}
