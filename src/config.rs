//! Every numeric knob the core reads, collected into one struct so a caller
//! can override a subset with struct-update syntax:
//!
//! ```
//! use neat::config::Config;
//! let config = Config { node_add_prob: 0.5, ..Config::default() };
//! ```

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // General parameters.
    pub population_size: usize,
    pub input_size: usize,
    pub output_size: usize,

    // Node-key allocation.
    pub min_node_count: usize,

    // Reproduction policy.
    pub elitism: usize,
    pub cutoff_pct: f64,
    pub min_fitness_range: f64,
    pub min_species_size: usize,
    pub compatibility_threshold: f64,

    // Distance coefficients.
    pub node_dist_coeff: f64,
    pub node_disjoint_coeff: f64,
    pub edge_dist_coeff: f64,
    pub edge_disjoint_coeff: f64,

    // Mutation probabilities.
    pub node_add_prob: f64,
    pub node_del_prob: f64,
    pub edge_add_prob: f64,
    pub edge_del_prob: f64,
    pub weight_mutate_rate: f64,
    pub weight_reinit_rate: f64,
    pub active_mutate_rate: f64,
    pub bias_mutate_rate: f64,
    pub bias_reinit_rate: f64,
    pub activation_mutate_rate: f64,
    pub aggregation_mutate_rate: f64,

    // Mutation / init scales.
    pub weight_mutate_scale: f64,
    pub bias_mutate_scale: f64,
    pub weight_init_scale: f64,
    pub bias_init_scale: f64,

    // Run control.
    pub max_generations: usize,
    pub stop_threshold: f64,
    pub stop_criterion: StopCriterion,
}

/// Reduction from a generation's fitness values to the scalar `run` compares
/// against `stop_threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCriterion {
    Max,
    Mean,
}

impl StopCriterion {
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            StopCriterion::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            StopCriterion::Mean => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 150,
            input_size: 2,
            output_size: 1,

            min_node_count: 10,

            elitism: 2,
            cutoff_pct: 0.2,
            min_fitness_range: 1.0,
            min_species_size: 2,
            compatibility_threshold: 3.0,

            node_dist_coeff: 0.5,
            node_disjoint_coeff: 1.0,
            edge_dist_coeff: 0.5,
            edge_disjoint_coeff: 1.0,

            node_add_prob: 0.3,
            node_del_prob: 0.2,
            edge_add_prob: 0.3,
            edge_del_prob: 0.2,
            weight_mutate_rate: 0.8,
            weight_reinit_rate: 0.1,
            active_mutate_rate: 0.01,
            bias_mutate_rate: 0.7,
            bias_reinit_rate: 0.1,
            activation_mutate_rate: 0.20,
            aggregation_mutate_rate: 0.05,

            weight_mutate_scale: 0.5,
            bias_mutate_scale: 0.5,
            weight_init_scale: 1.0,
            bias_init_scale: 1.0,

            max_generations: 200,
            stop_threshold: 4.0 - 1e-3,
            stop_criterion: StopCriterion::Max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_output_size_below_min_node_count() {
        let config = Config::default();
        assert!(config.output_size < config.min_node_count);
    }

    #[test]
    fn stop_criterion_reduces() {
        let values = [1.0, 3.0, 2.0];
        assert_eq!(StopCriterion::Max.reduce(&values), 3.0);
        assert_eq!(StopCriterion::Mean.reduce(&values), 2.0);
    }
}
