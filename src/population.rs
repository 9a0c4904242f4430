//! A generation's genomes, keyed by genome id, plus child creation.

use std::collections::HashMap;

use rand::Rng;

use crate::config::Config;
use crate::error::{NeatError, Result};
use crate::genome::Genome;
use crate::rng::Counters;
use crate::species::Partitions;

#[derive(Debug, Clone, Default)]
pub struct Population {
    pub genomes: HashMap<usize, Genome>,
    pub ancestors: HashMap<usize, (usize, usize)>,
}

impl Population {
    /// `population_size` fresh, unconnected-beyond-input-output genomes.
    pub fn initial(config: &Config, counters: &mut Counters, rng: &mut impl Rng) -> Result<Self> {
        if config.output_size >= config.min_node_count {
            return Err(NeatError::OutputSizeTooLarge {
                output_size: config.output_size,
                min_node_count: config.min_node_count,
            });
        }

        let mut genomes = HashMap::with_capacity(config.population_size);
        let mut ancestors = HashMap::with_capacity(config.population_size);

        for _ in 0..config.population_size {
            let gid = counters.next_genome_id();
            genomes.insert(
                gid,
                Genome::new(gid, config.input_size, config.output_size, config, rng),
            );
            ancestors.insert(gid, (0, 0));
        }

        Ok(Population { genomes, ancestors })
    }

    /// Speciates this generation against `previous`'s partitions.
    pub fn partition(&self, previous: &Partitions, config: &Config) -> Partitions {
        previous.repartition(&self.genomes, config)
    }

    /// Crossover of the fitter-first pair followed by mutation, producing
    /// one fresh child genome.
    pub fn new_child(
        &self,
        p1: usize,
        p2: usize,
        fitnesses: &HashMap<usize, f64>,
        config: &Config,
        counters: &mut Counters,
        rng: &mut impl Rng,
    ) -> Genome {
        let (fitter, other) = if fitnesses[&p1] >= fitnesses[&p2] {
            (p1, p2)
        } else {
            (p2, p1)
        };

        let child_key = counters.next_genome_id();
        let mut child = self.genomes[&fitter].crossover(&self.genomes[&other], child_key, config, counters, rng);
        child.mutate_(config, counters, rng);
        child
    }
}
