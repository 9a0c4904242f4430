//! The generation loop: evaluate, speciate, reproduce, repeat until a
//! stop criterion is met.

use std::collections::HashMap;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::genome::Genome;
use crate::population::Population;
use crate::rng::Counters;
use crate::species::Partitions;

/// One generation's outcome: mean and max fitness, reported for logging
/// and for the stop criterion.
#[derive(Debug, Clone, Copy)]
pub struct GenerationStats {
    pub generation: usize,
    pub mean_fitness: f64,
    pub max_fitness: f64,
    pub population_size: usize,
    pub partition_count: usize,
}

/// Builds the next generation's population from the current one's
/// fitnesses: elitism, a fitness-proportional quota per species, then
/// crossover + mutation to fill the rest.
pub fn next_generation(
    fitnesses: &HashMap<usize, f64>,
    population: &Population,
    partitions: &Partitions,
    config: &Config,
    counters: &mut Counters,
    rng: &mut impl Rng,
) -> Result<Population> {
    let adjusted = partitions.adjust_fitnesses(fitnesses, config)?;
    let sizes = partitions.next_partition_sizes(&adjusted, population.genomes.len(), config);

    let mut next = Population::default();

    for partition in partitions.partitions.values() {
        let mut size = sizes[&partition.key] as i64;

        let mut members = partition.members.clone();
        members.sort_by(|a, b| fitnesses[b].partial_cmp(&fitnesses[a]).expect("fitness is never NaN"));

        for &gid in members.iter().take(config.elitism) {
            next.genomes.insert(gid, population.genomes[&gid].clone());
            next.ancestors.insert(gid, (gid, gid));
            size -= 1;
        }

        let cutoff = ((config.cutoff_pct * members.len() as f64).ceil() as usize).max(2);
        let old_members = &members[..members.len().min(cutoff)];

        while size > 0 {
            size -= 1;
            let &gid1 = old_members.choose(rng).expect("old_members is non-empty");
            let &gid2 = old_members.choose(rng).expect("old_members is non-empty");
            let child = population.new_child(gid1, gid2, fitnesses, config, counters, rng);
            next.ancestors.insert(child.key, (gid1, gid2));
            next.genomes.insert(child.key, child);
        }
    }

    Ok(next)
}

/// Runs generations until `fitness_fn`'s per-generation output satisfies
/// `config.stop_criterion` against `config.stop_threshold`, or
/// `config.max_generations` is exceeded. Returns the fittest genome seen
/// in the final generation along with the run's stats history.
pub fn run(
    config: &Config,
    mut fitness_fn: impl FnMut(&Genome) -> f64,
    rng: &mut impl Rng,
) -> Result<(Genome, Vec<GenerationStats>)> {
    let mut counters = Counters::new(config.min_node_count);
    let mut population = Population::initial(config, &mut counters, rng)?;
    let mut partitions = Partitions::new().repartition(&population.genomes, config);

    let mut stats = Vec::new();
    let mut generation = 0;

    loop {
        generation += 1;

        let fitnesses: HashMap<usize, f64> = population
            .genomes
            .iter()
            .map(|(&gid, genome)| (gid, fitness_fn(genome)))
            .collect();

        let values: Vec<f64> = fitnesses.values().copied().collect();
        let mean_fitness = values.iter().sum::<f64>() / values.len() as f64;
        let max_fitness = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        stats.push(GenerationStats {
            generation,
            mean_fitness,
            max_fitness,
            population_size: population.genomes.len(),
            partition_count: partitions.partitions.len(),
        });

        let criterion_value = config.stop_criterion.reduce(&values);
        if criterion_value >= config.stop_threshold || generation > config.max_generations {
            let (&best_gid, _) = fitnesses
                .iter()
                .max_by(|a, b| a.1.partial_cmp(b.1).expect("fitness is never NaN"))
                .expect("population is non-empty");
            info!(generation, max_fitness, "stopping");
            return Ok((population.genomes[&best_gid].clone(), stats));
        }

        info!(
            generation,
            mean_fitness,
            max_fitness,
            population = population.genomes.len(),
            partitions = partitions.partitions.len(),
            "generation complete"
        );
        debug!(?fitnesses, "per-genome fitness");

        population = next_generation(&fitnesses, &population, &partitions, config, &mut counters, rng)?;
        partitions = population.partition(&partitions, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn run_stops_once_stop_threshold_is_reached() {
        let config = Config {
            population_size: 10,
            input_size: 2,
            output_size: 1,
            max_generations: 50,
            stop_threshold: 0.0,
            ..Config::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let (_, stats) = run(&config, |_| 1.0, &mut rng).unwrap();
        assert_eq!(stats.len(), 1);
        assert!(stats[0].max_fitness >= config.stop_threshold);
    }

    #[test]
    fn run_respects_max_generations_when_threshold_unreachable() {
        let config = Config {
            population_size: 10,
            input_size: 2,
            output_size: 1,
            max_generations: 3,
            stop_threshold: 1_000_000.0,
            ..Config::default()
        };
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (_, stats) = run(&config, |_| 0.0, &mut rng).unwrap();
        assert_eq!(stats.len(), 4);
    }
}
