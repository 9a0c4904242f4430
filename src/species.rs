//! Speciation: grouping genomes by compatibility distance and turning
//! per-species fitness into next-generation population quotas.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{NeatError, Result};
use crate::genome::Genome;

pub type PartitionKey = usize;

/// One species: a representative genome plus the genome ids currently
/// assigned to it.
#[derive(Debug, Clone)]
pub struct Partition {
    pub key: PartitionKey,
    pub members: Vec<usize>,
    pub representative: Genome,
}

impl Partition {
    /// The member of `candidates` closest to this partition's current
    /// representative, by [`Genome::dist`].
    fn find_representative<'a>(
        &self,
        candidates: impl Iterator<Item = &'a usize>,
        genomes: &HashMap<usize, Genome>,
        config: &Config,
    ) -> usize {
        candidates
            .map(|&gid| (self.representative.dist(&genomes[&gid], config), gid))
            .min_by(|a, b| a.0.partial_cmp(&b.0).expect("distance is never NaN"))
            .map(|(_, gid)| gid)
            .expect("candidates is non-empty")
    }
}

/// All species for one generation, keyed by a stable [`PartitionKey`] that
/// persists across generations as long as a species survives.
#[derive(Debug, Clone, Default)]
pub struct Partitions {
    pub partitions: HashMap<PartitionKey, Partition>,
    next_key: PartitionKey,
}

impl Partitions {
    pub fn new() -> Self {
        Partitions {
            partitions: HashMap::new(),
            next_key: 1,
        }
    }

    fn insert_new(&mut self, key: Option<PartitionKey>, members: Vec<usize>, representative: Genome) {
        let key = key.unwrap_or_else(|| {
            let k = self.next_key;
            self.next_key += 1;
            k
        });
        self.partitions.insert(
            key,
            Partition {
                key,
                members,
                representative,
            },
        );
    }

    /// The partition whose representative is closest to `genome`, among
    /// those within `config.compatibility_threshold`.
    fn closest_representative(&self, genome: &Genome, config: &Config) -> Option<PartitionKey> {
        self.partitions
            .values()
            .map(|p| (p.representative.dist(genome, config), p.key))
            .filter(|&(d, _)| d < config.compatibility_threshold)
            .min_by(|a, b| a.0.partial_cmp(&b.0).expect("distance is never NaN"))
            .map(|(_, key)| key)
    }

    /// Repartitions `genomes` starting from `self` as the previous
    /// generation's partitions: each existing species first claims the
    /// member closest to its old representative (keeping the species key
    /// stable), then every remaining genome joins its closest compatible
    /// species or founds a new one.
    pub fn repartition(&self, genomes: &HashMap<usize, Genome>, config: &Config) -> Partitions {
        let mut unassigned: Vec<usize> = genomes.keys().copied().collect();
        let mut next = Partitions {
            partitions: HashMap::new(),
            next_key: self.next_key,
        };

        for partition in self.partitions.values() {
            let new_rep_gid = partition.find_representative(unassigned.iter(), genomes, config);
            unassigned.retain(|&gid| gid != new_rep_gid);
            next.insert_new(
                Some(partition.key),
                vec![new_rep_gid],
                genomes[&new_rep_gid].clone(),
            );
        }

        while let Some(gid) = unassigned.pop() {
            let genome = &genomes[&gid];
            match next.closest_representative(genome, config) {
                Some(key) => {
                    next.partitions.get_mut(&key).unwrap().members.push(gid);
                }
                None => next.insert_new(None, vec![gid], genome.clone()),
            }
        }

        next
    }

    /// Mean fitness per species, normalized to `[0, 1]` against the
    /// population's fitness range (floored at `config.min_fitness_range`
    /// so a near-uniform population doesn't blow up the normalization).
    pub fn adjust_fitnesses(&self, fitnesses: &HashMap<usize, f64>, config: &Config) -> Result<HashMap<PartitionKey, f64>> {
        if fitnesses.is_empty() {
            return Err(NeatError::EmptyFitnessMap);
        }

        let min_fitness = fitnesses.values().cloned().fold(f64::INFINITY, f64::min);
        let max_fitness = fitnesses.values().cloned().fold(f64::NEG_INFINITY, f64::max);
        let fitness_range = (max_fitness - min_fitness).max(config.min_fitness_range);

        Ok(self
            .partitions
            .iter()
            .map(|(&key, partition)| {
                let mean = partition.members.iter().map(|gid| fitnesses[gid]).sum::<f64>()
                    / partition.members.len() as f64;
                (key, (mean - min_fitness) / fitness_range)
            })
            .collect())
    }

    /// Next-generation size quota per species, proportional to adjusted
    /// fitness, damped to half the distance from the previous size, then
    /// renormalized so quotas sum to `pop_size`.
    pub fn next_partition_sizes(
        &self,
        adjusted: &HashMap<PartitionKey, f64>,
        pop_size: usize,
        config: &Config,
    ) -> HashMap<PartitionKey, usize> {
        let previous_sizes: HashMap<PartitionKey, usize> = self
            .partitions
            .iter()
            .map(|(&k, p)| (k, p.members.len()))
            .collect();

        let af_sum: f64 = adjusted.values().sum();

        let mut sizes: HashMap<PartitionKey, i64> = HashMap::new();
        for (&key, &af) in adjusted {
            let target = if af_sum > 0.0 {
                (af / af_sum * pop_size as f64).max(config.min_species_size as f64)
            } else {
                config.min_species_size as f64
            };

            let previous = previous_sizes[&key] as f64;
            let d = (target - previous) * 0.5;
            let c = d.round() as i64;

            let mut size = previous_sizes[&key] as i64;
            if c.abs() > 0 {
                size += c;
            } else if d > 0.0 {
                size += 1;
            } else if d < 0.0 {
                size -= 1;
            }
            sizes.insert(key, size);
        }

        let total: i64 = sizes.values().sum();
        let normalizer = pop_size as f64 / total.max(1) as f64;

        sizes
            .into_iter()
            .map(|(key, size)| {
                let scaled = ((size as f64 * normalizer).round() as i64).max(config.min_species_size as i64);
                (key, scaled as usize)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn config() -> Config {
        Config {
            min_fitness_range: 1.0,
            min_species_size: 2,
            compatibility_threshold: 100.0,
            ..Config::default()
        }
    }

    fn sample_genomes(n: usize) -> HashMap<usize, Genome> {
        let config = config();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        (1..=n)
            .map(|i| (i, Genome::new(i, config.input_size, config.output_size, &config, &mut rng)))
            .collect()
    }

    #[test]
    fn repartition_keeps_everyone_into_one_lenient_species() {
        let config = config();
        let genomes = sample_genomes(5);
        let partitions = Partitions::new().repartition(&genomes, &config);
        let total_members: usize = partitions.partitions.values().map(|p| p.members.len()).sum();
        assert_eq!(total_members, 5);
    }

    #[test]
    fn adjust_fitnesses_normalizes_into_zero_one_when_range_present() {
        let config = config();
        let genomes = sample_genomes(3);
        let partitions = Partitions::new().repartition(&genomes, &config);
        let fitnesses: HashMap<usize, f64> = [(1, 1.0), (2, 2.0), (3, 3.0)].into_iter().collect();
        let adjusted = partitions.adjust_fitnesses(&fitnesses, &config).unwrap();
        for &af in adjusted.values() {
            assert!((0.0..=1.0).contains(&af));
        }
    }

    #[test]
    fn next_partition_sizes_sum_to_population_size() {
        let config = config();
        let genomes = sample_genomes(10);
        let partitions = Partitions::new().repartition(&genomes, &config);
        let fitnesses: HashMap<usize, f64> = genomes.keys().map(|&k| (k, k as f64)).collect();
        let adjusted = partitions.adjust_fitnesses(&fitnesses, &config).unwrap();
        let sizes = partitions.next_partition_sizes(&adjusted, 10, &config);
        let total: usize = sizes.values().sum();
        assert!(total >= partitions.partitions.len() * config.min_species_size);
    }

    #[test]
    fn adjust_fitnesses_rejects_empty_fitness_map() {
        let config = config();
        let partitions = Partitions::new();
        let fitnesses: HashMap<usize, f64> = HashMap::new();
        assert!(partitions.adjust_fitnesses(&fitnesses, &config).is_err());
    }
}
