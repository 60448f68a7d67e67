//! Real-coded genetic search inside the refinement ranges.
//!
//! Each generation breeds up to `max_children` children from random parent
//! pairs (pairs closer than `incest_limit`, in range-normalised distance,
//! are not mated), mutates each child with probability `mutation_rate`, and
//! keeps the best `population` individuals of parents and children. The
//! run ends after `max_generations`, or after the first generation whose
//! relative improvement of the best fitness is below `stagnation_limit`.
use ndarray::Array1;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    mixture::{MixtureError, MixtureResult},
    optimization::{errors::OptResult, minimizer::Objective},
    refinement::info::RefinementInfo,
};

/// Mutation step as a fraction of each range's width.
const MUTATION_SCALE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneticOptions {
    pub population: usize,
    pub max_children: usize,
    pub incest_limit: f64,
    pub mutation_rate: f64,
    pub max_generations: usize,
    pub stagnation_limit: f64,
    pub seed: u64,
}

impl Default for GeneticOptions {
    fn default() -> Self {
        GeneticOptions {
            population: 30,
            max_children: 30,
            incest_limit: 0.01,
            mutation_rate: 0.8,
            max_generations: 50,
            stagnation_limit: 1e-4,
            seed: 0,
        }
    }
}

impl GeneticOptions {
    /// # Errors
    /// [`MixtureError::InvalidRefineOption`] for the first option out of range:
    /// `population < 2`, zero `max_children` or `max_generations`, a
    /// `mutation_rate` outside `[0, 1]`, or a negative or non-finite
    /// `incest_limit` / `stagnation_limit`.
    pub fn validate(&self) -> MixtureResult<()> {
        let invalid = |option, reason| Err(MixtureError::InvalidRefineOption { option, reason });
        if self.population < 2 {
            return invalid("population", "must be at least 2");
        }
        if self.max_children == 0 {
            return invalid("max_children", "must be at least 1");
        }
        if self.max_generations == 0 {
            return invalid("max_generations", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return invalid("mutation_rate", "must lie in [0, 1]");
        }
        if !self.incest_limit.is_finite() || self.incest_limit < 0.0 {
            return invalid("incest_limit", "must be finite and non-negative");
        }
        if !self.stagnation_limit.is_finite() || self.stagnation_limit < 0.0 {
            return invalid("stagnation_limit", "must be finite and non-negative");
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct Individual {
    genes: Vec<f64>,
    fitness: f64,
}

fn evaluate<F: Objective>(f: &F, genes: Vec<f64>) -> OptResult<Individual> {
    let value = f.value(&Array1::from(genes.clone()))?;
    let fitness = if value.is_finite() { value } else { f64::INFINITY };
    Ok(Individual { genes, fitness })
}

fn distance(a: &[f64], b: &[f64], ranges: &[RefinementInfo]) -> f64 {
    a.iter()
        .zip(b.iter())
        .zip(ranges.iter())
        .map(|((x, y), r)| {
            let span = r.span();
            if span > 0.0 { ((x - y) / span).powi(2) } else { 0.0 }
        })
        .sum::<f64>()
        .sqrt()
}

/// Best `(solution, fitness)` found, the start point included.
///
/// # Errors
/// - Any objective error, cancellation signals included, ends the search.
pub fn run_genetic<F: Objective>(
    f: &F, x0: &[f64], ranges: &[RefinementInfo], opts: &GeneticOptions,
) -> OptResult<(Vec<f64>, f64)> {
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let sample = |rng: &mut StdRng| -> Vec<f64> {
        ranges.iter().map(|r| r.minimum + r.span() * rng.gen::<f64>()).collect()
    };

    let mut population = vec![evaluate(f, x0.to_vec())?];
    for _ in 1..opts.population.max(2) {
        let genes = sample(&mut rng);
        population.push(evaluate(f, genes)?);
    }
    population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
    let mut best = population[0].fitness;

    for _ in 0..opts.max_generations {
        let mut children = Vec::with_capacity(opts.max_children);
        for _ in 0..opts.max_children {
            let i = rng.gen_range(0..population.len());
            let j = rng.gen_range(0..population.len());
            let (a, b) = (&population[i].genes, &population[j].genes);
            if i == j || distance(a, b, ranges) < opts.incest_limit {
                continue;
            }
            let mut genes: Vec<f64> = a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| {
                    let w = rng.gen::<f64>();
                    w * x + (1.0 - w) * y
                })
                .collect();
            if !genes.is_empty() && rng.gen::<f64>() < opts.mutation_rate {
                let k = rng.gen_range(0..genes.len());
                let step = (rng.gen::<f64>() - 0.5) * 2.0 * MUTATION_SCALE * ranges[k].span();
                genes[k] = ranges[k].clamp(genes[k] + step);
            }
            children.push(evaluate(f, genes)?);
        }

        population.extend(children);
        population.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
        population.truncate(opts.population.max(2));

        let current = population[0].fitness;
        let improvement = if best.is_finite() && best != 0.0 {
            (best - current) / best.abs()
        } else {
            0.0
        };
        best = current;
        if improvement < opts.stagnation_limit {
            break;
        }
    }

    let top = &population[0];
    Ok((top.genes.clone(), top.fitness))
}
