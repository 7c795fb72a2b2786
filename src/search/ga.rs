use crate::operators::crossover::crossover;
use crate::operators::mutation::{mutate, MutationProbabilities};
use crate::problem::Problem;
use crate::search::progress::SearchStats;
use crate::solution::Solution;
use crate::types::*;

use rand::seq::IndexedRandom;
use rand::Rng;

/// How often a parent pair is recombined before both offspring are given
/// up on.
const CROSSOVER_RETRIES: usize = 10;

#[derive(Clone, Copy, Debug)]
pub struct GaParams {
    /// Fuel cost weight (`C`).
    pub fuel_weight: f64,
    /// Mean lateness penalty weight (`alpha`).
    pub lateness_weight: f64,
    pub max_iter: usize,
    pub mutation_probabilities: MutationProbabilities,
}

impl Default for GaParams {
    fn default() -> Self {
        GaParams {
            fuel_weight: 1.0,
            lateness_weight: 0.0,
            max_iter: 1000,
            mutation_probabilities: MutationProbabilities::default(),
        }
    }
}

/// State surrendered to the consumer once per iteration.
#[derive(Clone, Debug)]
pub struct GaStep {
    pub iteration: usize,
    pub best: Solution,
    pub best_cost: Money,
    pub crossover_ok: usize,
    pub crossover_total: usize,
}

/// Generational loop over a population of feasible solutions. Implemented
/// as a lazy iterator: each `next` sorts the population, hands the current
/// best back to the caller, and breeds the following generation. The final
/// item is the best of the last sorted population, so a run of `max_iter`
/// iterations yields `max_iter + 1` steps. Dropping the iterator cancels
/// the run.
pub struct Ga<'a, R: Rng> {
    problem: &'a Problem,
    params: GaParams,
    population: Vec<Solution>,
    rng: R,
    stats: SearchStats,
    iteration: usize,
}

impl<'a, R: Rng> Ga<'a, R> {
    pub fn new(problem: &'a Problem, population: Vec<Solution>, params: GaParams, rng: R) -> Self {
        Ga {
            problem,
            params,
            population,
            rng,
            stats: SearchStats::default(),
            iteration: 0,
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    pub fn population(&self) -> &[Solution] {
        &self.population
    }

    fn cost(&self, solution: &mut Solution) -> Money {
        solution.cost(
            self.problem,
            self.params.fuel_weight,
            self.params.lateness_weight,
        )
    }

    /// Stable sort on cost; ties keep their insertion order.
    fn sort_population(&mut self) {
        let problem = self.problem;
        let (c, alpha) = (self.params.fuel_weight, self.params.lateness_weight);
        let mut scored: Vec<(Money, Solution)> = self
            .population
            .drain(..)
            .map(|mut s| {
                let cost = s.cost(problem, c, alpha);
                (cost, s)
            })
            .collect();
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.population = scored.into_iter().map(|(_, s)| s).collect();
    }

    fn crossover_with_retries(&mut self, a: usize, b: usize) -> Vec<Solution> {
        for _ in 0..CROSSOVER_RETRIES {
            self.stats.crossover_total += 1;
            let children = crossover(
                self.problem,
                &self.population[a],
                &self.population[b],
                &mut self.rng,
            );
            if !children.is_empty() {
                self.stats.crossover_ok += 1;
                return children;
            }
        }
        Vec::new()
    }

    /// Produces the next generation: recombine random top-half pairs, run
    /// every offspring through a mutation attempt, top the brood up with
    /// the best of the remainder, and keep the elite half.
    fn breed(&mut self) {
        let half = self.population.len() / 2;
        if half == 0 {
            return;
        }
        let mut brood: Vec<Solution> = Vec::with_capacity(half);

        if half >= 2 {
            let pairs: Vec<(usize, usize)> = (0..half)
                .flat_map(|i| ((i + 1)..half).map(move |j| (i, j)))
                .collect();

            for _ in 0..half {
                if brood.len() >= half {
                    break;
                }
                let &(a, b) = pairs.choose(&mut self.rng).unwrap();
                for mut child in self.crossover_with_retries(a, b) {
                    if brood.len() >= half {
                        break;
                    }
                    mutate(
                        self.problem,
                        &mut child,
                        &self.params.mutation_probabilities,
                        &mut self.stats.mutations,
                        &mut self.rng,
                    );
                    brood.push(child);
                }
            }
        }

        let mut extra = 0;
        while brood.len() < half {
            brood.push(self.population[half + extra].clone());
            extra += 1;
        }

        self.population.truncate(half);
        self.population.append(&mut brood);
    }
}

impl<'a, R: Rng> Iterator for Ga<'a, R> {
    type Item = GaStep;

    fn next(&mut self) -> Option<GaStep> {
        if self.population.is_empty() || self.iteration > self.params.max_iter {
            return None;
        }

        self.sort_population();

        let mut best = self.population[0].clone();
        let best_cost = self.cost(&mut best);
        let step = GaStep {
            iteration: self.iteration,
            best,
            best_cost,
            crossover_ok: self.stats.crossover_ok,
            crossover_total: self.stats.crossover_total,
        };

        if self.iteration < self.params.max_iter {
            self.breed();
        }
        self.iteration += 1;

        Some(step)
    }
}
