use crate::operators::construction::generate_many_feasible;
use crate::problem::Problem;
use crate::search::ga::{Ga, GaParams, GaStep};
use crate::solution::Solution;
use crate::testutil;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn fixture() -> (Problem, Vec<Solution>) {
    let problem = testutil::random_problem(4, 4, 10, 7, 11);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
    let generated = generate_many_feasible(&problem, 6, 5000, &mut rng);
    assert!(
        !generated.solutions.is_empty(),
        "fixture instance produced no feasible solutions"
    );
    (problem, generated.solutions)
}

fn run(problem: &Problem, population: Vec<Solution>, max_iter: usize, seed: u64) -> Vec<GaStep> {
    let params = GaParams {
        max_iter,
        ..GaParams::default()
    };
    let rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    Ga::new(problem, population, params, rng).collect()
}

#[test]
fn run_yields_one_step_per_iteration_plus_the_final() {
    let (problem, population) = fixture();
    let steps = run(&problem, population, 25, 7);

    assert_eq!(steps.len(), 26);
    assert_eq!(steps.first().unwrap().iteration, 0);
    assert_eq!(steps.last().unwrap().iteration, 25);
}

#[test]
fn best_cost_never_worsens() {
    let (problem, population) = fixture();
    let steps = run(&problem, population, 60, 13);

    for pair in steps.windows(2) {
        assert!(
            pair[1].best_cost <= pair[0].best_cost + 1e-9,
            "best cost worsened between iterations {} and {}",
            pair[0].iteration,
            pair[1].iteration
        );
    }
}

#[test]
fn run_is_deterministic_for_a_seed() {
    let (problem, population) = fixture();

    let first = run(&problem, population.clone(), 30, 99);
    let second = run(&problem, population, 30, 99);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.best_cost, b.best_cost);
        assert_eq!(a.best, b.best);
        assert_eq!(a.crossover_ok, b.crossover_ok);
        assert_eq!(a.crossover_total, b.crossover_total);
    }
}

#[test]
fn cached_cost_matches_scratch_recomputation() {
    let (problem, population) = fixture();
    let steps = run(&problem, population, 20, 3);

    let mut best = steps.last().unwrap().best.clone();
    let cached = best.cost(&problem, 1.0, 0.0);
    best.recalculate(&problem);
    assert_eq!(best.cost(&problem, 1.0, 0.0), cached);
}

#[test]
fn crossover_counters_accumulate() {
    let (problem, population) = fixture();
    if population.len() < 4 {
        return;
    }
    let steps = run(&problem, population, 40, 23);

    for pair in steps.windows(2) {
        assert!(pair[1].crossover_total >= pair[0].crossover_total);
        assert!(pair[1].crossover_ok <= pair[1].crossover_total);
    }
}

#[test]
fn single_solution_population_is_stable() {
    let problem = testutil::single_package_problem();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let generated = generate_many_feasible(&problem, 1, 10, &mut rng);
    assert_eq!(generated.solutions.len(), 1);

    let steps = run(&problem, generated.solutions, 15, 1);
    assert_eq!(steps.len(), 16);
    for step in &steps {
        assert_eq!(step.best_cost, 426.0);
    }
}

#[test]
fn search_improves_on_the_initial_population() {
    let (problem, population) = fixture();
    let steps = run(&problem, population, 150, 41);

    let initial = steps.first().unwrap().best_cost;
    let final_best = steps.last().unwrap().best_cost;
    assert!(final_best <= initial);
}

// Benchmark-scale run; takes minutes in debug builds.
#[ignore]
#[test]
fn search_improves_on_a_large_instance() {
    let problem = testutil::random_problem(50, 50, 100, 20, 64);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(64);
    let generated = generate_many_feasible(&problem, 8, 100_000, &mut rng);
    assert!(generated.solutions.len() >= 2);

    let steps = run(&problem, generated.solutions, 1000, 64);
    let initial = steps.first().unwrap().best_cost;
    let final_best = steps.last().unwrap().best_cost;
    assert!(final_best < initial);
}
