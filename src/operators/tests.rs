use crate::operators::construction::{build_vehicle_route, generate_many_feasible};
use crate::operators::couriers::CourierSwap;
use crate::operators::crossover::crossover;
use crate::operators::mutation::{mutate, Mutation, MutationProbabilities, MutationStats};
use crate::operators::packages::PackageReassign;
use crate::operators::route::RouteReorder;
use crate::operators::vehicles::{UnusedVehicleSwap, UsedVehicleSwap};
use crate::problem::Problem;
use crate::solution::feasibility::{self, EPSILON};
use crate::solution::Solution;
use crate::testutil;
use crate::types::*;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn vehicle(idx: usize) -> VehicleId {
    VehicleId::from_index(idx).unwrap()
}

/// A mid-size instance and a pool of distinct feasible solutions to
/// mutate and recombine.
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

fn catalog(base: &Solution) -> Vec<Box<dyn Mutation>> {
    let mut catalog: Vec<Box<dyn Mutation>> = vec![
        Box::new(CourierSwap::new()),
        Box::new(PackageReassign::new()),
        Box::new(UsedVehicleSwap::new()),
        Box::new(UnusedVehicleSwap::new()),
    ];
    for vehicle in base.used_vehicles() {
        catalog.push(Box::new(RouteReorder::new(vehicle)));
    }
    catalog
}

#[test]
fn generator_output_is_feasible_and_distinct() {
    let (problem, solutions) = fixture();

    for solution in &solutions {
        let mut solution = solution.clone();
        assert!(feasibility::is_feasible(&problem, &mut solution));
    }
    for (a, first) in solutions.iter().enumerate() {
        for second in solutions.iter().skip(a + 1) {
            assert_ne!(first, second);
        }
    }
}

#[test]
fn generator_is_deterministic_for_a_seed() {
    let problem = testutil::random_problem(4, 4, 10, 7, 11);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
    let first = generate_many_feasible(&problem, 4, 2000, &mut rng);
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(9);
    let second = generate_many_feasible(&problem, 4, 2000, &mut rng);

    assert_eq!(first.attempts, second.attempts);
    assert_eq!(first.solutions, second.solutions);
}

#[test]
fn build_vehicle_route_lays_out_unique_addresses() {
    let problem = testutil::two_stop_problem();
    let mut solution = Solution::new(&problem);
    solution.set_assignment(0, Some(vehicle(0)));
    solution.set_assignment(1, Some(vehicle(0)));

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(5);
    build_vehicle_route(&problem, &mut solution, vehicle(0), &mut rng);

    let mut visited = solution.visited(vehicle(0)).to_vec();
    visited.sort_unstable();
    assert_eq!(visited, vec![1, 2]);

    let row = solution.route(vehicle(0));
    assert_eq!(row[0], 0);
    assert!(row[3..].iter().all(|&v| v == 0));
}

#[test]
fn every_mutation_reverses_exactly() {
    let (problem, solutions) = fixture();

    for seed in 0..40u64 {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let base = &solutions[seed as usize % solutions.len()];

        for mut mutation in catalog(base) {
            if !mutation.is_possible(&problem, base) {
                continue;
            }
            let mut solution = base.clone();
            mutation.apply(&problem, &mut solution, &mut rng);
            assert_ne!(
                solution,
                *base,
                "{} left the solution untouched",
                mutation.kind().name()
            );
            mutation.reverse(&mut solution);
            assert_eq!(
                solution,
                *base,
                "{} did not restore the solution",
                mutation.kind().name()
            );
        }
    }
}

#[test]
fn mutation_attempt_keeps_feasibility_or_leaves_untouched() {
    let (problem, solutions) = fixture();
    let probabilities = MutationProbabilities::default();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(21);
    let mut stats = MutationStats::default();

    for round in 0..100 {
        let base = &solutions[round % solutions.len()];
        let mut solution = base.clone();

        let changed = mutate(&problem, &mut solution, &probabilities, &mut stats, &mut rng);
        assert!(feasibility::is_feasible(&problem, &mut solution));
        if changed {
            assert_ne!(solution, *base);
        } else {
            assert_eq!(solution, *base);
        }
    }

    assert!(stats.total_accepted() <= stats.total_attempts());
}

#[test]
fn crossover_offspring_pass_the_checker() {
    let (problem, solutions) = fixture();
    if solutions.len() < 2 {
        return;
    }

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
    let mut produced = 0;

    for round in 0..20 {
        let first = &solutions[round % solutions.len()];
        let second = &solutions[(round + 1) % solutions.len()];

        for mut child in crossover(&problem, first, second, &mut rng) {
            produced += 1;
            assert!(feasibility::is_feasible(&problem, &mut child));

            // Staffing respects permissions and work limits.
            for j in 0..problem.n_vehicles() {
                let v = vehicle(j);
                if let Some(courier) = child.courier_of(v) {
                    assert!(problem.has_permission(courier, v));
                    assert!(
                        child.route_time(&problem, v)
                            <= problem.courier(courier).work_limit + EPSILON
                    );
                }
            }
        }
    }

    assert!(produced > 0, "no crossover produced offspring");
}

#[test]
fn crossover_offspring_keep_one_parent_body() {
    let (problem, solutions) = fixture();
    if solutions.len() < 2 {
        return;
    }

    let same_body = |child: &Solution, parent: &Solution| {
        child.assignments() == parent.assignments()
            && (0..problem.n_vehicles())
                .all(|j| child.route(vehicle(j)) == parent.route(vehicle(j)))
    };

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(29);
    for round in 0..20 {
        let first = &solutions[round % solutions.len()];
        let second = &solutions[(round + 1) % solutions.len()];

        for child in crossover(&problem, first, second, &mut rng) {
            assert!(same_body(&child, first) || same_body(&child, second));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Applying then reversing any catalog entry restores the solution
    /// exactly, whatever the RNG does.
    #[test]
    fn mutations_are_reversible_for_any_seed(seed in 0u64..10_000) {
        let (problem, solutions) = fixture();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let base = &solutions[seed as usize % solutions.len()];

        for mut mutation in catalog(base) {
            if !mutation.is_possible(&problem, base) {
                continue;
            }
            let mut solution = base.clone();
            mutation.apply(&problem, &mut solution, &mut rng);
            mutation.reverse(&mut solution);
            prop_assert_eq!(&solution, base);
        }
    }

    /// A whole mutation attempt never hands back an infeasible solution.
    #[test]
    fn mutation_attempts_never_break_feasibility(seed in 0u64..10_000) {
        let (problem, solutions) = fixture();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut solution = solutions[seed as usize % solutions.len()].clone();
        let mut stats = MutationStats::default();

        mutate(
            &problem,
            &mut solution,
            &MutationProbabilities::default(),
            &mut stats,
            &mut rng,
        );
        prop_assert!(feasibility::is_feasible(&problem, &mut solution));
    }
}
