use crate::problem::Problem;
use crate::solution::feasibility;
use crate::solution::Solution;
use crate::types::*;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

/// Result of an initial-population run: the distinct feasible solutions
/// found (in discovery order) and how many attempts were consumed.
pub struct GeneratedPopulation {
    pub solutions: Vec<Solution>,
    pub attempts: usize,
}

impl GeneratedPopulation {
    /// True if the run stopped on the attempt budget short of its target.
    pub fn exhausted(&self, target: usize) -> bool {
        self.solutions.len() < target
    }
}

/// Writes a vehicle's route as a warehouse-padded random permutation of
/// the unique addresses of its assigned packages.
pub fn build_vehicle_route<R: Rng>(
    problem: &Problem,
    solution: &mut Solution,
    vehicle: VehicleId,
    rng: &mut R,
) {
    let mut addresses: Vec<NodeId> = Vec::new();
    for (k, assigned) in solution.assignments().iter().enumerate() {
        if *assigned == Some(vehicle) {
            let address = problem.package(k).address;
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }
    }
    addresses.shuffle(rng);

    let warehouse = problem.warehouse();
    let row = solution.route_mut(vehicle);
    row.fill(warehouse);
    row[1..1 + addresses.len()].copy_from_slice(&addresses);
}

/// Builds one candidate: spread packages over vehicles, staff each newly
/// used vehicle, then lay out its route. The candidate may well be
/// infeasible; the caller runs the checker.
fn generate_candidate<R: Rng>(problem: &Problem, rng: &mut R) -> Solution {
    let mut solution = Solution::new(problem);
    let mut used: Vec<VehicleId> = Vec::new();

    for k in 0..problem.n_packages() {
        // Once every courier is on the road no further vehicle can be
        // staffed, so stick to the vehicles already in use.
        let vehicle = if used.len() == problem.n_couriers() && !used.is_empty() {
            *used.choose(rng).unwrap()
        } else {
            VehicleId::from_index(rng.random_range(0..problem.n_vehicles())).unwrap()
        };

        if !used.contains(&vehicle) {
            assign_courier(problem, &mut solution, vehicle, rng);
            used.push(vehicle);
        }
        solution.set_assignment(k, Some(vehicle));
    }

    for &vehicle in &used {
        build_vehicle_route(problem, &mut solution, vehicle, rng);
    }

    solution
}

/// Staffs a vehicle by rejection sampling: draw couriers uniformly until
/// one is permitted and idle. After `2n` failed draws the last draw is
/// assigned anyway, leaving a candidate the checker will reject.
fn assign_courier<R: Rng>(
    problem: &Problem,
    solution: &mut Solution,
    vehicle: VehicleId,
    rng: &mut R,
) {
    let n = problem.n_couriers();
    let max_tries = 2 * n;

    let mut courier = CourierId::from_index(rng.random_range(0..n)).unwrap();
    let mut tries = 0;
    while !problem.has_permission(courier, vehicle)
        || solution.couriers().contains(&Some(courier))
    {
        courier = CourierId::from_index(rng.random_range(0..n)).unwrap();
        tries += 1;
        if tries == max_tries {
            break;
        }
    }

    solution.set_courier(vehicle, Some(courier));
}

/// Randomized feasible-solution factory: keeps constructing candidates
/// until `target` distinct feasible solutions are found or the attempt
/// budget runs out. Returns whatever it has either way.
pub fn generate_many_feasible<R: Rng>(
    problem: &Problem,
    target: usize,
    max_attempts: usize,
    rng: &mut R,
) -> GeneratedPopulation {
    // Packages with nobody to move them can never yield a feasible state.
    if problem.n_packages() > 0 && (problem.n_vehicles() == 0 || problem.n_couriers() == 0) {
        return GeneratedPopulation {
            solutions: Vec::new(),
            attempts: 0,
        };
    }

    let mut seen: HashSet<Solution> = HashSet::new();
    let mut found: Vec<Solution> = Vec::new();
    let mut attempts = 0;

    while found.len() < target && attempts < max_attempts {
        attempts += 1;

        let mut candidate = generate_candidate(problem, rng);
        if feasibility::is_feasible(problem, &mut candidate) && seen.insert(candidate.clone()) {
            found.push(candidate);
        }
    }

    GeneratedPopulation {
        solutions: found,
        attempts,
    }
}
