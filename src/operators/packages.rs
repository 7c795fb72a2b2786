use crate::operators::mutation::{Mutation, MutationKind};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::types::*;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

struct Moved {
    package: PackageId,
    old_vehicle: VehicleId,
    new_vehicle: VehicleId,
    old_route: Vec<NodeId>,
    new_route: Vec<NodeId>,
}

/// Moves one package onto another used vehicle, splicing its address into
/// the target route if it is not already visited and compacting the old
/// route if the address falls off it.
pub struct PackageReassign {
    moved: Option<Moved>,
}

impl PackageReassign {
    pub fn new() -> Self {
        PackageReassign { moved: None }
    }
}

impl Default for PackageReassign {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutation for PackageReassign {
    fn kind(&self) -> MutationKind {
        MutationKind::PackageReassign
    }

    fn is_possible(&self, problem: &Problem, solution: &Solution) -> bool {
        problem.n_packages() >= 2 && solution.used_vehicles().len() >= 2
    }

    fn apply(&mut self, problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore) {
        let package = rng.random_range(0..problem.n_packages());
        let old_vehicle = solution.assignment(package).unwrap();

        let targets: Vec<VehicleId> = solution
            .used_vehicles()
            .into_iter()
            .filter(|&j| j != old_vehicle)
            .collect();
        let new_vehicle = *targets.choose(rng).unwrap();

        let address = problem.package(package).address;
        let old_route = solution.route(old_vehicle).to_vec();
        let new_route = solution.route(new_vehicle).to_vec();

        solution.set_assignment(package, Some(new_vehicle));

        if !solution.route_contains(new_vehicle, address) {
            // Splice the address into a random slot of the visited prefix
            // and shift the tail right, dropping one padding slot.
            let prefix_len = solution.visited_len(new_vehicle);
            let slot = rng.random_range(1..prefix_len + 1);
            let row = solution.route_mut(new_vehicle);
            for l in ((slot + 1)..row.len()).rev() {
                row[l] = row[l - 1];
            }
            row[slot] = address;
        }

        let still_served = solution
            .assignments()
            .iter()
            .enumerate()
            .any(|(k, &v)| v == Some(old_vehicle) && problem.package(k).address == address);
        if !still_served {
            // The old vehicle no longer stops there: left-shift the route
            // over the address until the padding is reached.
            let warehouse = solution.warehouse();
            let row = solution.route_mut(old_vehicle);
            let mut slot = row.iter().position(|&v| v == address).unwrap();
            while row[slot] != warehouse {
                row[slot] = row[slot + 1];
                slot += 1;
            }
        }

        self.moved = Some(Moved {
            package,
            old_vehicle,
            new_vehicle,
            old_route,
            new_route,
        });
    }

    fn reverse(&self, solution: &mut Solution) {
        let moved = self.moved.as_ref().unwrap();
        solution.set_assignment(moved.package, Some(moved.old_vehicle));
        solution
            .route_mut(moved.old_vehicle)
            .copy_from_slice(&moved.old_route);
        solution
            .route_mut(moved.new_vehicle)
            .copy_from_slice(&moved.new_route);
    }
}
