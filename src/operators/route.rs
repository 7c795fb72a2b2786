use crate::operators::mutation::{Mutation, MutationKind};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::types::*;

use rand::{Rng, RngCore};

/// Swaps two stops on one vehicle's route. One instance is scheduled per
/// used vehicle on every mutation attempt.
pub struct RouteReorder {
    vehicle: VehicleId,
    swapped: Option<(usize, usize)>,
}

impl RouteReorder {
    pub fn new(vehicle: VehicleId) -> Self {
        RouteReorder {
            vehicle,
            swapped: None,
        }
    }
}

impl Mutation for RouteReorder {
    fn kind(&self) -> MutationKind {
        MutationKind::RouteReorder
    }

    fn is_possible(&self, _problem: &Problem, solution: &Solution) -> bool {
        solution.visited_len(self.vehicle) > 1
    }

    fn apply(&mut self, _problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore) {
        let len = solution.visited_len(self.vehicle);

        let a = rng.random_range(1..len + 1);
        let mut b = rng.random_range(1..len + 1);
        while a == b {
            b = rng.random_range(1..len + 1);
        }

        solution.route_mut(self.vehicle).swap(a, b);
        self.swapped = Some((a, b));
    }

    fn reverse(&self, solution: &mut Solution) {
        let (a, b) = self.swapped.unwrap();
        solution.route_mut(self.vehicle).swap(a, b);
    }
}
