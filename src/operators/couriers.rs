use crate::operators::mutation::{Mutation, MutationKind};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::types::*;

use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

/// Swaps the vehicle assignments of two couriers. The second courier may be
/// off duty, in which case the first simply hands over their vehicle.
pub struct CourierSwap {
    first: Option<(CourierId, VehicleId)>,
    second: Option<(CourierId, Option<VehicleId>)>,
}

impl CourierSwap {
    pub fn new() -> Self {
        CourierSwap {
            first: None,
            second: None,
        }
    }
}

impl Default for CourierSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutation for CourierSwap {
    fn kind(&self) -> MutationKind {
        MutationKind::CourierSwap
    }

    fn is_possible(&self, problem: &Problem, solution: &Solution) -> bool {
        problem.n_couriers() >= 2 && solution.couriers().iter().any(Option::is_some)
    }

    fn apply(&mut self, problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore) {
        let assigned: Vec<CourierId> = solution.couriers().iter().flatten().copied().collect();
        let first = *assigned.choose(rng).unwrap();

        let mut second = CourierId::from_index(rng.random_range(0..problem.n_couriers())).unwrap();
        while second == first {
            second = CourierId::from_index(rng.random_range(0..problem.n_couriers())).unwrap();
        }

        let first_vehicle = solution.vehicle_of(first).unwrap();
        let second_vehicle = solution.vehicle_of(second);

        solution.set_courier(first_vehicle, Some(second));
        if let Some(vehicle) = second_vehicle {
            solution.set_courier(vehicle, Some(first));
        }

        self.first = Some((first, first_vehicle));
        self.second = Some((second, second_vehicle));
    }

    fn reverse(&self, solution: &mut Solution) {
        let (first, first_vehicle) = self.first.unwrap();
        let (second, second_vehicle) = self.second.unwrap();

        solution.set_courier(first_vehicle, Some(first));
        if let Some(vehicle) = second_vehicle {
            solution.set_courier(vehicle, Some(second));
        }
    }
}
