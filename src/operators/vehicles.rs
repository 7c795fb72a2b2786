use crate::operators::mutation::{Mutation, MutationKind};
use crate::problem::Problem;
use crate::solution::Solution;
use crate::types::*;

use rand::seq::IndexedRandom;
use rand::RngCore;

/// Exchanges the routes and package loads of two used vehicles. Couriers
/// stay on their vehicles. The swap is its own inverse.
pub struct UsedVehicleSwap {
    pair: Option<(VehicleId, VehicleId)>,
}

impl UsedVehicleSwap {
    pub fn new() -> Self {
        UsedVehicleSwap { pair: None }
    }

    fn exchange(solution: &mut Solution, a: VehicleId, b: VehicleId) {
        solution.swap_routes(a, b);
        for k in 0..solution.assignments().len() {
            match solution.assignment(k) {
                Some(v) if v == a => solution.set_assignment(k, Some(b)),
                Some(v) if v == b => solution.set_assignment(k, Some(a)),
                _ => {}
            }
        }
    }
}

impl Default for UsedVehicleSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutation for UsedVehicleSwap {
    fn kind(&self) -> MutationKind {
        MutationKind::UsedVehicleSwap
    }

    fn is_possible(&self, _problem: &Problem, solution: &Solution) -> bool {
        solution.used_vehicles().len() >= 2
    }

    fn apply(&mut self, _problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore) {
        let used = solution.used_vehicles();
        let a = *used.choose(rng).unwrap();
        let mut b = *used.choose(rng).unwrap();
        while a == b {
            b = *used.choose(rng).unwrap();
        }

        Self::exchange(solution, a, b);
        self.pair = Some((a, b));
    }

    fn reverse(&self, solution: &mut Solution) {
        let (a, b) = self.pair.unwrap();
        Self::exchange(solution, a, b);
    }
}

/// Migrates a used vehicle's courier, packages and route onto a vehicle
/// that currently carries nothing.
pub struct UnusedVehicleSwap {
    moved: Option<(VehicleId, VehicleId, Option<CourierId>)>,
}

impl UnusedVehicleSwap {
    pub fn new() -> Self {
        UnusedVehicleSwap { moved: None }
    }

    fn migrate(solution: &mut Solution, from: VehicleId, to: VehicleId) {
        solution.set_courier(to, solution.courier_of(from));
        solution.set_courier(from, None);

        for k in 0..solution.assignments().len() {
            if solution.assignment(k) == Some(from) {
                solution.set_assignment(k, Some(to));
            }
        }

        let route = solution.route(from).to_vec();
        solution.route_mut(to).copy_from_slice(&route);
        solution.clear_route(from);
    }
}

impl Default for UnusedVehicleSwap {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutation for UnusedVehicleSwap {
    fn kind(&self) -> MutationKind {
        MutationKind::UnusedVehicleSwap
    }

    fn is_possible(&self, problem: &Problem, solution: &Solution) -> bool {
        let used = solution.used_vehicles().len();
        used >= 1 && used < problem.n_vehicles()
    }

    fn apply(&mut self, problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore) {
        let used = solution.used_vehicles();
        let unused = solution.unused_vehicles(problem);

        let from = *used.choose(rng).unwrap();
        let to = *unused.choose(rng).unwrap();

        let stale_courier = solution.courier_of(to);
        Self::migrate(solution, from, to);
        self.moved = Some((from, to, stale_courier));
    }

    fn reverse(&self, solution: &mut Solution) {
        let (from, to, stale_courier) = self.moved.unwrap();
        Self::migrate(solution, to, from);
        solution.set_courier(to, stale_courier);
    }
}
