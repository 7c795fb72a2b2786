use crate::operators::couriers::CourierSwap;
use crate::operators::packages::PackageReassign;
use crate::operators::route::RouteReorder;
use crate::operators::vehicles::{UnusedVehicleSwap, UsedVehicleSwap};
use crate::problem::Problem;
use crate::solution::feasibility;
use crate::solution::Solution;

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    CourierSwap,
    PackageReassign,
    UsedVehicleSwap,
    UnusedVehicleSwap,
    RouteReorder,
}

impl MutationKind {
    pub const ALL: [MutationKind; 5] = [
        MutationKind::CourierSwap,
        MutationKind::PackageReassign,
        MutationKind::UsedVehicleSwap,
        MutationKind::UnusedVehicleSwap,
        MutationKind::RouteReorder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MutationKind::CourierSwap => "courier swap",
            MutationKind::PackageReassign => "package reassignment",
            MutationKind::UsedVehicleSwap => "used-vehicle swap",
            MutationKind::UnusedVehicleSwap => "unused-vehicle swap",
            MutationKind::RouteReorder => "route reordering",
        }
    }

    #[inline(always)]
    fn index(self) -> usize {
        match self {
            MutationKind::CourierSwap => 0,
            MutationKind::PackageReassign => 1,
            MutationKind::UsedVehicleSwap => 2,
            MutationKind::UnusedVehicleSwap => 3,
            MutationKind::RouteReorder => 4,
        }
    }
}

/// Per-kind scheduling gates: the chance that a catalog entry is tried at
/// all on a given attempt.
#[derive(Clone, Copy, Debug)]
pub struct MutationProbabilities {
    pub courier_swap: f64,
    pub package_reassign: f64,
    pub used_vehicle_swap: f64,
    pub unused_vehicle_swap: f64,
    pub route_reorder: f64,
}

impl Default for MutationProbabilities {
    fn default() -> Self {
        MutationProbabilities {
            courier_swap: 0.5,
            package_reassign: 0.5,
            used_vehicle_swap: 0.5,
            unused_vehicle_swap: 0.5,
            route_reorder: 0.5,
        }
    }
}

impl MutationProbabilities {
    pub fn for_kind(&self, kind: MutationKind) -> f64 {
        match kind {
            MutationKind::CourierSwap => self.courier_swap,
            MutationKind::PackageReassign => self.package_reassign,
            MutationKind::UsedVehicleSwap => self.used_vehicle_swap,
            MutationKind::UnusedVehicleSwap => self.unused_vehicle_swap,
            MutationKind::RouteReorder => self.route_reorder,
        }
    }
}

/// Per-kind attempt and acceptance counters for one run.
#[derive(Debug, Default, Clone)]
pub struct MutationStats {
    attempts: [usize; 5],
    accepted: [usize; 5],
}

impl MutationStats {
    pub fn record_attempt(&mut self, kind: MutationKind) {
        self.attempts[kind.index()] += 1;
    }

    pub fn record_accepted(&mut self, kind: MutationKind) {
        self.accepted[kind.index()] += 1;
    }

    pub fn attempts(&self, kind: MutationKind) -> usize {
        self.attempts[kind.index()]
    }

    pub fn accepted(&self, kind: MutationKind) -> usize {
        self.accepted[kind.index()]
    }

    pub fn total_attempts(&self) -> usize {
        self.attempts.iter().sum()
    }

    pub fn total_accepted(&self) -> usize {
        self.accepted.iter().sum()
    }
}

/// One in-place, reversible local edit. `apply` stashes whatever it needs
/// to undo itself; callers that find the edited solution infeasible must
/// call `reverse` exactly once, restoring the pre-apply state.
pub trait Mutation {
    fn kind(&self) -> MutationKind;

    /// Cheap structural pre-check; `apply` may assume it returned true.
    fn is_possible(&self, problem: &Problem, solution: &Solution) -> bool;

    fn apply(&mut self, problem: &Problem, solution: &mut Solution, rng: &mut dyn RngCore);

    fn reverse(&self, solution: &mut Solution);
}

/// One mutation attempt: instantiate the catalog (one of each kind plus a
/// route reordering per used vehicle), shuffle it, and apply the first
/// entry that passes its gate and leaves the solution feasible. Rejected
/// edits are rolled back; if nothing sticks the solution is unchanged.
///
/// Returns whether a mutation was kept.
pub fn mutate<R: Rng>(
    problem: &Problem,
    solution: &mut Solution,
    probabilities: &MutationProbabilities,
    stats: &mut MutationStats,
    rng: &mut R,
) -> bool {
    let mut used = solution.used_vehicles();
    used.shuffle(rng);

    let mut catalog: Vec<Box<dyn Mutation>> = vec![
        Box::new(CourierSwap::new()),
        Box::new(PackageReassign::new()),
        Box::new(UsedVehicleSwap::new()),
        Box::new(UnusedVehicleSwap::new()),
    ];
    for vehicle in used {
        catalog.push(Box::new(RouteReorder::new(vehicle)));
    }
    catalog.shuffle(rng);

    for mut mutation in catalog {
        if !rng.random_bool(probabilities.for_kind(mutation.kind())) {
            continue;
        }
        if !mutation.is_possible(problem, solution) {
            continue;
        }

        mutation.apply(problem, solution, &mut *rng);
        stats.record_attempt(mutation.kind());

        if feasibility::is_feasible(problem, solution) {
            stats.record_accepted(mutation.kind());
            solution.normalize();
            return true;
        }
        mutation.reverse(solution);
    }

    false
}
