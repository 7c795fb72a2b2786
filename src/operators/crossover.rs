use crate::problem::Problem;
use crate::solution::feasibility::{self, EPSILON};
use crate::solution::Solution;
use crate::types::*;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

/// Two-parent recombination. Each direction keeps one parent's routes and
/// package assignments verbatim and restaffs the vehicles with couriers
/// drawn from the other parent, so offspring mix one parent's routing with
/// the other's crew. Offspring that cannot be staffed or fail the
/// feasibility check are dropped; the result holds zero, one or two
/// children.
pub fn crossover<R: Rng>(
    problem: &Problem,
    first: &Solution,
    second: &Solution,
    rng: &mut R,
) -> Vec<Solution> {
    let mut offspring = Vec::with_capacity(2);
    for (body, other) in [(first, second), (second, first)] {
        if let Some(child) = derive_offspring(problem, body, other, rng) {
            offspring.push(child);
        }
    }
    offspring
}

fn derive_offspring<R: Rng>(
    problem: &Problem,
    body: &Solution,
    other: &Solution,
    rng: &mut R,
) -> Option<Solution> {
    let mut child = body.clone();
    for j in 0..problem.n_vehicles() {
        child.set_courier(VehicleId::from_index(j).unwrap(), None);
    }

    // The staffing pools: couriers the other parent put on the road, and
    // the rest.
    let on_duty: Vec<CourierId> = other.couriers().iter().flatten().copied().collect();
    let off_duty: Vec<CourierId> = (0..problem.n_couriers())
        .filter_map(CourierId::from_index)
        .filter(|i| !on_duty.contains(i))
        .collect();

    let mut placed = vec![false; problem.n_couriers()];
    let mut vehicles = child.used_vehicles();
    vehicles.shuffle(rng);

    for vehicle in vehicles {
        let duration = child.route_time(problem, vehicle);
        let acceptable = |placed: &[bool], courier: CourierId| {
            problem.has_permission(courier, vehicle)
                && !placed[courier.index()]
                && duration <= problem.courier(courier).work_limit + EPSILON
        };

        let mut chosen = None;
        for _ in 0..2 * on_duty.len() {
            let candidate = *on_duty.choose(rng).unwrap();
            if acceptable(&placed, candidate) {
                chosen = Some(candidate);
                break;
            }
        }
        if chosen.is_none() {
            for _ in 0..2 * off_duty.len() {
                let candidate = *off_duty.choose(rng).unwrap();
                if acceptable(&placed, candidate) {
                    chosen = Some(candidate);
                    break;
                }
            }
        }

        // A vehicle nobody can staff sinks the whole offspring.
        let courier = chosen?;
        placed[courier.index()] = true;
        child.set_courier(vehicle, Some(courier));
    }

    if feasibility::is_feasible(problem, &mut child) {
        Some(child)
    } else {
        None
    }
}
