use crate::problem::{PackageKind, Problem};
use crate::solution::Solution;
use crate::types::*;
use std::fmt;

/// Tolerance for bound comparisons on times, loads and capacities.
pub const EPSILON: f64 = 1e-6;

/// Name of the first predicate a solution violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    CourierUniqueness,
    WorkLimit,
    Permission,
    PackageCoverage,
    TimeWindow,
    RouteStructure,
    Capacity,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Violation::CourierUniqueness => "courier uniqueness",
            Violation::WorkLimit => "work limit",
            Violation::Permission => "permission",
            Violation::PackageCoverage => "package coverage",
            Violation::TimeWindow => "time window",
            Violation::RouteStructure => "route structure",
            Violation::Capacity => "capacity",
        };
        f.write_str(name)
    }
}

/// Runs the predicate suite in a fixed order and stops at the first
/// failure. Never panics on malformed decision state; every predicate is
/// written against the padded route representation.
pub fn check(problem: &Problem, solution: &mut Solution) -> Result<(), Violation> {
    check_courier_uniqueness(problem, solution)?;
    check_work_limits(problem, solution)?;
    check_permissions(problem, solution)?;
    check_package_coverage(problem, solution)?;
    check_time_windows(problem, solution)?;
    check_route_structure(problem, solution)?;
    check_capacity(problem, solution)?;
    Ok(())
}

pub fn is_feasible(problem: &Problem, solution: &mut Solution) -> bool {
    check(problem, solution).is_ok()
}

/// No courier drives two vehicles.
fn check_courier_uniqueness(problem: &Problem, solution: &Solution) -> Result<(), Violation> {
    let mut seen = vec![false; problem.n_couriers()];
    for courier in solution.couriers().iter().flatten() {
        if seen[courier.index()] {
            return Err(Violation::CourierUniqueness);
        }
        seen[courier.index()] = true;
    }
    Ok(())
}

/// Every courier stays within their work limit.
fn check_work_limits(problem: &Problem, solution: &mut Solution) -> Result<(), Violation> {
    for i in 0..problem.n_couriers() {
        let courier = CourierId::from_index(i).unwrap();
        let worked = solution.total_work_time(problem, courier);
        if worked > problem.courier(courier).work_limit + EPSILON {
            return Err(Violation::WorkLimit);
        }
    }
    Ok(())
}

/// Every assigned courier is permitted to drive their vehicle.
fn check_permissions(problem: &Problem, solution: &Solution) -> Result<(), Violation> {
    for (j, courier) in solution.couriers().iter().enumerate() {
        if let Some(courier) = courier {
            let vehicle = VehicleId::from_index(j).unwrap();
            if !problem.has_permission(*courier, vehicle) {
                return Err(Violation::Permission);
            }
        }
    }
    Ok(())
}

/// Every package's address lies on its vehicle's route.
fn check_package_coverage(problem: &Problem, solution: &Solution) -> Result<(), Violation> {
    for (k, package) in problem.packages().iter().enumerate() {
        match solution.assignment(k) {
            Some(vehicle) if solution.route_contains(vehicle, package.address) => {}
            _ => return Err(Violation::PackageCoverage),
        }
    }
    Ok(())
}

/// Every package is serviced inside its time window.
fn check_time_windows(problem: &Problem, solution: &mut Solution) -> Result<(), Violation> {
    for (k, package) in problem.packages().iter().enumerate() {
        let serviced = solution.service_time(problem, k);
        if serviced < package.start_time - EPSILON || serviced > package.end_time + EPSILON {
            return Err(Violation::TimeWindow);
        }
    }
    Ok(())
}

/// Warehouse at position 0, visited nodes form a duplicate-free
/// contiguous prefix, everything after the first padding slot is padding.
fn check_route_structure(problem: &Problem, solution: &Solution) -> Result<(), Violation> {
    let warehouse = problem.warehouse();
    for j in 0..problem.n_vehicles() {
        let vehicle = VehicleId::from_index(j).unwrap();
        let row = solution.route(vehicle);
        if row[0] != warehouse {
            return Err(Violation::RouteStructure);
        }
        let mut seen = vec![false; problem.n_nodes()];
        let mut padding = false;
        for &node in &row[1..] {
            if node == warehouse {
                padding = true;
                continue;
            }
            if padding || (node as usize) >= problem.n_nodes() {
                return Err(Violation::RouteStructure);
            }
            if seen[node as usize] {
                return Err(Violation::RouteStructure);
            }
            seen[node as usize] = true;
        }
    }
    Ok(())
}

/// The load stays within `[0, capacity]` along every route prefix,
/// starting from the delivery weight loaded at the warehouse.
fn check_capacity(problem: &Problem, solution: &Solution) -> Result<(), Violation> {
    for j in 0..problem.n_vehicles() {
        let vehicle = VehicleId::from_index(j).unwrap();
        let capacity = problem.vehicle(vehicle).capacity;

        let mut load = 0.0;
        for (k, package) in problem.packages().iter().enumerate() {
            if package.kind == PackageKind::Delivery && solution.assignment(k) == Some(vehicle) {
                load += package.weight;
            }
        }
        if load > capacity + EPSILON {
            return Err(Violation::Capacity);
        }

        for &node in solution.visited(vehicle) {
            for &k in problem.packages_at(node) {
                if solution.assignment(k) == Some(vehicle) {
                    let package = problem.package(k);
                    match package.kind {
                        PackageKind::Delivery => load -= package.weight,
                        PackageKind::Pickup => load += package.weight,
                    }
                }
            }
            if load < -EPSILON || load > capacity + EPSILON {
                return Err(Violation::Capacity);
            }
        }
    }
    Ok(())
}
