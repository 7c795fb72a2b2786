//! Shared fixtures for the test modules: hand-built and randomized problem
//! instances small enough to exercise every component quickly.

use crate::problem::{
    Courier, Graph, GraphEdge, Package, PackageKind, Point, Problem, Vehicle,
};
use crate::types::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// One courier, one vehicle, one delivery at node 1, warehouse at node 0,
/// 60 minutes and 1 distance unit each way.
pub(crate) fn single_package_problem() -> Problem {
    single_package_problem_with(7.0, 240.0, 20.0, 3.0, 10.0, 0.0, 120.0)
}

pub(crate) fn single_package_problem_with(
    rate: Money,
    work_limit: Time,
    capacity: Weight,
    fuel: f64,
    weight: Weight,
    start_time: Time,
    end_time: Time,
) -> Problem {
    Problem::new(
        vec![Courier {
            hourly_rate: rate,
            work_limit,
        }],
        vec![Vehicle {
            capacity,
            fuel_consumption: fuel,
        }],
        vec![Package {
            address: 1,
            weight,
            start_time,
            end_time,
            kind: PackageKind::Delivery,
        }],
        &[(0, 0)],
        Graph {
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 0.0 }],
            routes: vec![GraphEdge {
                start_node: 0,
                end_node: 1,
                distance: 1.0,
                time: 60.0,
            }],
            warehouse: 0,
        },
    )
    .unwrap()
}

/// Like [`single_package_problem`] but the package is a pickup.
pub(crate) fn single_pickup_problem(weight: Weight, capacity: Weight) -> Problem {
    Problem::new(
        vec![Courier {
            hourly_rate: 7.0,
            work_limit: 240.0,
        }],
        vec![Vehicle {
            capacity,
            fuel_consumption: 3.0,
        }],
        vec![Package {
            address: 1,
            weight,
            start_time: 0.0,
            end_time: 120.0,
            kind: PackageKind::Pickup,
        }],
        &[(0, 0)],
        Graph {
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 0.0 }],
            routes: vec![GraphEdge {
                start_node: 0,
                end_node: 1,
                distance: 1.0,
                time: 60.0,
            }],
            warehouse: 0,
        },
    )
    .unwrap()
}

/// One courier, one vehicle, one delivery, and an empty permission list.
pub(crate) fn no_permission_problem() -> Problem {
    Problem::new(
        vec![Courier {
            hourly_rate: 7.0,
            work_limit: 240.0,
        }],
        vec![Vehicle {
            capacity: 20.0,
            fuel_consumption: 3.0,
        }],
        vec![Package {
            address: 1,
            weight: 10.0,
            start_time: 0.0,
            end_time: 120.0,
            kind: PackageKind::Delivery,
        }],
        &[],
        Graph {
            points: vec![Point { x: 0.0, y: 0.0 }, Point { x: 1.0, y: 0.0 }],
            routes: vec![GraphEdge {
                start_node: 0,
                end_node: 1,
                distance: 1.0,
                time: 60.0,
            }],
            warehouse: 0,
        },
    )
    .unwrap()
}

/// Three nodes, two couriers, two vehicles with full permissions, and one
/// delivery on each non-warehouse node.
pub(crate) fn two_stop_problem() -> Problem {
    Problem::new(
        vec![
            Courier {
                hourly_rate: 5.0,
                work_limit: 240.0,
            },
            Courier {
                hourly_rate: 9.0,
                work_limit: 240.0,
            },
        ],
        vec![
            Vehicle {
                capacity: 20.0,
                fuel_consumption: 2.0,
            },
            Vehicle {
                capacity: 20.0,
                fuel_consumption: 4.0,
            },
        ],
        vec![
            Package {
                address: 1,
                weight: 3.0,
                start_time: 0.0,
                end_time: 240.0,
                kind: PackageKind::Delivery,
            },
            Package {
                address: 2,
                weight: 4.0,
                start_time: 0.0,
                end_time: 240.0,
                kind: PackageKind::Delivery,
            },
        ],
        &[(0, 0), (0, 1), (1, 0), (1, 1)],
        Graph {
            points: vec![
                Point { x: 0.0, y: 0.0 },
                Point { x: 1.0, y: 0.0 },
                Point { x: 2.0, y: 0.0 },
            ],
            routes: vec![
                GraphEdge {
                    start_node: 0,
                    end_node: 1,
                    distance: 1.0,
                    time: 30.0,
                },
                GraphEdge {
                    start_node: 0,
                    end_node: 2,
                    distance: 2.0,
                    time: 40.0,
                },
                GraphEdge {
                    start_node: 1,
                    end_node: 2,
                    distance: 1.0,
                    time: 10.0,
                },
            ],
            warehouse: 0,
        },
    )
    .unwrap()
}

/// Complete graph over `n_nodes` random points; travel time loosely tracks
/// distance.
fn random_graph<R: Rng>(n_nodes: usize, rng: &mut R) -> Graph {
    let points: Vec<Point> = (0..n_nodes)
        .map(|_| Point {
            x: rng.random_range(0.0..30.0),
            y: rng.random_range(0.0..30.0),
        })
        .collect();

    let mut routes = Vec::new();
    for i in 0..n_nodes {
        for j in (i + 1)..n_nodes {
            let dx = points[i].x - points[j].x;
            let dy = points[i].y - points[j].y;
            let distance = (dx * dx + dy * dy).sqrt();
            routes.push(GraphEdge {
                start_node: i as NodeId,
                end_node: j as NodeId,
                distance,
                time: distance * rng.random_range(0.5..1.0),
            });
        }
    }

    Graph {
        points,
        routes,
        warehouse: 0,
    }
}

/// Randomized instance: generous capacities and windows, full permissions,
/// warehouse at node 0.
pub(crate) fn random_problem(
    n_couriers: usize,
    n_vehicles: usize,
    n_packages: usize,
    n_nodes: usize,
    seed: u64,
) -> Problem {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let couriers: Vec<Courier> = (0..n_couriers)
        .map(|_| Courier {
            hourly_rate: rng.random_range(1.0..100.0),
            work_limit: rng.random_range(4..9) as f64 * 60.0,
        })
        .collect();

    let vehicles: Vec<Vehicle> = (0..n_vehicles)
        .map(|_| Vehicle {
            capacity: rng.random_range(50.0..100.0),
            fuel_consumption: rng.random_range(0.0..20.0),
        })
        .collect();

    let graph = random_graph(n_nodes, &mut rng);

    let packages: Vec<Package> = (0..n_packages)
        .map(|_| Package {
            address: rng.random_range(1..n_nodes) as NodeId,
            weight: rng.random_range(0.0..10.0),
            start_time: 0.0,
            end_time: rng.random_range(5..8) as f64 * 60.0,
            kind: if rng.random_bool(0.5) {
                PackageKind::Pickup
            } else {
                PackageKind::Delivery
            },
        })
        .collect();

    let permissions: Vec<(usize, usize)> = (0..n_couriers)
        .flat_map(|i| (0..n_vehicles).map(move |j| (i, j)))
        .collect();

    Problem::new(couriers, vehicles, packages, &permissions, graph).unwrap()
}
