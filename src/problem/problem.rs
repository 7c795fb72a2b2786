use crate::problem::index::ProblemIndex;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courier {
    /// Wage in currency units per minute of work.
    pub hourly_rate: Money,
    /// Maximum accumulated travel time in minutes.
    pub work_limit: Time,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Maximum carried weight.
    pub capacity: Weight,
    /// Fuel burned per distance unit.
    pub fuel_consumption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// 0-indexed node where the package is handled. Never the warehouse.
    pub address: NodeId,
    pub weight: Weight,
    /// Service window lower bound (minutes).
    pub start_time: Time,
    /// Service window upper bound (minutes).
    pub end_time: Time,
    #[serde(rename = "type")]
    pub kind: PackageKind,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub distance: Distance,
    pub time: Time,
}

/// Road network as listed in the problem file. Edges are undirected;
/// self-loops are implied zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub points: Vec<Point>,
    pub routes: Vec<GraphEdge>,
    pub warehouse: NodeId,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Permission {
    pub courier: usize,
    pub vehicle: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProblemFile {
    couriers: Vec<Courier>,
    vehicles: Vec<Vehicle>,
    packages: Vec<Package>,
    permissions: Vec<Permission>,
    graph: Graph,
}

#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Validation(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "io error: {}", e),
            LoadError::Parse(e) => write!(f, "malformed problem file: {}", e),
            LoadError::Validation(msg) => write!(f, "invalid problem: {}", msg),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Parse(e)
    }
}

/// Dense rectangular table of f64 weights. Backs the symmetric travel
/// matrices here and the per-solution schedule tables.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    data: Vec<f64>,
    cols: usize,
}

impl Grid {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        Grid {
            data: vec![0.0; rows * cols],
            cols,
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Zeroes every cell.
    pub(crate) fn reset(&mut self) {
        self.data.fill(0.0);
    }
}

/// The main problem data structure. Built once, never mutated; solutions
/// hold a shared reference to it.
pub struct Problem {
    couriers: Vec<Courier>,
    vehicles: Vec<Vehicle>,
    packages: Vec<Package>,
    /// Permission table, row-major by courier.
    permitted: Vec<bool>,
    /// Symmetric travel times in minutes, zero diagonal.
    travel_time: Grid,
    /// Symmetric travel distances, zero diagonal.
    distance: Grid,
    points: Vec<Point>,
    edges: Vec<GraphEdge>,
    warehouse: NodeId,
    n_nodes: usize,
    /// Precomputed data structures.
    pub(crate) index: ProblemIndex,
}

impl Problem {
    pub fn new(
        couriers: Vec<Courier>,
        vehicles: Vec<Vehicle>,
        packages: Vec<Package>,
        permissions: &[(usize, usize)],
        graph: Graph,
    ) -> Result<Self, LoadError> {
        let max_endpoint = graph
            .routes
            .iter()
            .map(|e| e.start_node.max(e.end_node) as usize + 1)
            .max()
            .unwrap_or(0);
        let n_nodes = graph
            .points
            .len()
            .max(max_endpoint)
            .max(graph.warehouse as usize + 1);

        for (i, c) in couriers.iter().enumerate() {
            if !(c.hourly_rate >= 0.0) || !(c.work_limit >= 0.0) {
                return Err(LoadError::Validation(format!(
                    "courier {} has a negative or non-finite rate/work limit",
                    i
                )));
            }
        }
        for (j, v) in vehicles.iter().enumerate() {
            if !(v.capacity >= 0.0) || !(v.fuel_consumption >= 0.0) {
                return Err(LoadError::Validation(format!(
                    "vehicle {} has a negative or non-finite capacity/fuel rate",
                    j
                )));
            }
        }
        for (k, p) in packages.iter().enumerate() {
            if (p.address as usize) >= n_nodes {
                return Err(LoadError::Validation(format!(
                    "package {} addresses unknown node {}",
                    k, p.address
                )));
            }
            if p.address == graph.warehouse {
                return Err(LoadError::Validation(format!(
                    "package {} is addressed to the warehouse",
                    k
                )));
            }
            if !(p.weight >= 0.0) {
                return Err(LoadError::Validation(format!(
                    "package {} has a negative or non-finite weight",
                    k
                )));
            }
            if !(p.start_time <= p.end_time) {
                return Err(LoadError::Validation(format!(
                    "package {} has an inverted time window [{}, {}]",
                    k, p.start_time, p.end_time
                )));
            }
        }

        let mut permitted = vec![false; couriers.len() * vehicles.len()];
        for &(i, j) in permissions {
            if i >= couriers.len() || j >= vehicles.len() {
                return Err(LoadError::Validation(format!(
                    "permission ({}, {}) is out of range",
                    i, j
                )));
            }
            permitted[i * vehicles.len() + j] = true;
        }

        // Symmetrize the edge list into dense matrices with a zero diagonal.
        let mut travel_time = Grid::new(n_nodes, n_nodes);
        let mut distance = Grid::new(n_nodes, n_nodes);
        for e in &graph.routes {
            if !(e.distance >= 0.0) || !(e.time >= 0.0) {
                return Err(LoadError::Validation(format!(
                    "edge ({}, {}) has a negative or non-finite weight",
                    e.start_node, e.end_node
                )));
            }
            let (u, v) = (e.start_node as usize, e.end_node as usize);
            travel_time.set(u, v, e.time);
            travel_time.set(v, u, e.time);
            distance.set(u, v, e.distance);
            distance.set(v, u, e.distance);
        }

        let mut problem = Problem {
            couriers,
            vehicles,
            packages,
            permitted,
            travel_time,
            distance,
            points: graph.points,
            edges: graph.routes,
            warehouse: graph.warehouse,
            n_nodes,
            index: ProblemIndex::default(),
        };
        problem.index = ProblemIndex::new(&problem);

        Ok(problem)
    }

    /// Loads a problem from a JSON file (see the persistence format).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let file: ProblemFile = serde_json::from_str(json)?;
        let permissions: Vec<(usize, usize)> = file
            .permissions
            .iter()
            .map(|p| (p.courier, p.vehicle))
            .collect();
        Problem::new(
            file.couriers,
            file.vehicles,
            file.packages,
            &permissions,
            file.graph,
        )
    }

    /// Writes the problem back out in the persistence format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LoadError> {
        Ok(fs::write(path, self.to_json()?)?)
    }

    pub fn to_json(&self) -> Result<String, LoadError> {
        let mut permissions = Vec::new();
        for i in 0..self.n_couriers() {
            for j in 0..self.n_vehicles() {
                if self.permitted[i * self.n_vehicles() + j] {
                    permissions.push(Permission {
                        courier: i,
                        vehicle: j,
                    });
                }
            }
        }
        let file = ProblemFile {
            couriers: self.couriers.clone(),
            vehicles: self.vehicles.clone(),
            packages: self.packages.clone(),
            permissions,
            graph: Graph {
                points: self.points.clone(),
                routes: self.edges.clone(),
                warehouse: self.warehouse,
            },
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    #[inline(always)]
    pub fn n_couriers(&self) -> usize {
        self.couriers.len()
    }

    #[inline(always)]
    pub fn n_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    #[inline(always)]
    pub fn n_packages(&self) -> usize {
        self.packages.len()
    }

    #[inline(always)]
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    #[inline(always)]
    pub fn warehouse(&self) -> NodeId {
        self.warehouse
    }

    #[inline(always)]
    pub fn courier(&self, courier: CourierId) -> &Courier {
        &self.couriers[courier.index()]
    }

    #[inline(always)]
    pub fn vehicle(&self, vehicle: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle.index()]
    }

    #[inline(always)]
    pub fn package(&self, package: PackageId) -> &Package {
        &self.packages[package]
    }

    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Returns the travel time in minutes between two nodes.
    #[inline(always)]
    pub fn travel_time(&self, origin: NodeId, destination: NodeId) -> Time {
        self.travel_time.get(origin as usize, destination as usize)
    }

    /// Returns the travel distance between two nodes.
    #[inline(always)]
    pub fn distance(&self, origin: NodeId, destination: NodeId) -> Distance {
        self.distance.get(origin as usize, destination as usize)
    }

    /// Checks if the given courier may drive the given vehicle.
    #[inline(always)]
    pub fn has_permission(&self, courier: CourierId, vehicle: VehicleId) -> bool {
        self.permitted[courier.index() * self.vehicles.len() + vehicle.index()]
    }

    /// Returns the couriers permitted to drive the given vehicle.
    #[inline(always)]
    pub fn permitted_couriers(&self, vehicle: VehicleId) -> &[CourierId] {
        self.index.permitted_couriers(vehicle)
    }

    /// Returns the packages addressed to the given node.
    #[inline(always)]
    pub fn packages_at(&self, node: NodeId) -> &[PackageId] {
        self.index.packages_at(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBLEM_JSON: &str = r#"{
        "couriers": [
            {"hourly_rate": 2.5, "work_limit": 480},
            {"hourly_rate": 4.0, "work_limit": 240}
        ],
        "vehicles": [
            {"capacity": 50, "fuel_consumption": 1.5}
        ],
        "packages": [
            {"address": 1, "weight": 8, "start_time": 0, "end_time": 120, "type": "delivery"},
            {"address": 2, "weight": 3, "start_time": 30, "end_time": 300, "type": "pickup"}
        ],
        "permissions": [
            {"courier": 0, "vehicle": 0}
        ],
        "graph": {
            "points": [{"x": 0, "y": 0}, {"x": 3, "y": 4}, {"x": 6, "y": 8}],
            "routes": [
                {"start_node": 0, "end_node": 1, "distance": 5, "time": 12},
                {"start_node": 1, "end_node": 2, "distance": 5, "time": 9}
            ],
            "warehouse": 0
        }
    }"#;

    #[test]
    fn parses_the_persistence_format() {
        let problem = Problem::from_json(PROBLEM_JSON).unwrap();

        assert_eq!(problem.n_couriers(), 2);
        assert_eq!(problem.n_vehicles(), 1);
        assert_eq!(problem.n_packages(), 2);
        assert_eq!(problem.n_nodes(), 3);
        assert_eq!(problem.warehouse(), 0);
        assert_eq!(problem.package(0).kind, PackageKind::Delivery);
        assert_eq!(problem.package(1).kind, PackageKind::Pickup);
    }

    #[test]
    fn matrices_are_symmetric_with_zero_diagonal() {
        let problem = Problem::from_json(PROBLEM_JSON).unwrap();

        assert_eq!(problem.travel_time(0, 1), 12.0);
        assert_eq!(problem.travel_time(1, 0), 12.0);
        assert_eq!(problem.distance(1, 2), 5.0);
        assert_eq!(problem.distance(2, 1), 5.0);
        assert_eq!(problem.travel_time(1, 1), 0.0);
        assert_eq!(problem.distance(2, 2), 0.0);
        // Unlisted pairs default to zero.
        assert_eq!(problem.travel_time(0, 2), 0.0);
    }

    #[test]
    fn permissions_are_a_membership_test() {
        let problem = Problem::from_json(PROBLEM_JSON).unwrap();
        let c0 = CourierId::from_index(0).unwrap();
        let c1 = CourierId::from_index(1).unwrap();
        let v0 = VehicleId::from_index(0).unwrap();

        assert!(problem.has_permission(c0, v0));
        assert!(!problem.has_permission(c1, v0));
        assert_eq!(problem.permitted_couriers(v0), &[c0]);
    }

    #[test]
    fn json_round_trip_preserves_the_problem() {
        let problem = Problem::from_json(PROBLEM_JSON).unwrap();
        let reloaded = Problem::from_json(&problem.to_json().unwrap()).unwrap();

        assert_eq!(reloaded.n_couriers(), problem.n_couriers());
        assert_eq!(reloaded.n_packages(), problem.n_packages());
        assert_eq!(reloaded.package(1).kind, PackageKind::Pickup);
        assert_eq!(reloaded.travel_time(0, 1), problem.travel_time(0, 1));
        let c1 = CourierId::from_index(1).unwrap();
        let v0 = VehicleId::from_index(0).unwrap();
        assert_eq!(
            reloaded.has_permission(c1, v0),
            problem.has_permission(c1, v0)
        );
    }

    #[test]
    fn rejects_packages_addressed_to_the_warehouse() {
        let json = PROBLEM_JSON.replace("\"address\": 1", "\"address\": 0");
        assert!(matches!(
            Problem::from_json(&json),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_permissions() {
        let json = PROBLEM_JSON.replace("\"vehicle\": 0", "\"vehicle\": 7");
        assert!(matches!(
            Problem::from_json(&json),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn rejects_inverted_time_windows() {
        let json = PROBLEM_JSON.replace("\"end_time\": 120", "\"end_time\": -10");
        assert!(matches!(
            Problem::from_json(&json),
            Err(LoadError::Validation(_))
        ));
    }

    #[test]
    fn rejects_unknown_json() {
        assert!(matches!(
            Problem::from_json("{\"couriers\": []}"),
            Err(LoadError::Parse(_))
        ));
    }
}
