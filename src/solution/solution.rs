use crate::problem::{Grid, PackageKind, Problem};
use crate::types::*;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

/// Mutable decision state of one candidate: which vehicle carries each
/// package, which courier drives each vehicle, and the node sequence each
/// vehicle follows.
///
/// Routes use the fixed-length padded convention: position 0 is the
/// warehouse, visited nodes occupy a contiguous prefix starting at
/// position 1, the rest is warehouse padding, and the vehicle implicitly
/// returns to the warehouse after its last stop.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Route of vehicle j, length `n_nodes + 1`.
    x: Vec<Vec<NodeId>>,
    /// Vehicle carrying package k.
    y: Vec<Option<VehicleId>>,
    /// Courier assigned to vehicle j.
    z: Vec<Option<CourierId>>,
    warehouse: NodeId,
    cache: DerivedCache,
}

/// Quantities recomputed from `(x, y, z)` on demand. A single dirty bit is
/// set by every mutating accessor and cleared by `recalculate`.
#[derive(Clone, Debug)]
struct DerivedCache {
    valid: bool,
    /// Arrival time of vehicle j at node v, indexed as [node][vehicle].
    arrival: Grid,
    /// Arrival at the last visited node of each vehicle. The return leg to
    /// the warehouse is not on the clock.
    route_time: Vec<Time>,
    /// Accumulated travel time per courier.
    work_time: Vec<Time>,
    /// Moment each package is handled.
    service_time: Vec<Time>,
    /// Distance covered per vehicle, return leg included.
    distance: Vec<Distance>,
    /// Weight on board after vehicle j leaves node v, indexed as
    /// [vehicle][node]. The warehouse column holds the departure load.
    load: Grid,
}

impl DerivedCache {
    fn new(n_couriers: usize, n_vehicles: usize, n_packages: usize, n_nodes: usize) -> Self {
        DerivedCache {
            valid: false,
            arrival: Grid::new(n_nodes, n_vehicles),
            route_time: vec![0.0; n_vehicles],
            work_time: vec![0.0; n_couriers],
            service_time: vec![0.0; n_packages],
            distance: vec![0.0; n_vehicles],
            load: Grid::new(n_vehicles, n_nodes),
        }
    }
}

impl Solution {
    /// Creates an empty solution: all routes parked at the warehouse, no
    /// package or courier assignments.
    pub fn new(problem: &Problem) -> Self {
        let row = vec![problem.warehouse(); problem.n_nodes() + 1];
        Solution {
            x: vec![row; problem.n_vehicles()],
            y: vec![None; problem.n_packages()],
            z: vec![None; problem.n_vehicles()],
            warehouse: problem.warehouse(),
            cache: DerivedCache::new(
                problem.n_couriers(),
                problem.n_vehicles(),
                problem.n_packages(),
                problem.n_nodes(),
            ),
        }
    }

    #[inline(always)]
    pub fn warehouse(&self) -> NodeId {
        self.warehouse
    }

    #[inline(always)]
    pub fn assignment(&self, package: PackageId) -> Option<VehicleId> {
        self.y[package]
    }

    pub fn assignments(&self) -> &[Option<VehicleId>] {
        &self.y
    }

    #[inline(always)]
    pub fn courier_of(&self, vehicle: VehicleId) -> Option<CourierId> {
        self.z[vehicle.index()]
    }

    pub fn couriers(&self) -> &[Option<CourierId>] {
        &self.z
    }

    /// Vehicle driven by the given courier, if any.
    pub fn vehicle_of(&self, courier: CourierId) -> Option<VehicleId> {
        self.z
            .iter()
            .position(|&c| c == Some(courier))
            .and_then(VehicleId::from_index)
    }

    pub fn set_assignment(&mut self, package: PackageId, vehicle: Option<VehicleId>) {
        self.y[package] = vehicle;
        self.cache.valid = false;
    }

    pub fn set_courier(&mut self, vehicle: VehicleId, courier: Option<CourierId>) {
        self.z[vehicle.index()] = courier;
        self.cache.valid = false;
    }

    /// The full padded route row of a vehicle.
    #[inline(always)]
    pub fn route(&self, vehicle: VehicleId) -> &[NodeId] {
        &self.x[vehicle.index()]
    }

    /// Mutable access to a route row. Marks the derived cache dirty.
    pub fn route_mut(&mut self, vehicle: VehicleId) -> &mut [NodeId] {
        self.cache.valid = false;
        &mut self.x[vehicle.index()]
    }

    /// The visited nodes of a vehicle: the non-warehouse prefix.
    pub fn visited(&self, vehicle: VehicleId) -> &[NodeId] {
        let row = &self.x[vehicle.index()];
        let end = row[1..]
            .iter()
            .position(|&v| v == self.warehouse)
            .map(|p| p + 1)
            .unwrap_or(row.len());
        &row[1..end]
    }

    /// Number of visited nodes on a vehicle's route.
    #[inline(always)]
    pub fn visited_len(&self, vehicle: VehicleId) -> usize {
        self.visited(vehicle).len()
    }

    pub fn route_contains(&self, vehicle: VehicleId, node: NodeId) -> bool {
        self.visited(vehicle).contains(&node)
    }

    /// Compact route of a vehicle with optional warehouse endpoints.
    pub fn route_of(
        &self,
        vehicle: VehicleId,
        include_leading: bool,
        include_trailing: bool,
    ) -> Vec<NodeId> {
        let visited = self.visited(vehicle);
        let mut route = Vec::with_capacity(visited.len() + 2);
        if include_leading {
            route.push(self.warehouse);
        }
        route.extend_from_slice(visited);
        if include_trailing {
            route.push(self.warehouse);
        }
        route
    }

    /// True if the vehicle carries at least one package.
    pub fn is_used(&self, vehicle: VehicleId) -> bool {
        self.y.iter().any(|&v| v == Some(vehicle))
    }

    /// Distinct vehicles carrying packages, in index order.
    pub fn used_vehicles(&self) -> Vec<VehicleId> {
        let mut used: Vec<VehicleId> = self.y.iter().flatten().copied().collect();
        used.sort_unstable();
        used.dedup();
        used
    }

    /// Vehicles carrying no packages, in index order.
    pub fn unused_vehicles(&self, problem: &Problem) -> Vec<VehicleId> {
        let used = self.used_vehicles();
        (0..problem.n_vehicles())
            .filter_map(VehicleId::from_index)
            .filter(|j| !used.contains(j))
            .collect()
    }

    pub fn swap_routes(&mut self, a: VehicleId, b: VehicleId) {
        self.x.swap(a.index(), b.index());
        self.cache.valid = false;
    }

    /// Resets a route row to all-warehouse padding.
    pub fn clear_route(&mut self, vehicle: VehicleId) {
        self.x[vehicle.index()].fill(self.warehouse);
        self.cache.valid = false;
    }

    /// Clears stale courier assignments: a vehicle without packages keeps no
    /// courier. Applied after every accepted mutation.
    pub fn normalize(&mut self) {
        let used = self.used_vehicles();
        for j in 0..self.z.len() {
            if self.z[j].is_some() {
                let vehicle = VehicleId::from_index(j).unwrap();
                if !used.contains(&vehicle) {
                    self.z[j] = None;
                    self.cache.valid = false;
                }
            }
        }
    }

    /// Recomputes every derived quantity from `(x, y, z)` and clears the
    /// dirty bit.
    pub fn recalculate(&mut self, problem: &Problem) {
        let warehouse = self.warehouse;
        let cache = &mut self.cache;
        cache.arrival.reset();
        cache.route_time.fill(0.0);
        cache.work_time.fill(0.0);
        cache.service_time.fill(0.0);
        cache.distance.fill(0.0);
        cache.load.reset();

        // Departure loads: every delivery assigned to a vehicle is on board
        // when it leaves the warehouse.
        let mut departure_load = vec![0.0; self.x.len()];
        for (k, package) in problem.packages().iter().enumerate() {
            if package.kind == PackageKind::Delivery {
                if let Some(vehicle) = self.y[k] {
                    departure_load[vehicle.index()] += package.weight;
                }
            }
        }

        for (j, row) in self.x.iter().enumerate() {
            let mut time: Time = 0.0;
            let mut dist: Distance = 0.0;
            let mut load = departure_load[j];
            let mut prev = warehouse;
            cache.load.set(j, warehouse as usize, load);

            for &node in &row[1..] {
                if node == warehouse {
                    break;
                }
                time += problem.travel_time(prev, node);
                dist += problem.distance(prev, node);
                cache.arrival.set(node as usize, j, time);

                for &k in problem.packages_at(node) {
                    if self.y[k].map(VehicleId::index) == Some(j) {
                        let package = problem.package(k);
                        match package.kind {
                            PackageKind::Delivery => load -= package.weight,
                            PackageKind::Pickup => load += package.weight,
                        }
                    }
                }
                cache.load.set(j, node as usize, load);
                prev = node;
            }

            // The route closes back at the warehouse: fuel is burned on the
            // return leg, the courier's clock is not.
            if prev != warehouse {
                dist += problem.distance(prev, warehouse);
            }
            cache.route_time[j] = time;
            cache.distance[j] = dist;

            if let Some(courier) = self.z[j] {
                cache.work_time[courier.index()] += time;
            }
        }

        for (k, package) in problem.packages().iter().enumerate() {
            if let Some(vehicle) = self.y[k] {
                cache.service_time[k] =
                    cache.arrival.get(package.address as usize, vehicle.index());
            }
        }

        cache.valid = true;
    }

    #[inline]
    fn refresh(&mut self, problem: &Problem) {
        if !self.cache.valid {
            self.recalculate(problem);
        }
    }

    /// Arrival time of a vehicle at a node; zero for nodes it never visits.
    pub fn arrival_time(&mut self, problem: &Problem, node: NodeId, vehicle: VehicleId) -> Time {
        self.refresh(problem);
        self.cache.arrival.get(node as usize, vehicle.index())
    }

    /// Arrival at a vehicle's last stop, i.e. how long its courier works.
    pub fn route_time(&mut self, problem: &Problem, vehicle: VehicleId) -> Time {
        self.refresh(problem);
        self.cache.route_time[vehicle.index()]
    }

    /// Total work time of a courier; zero if unassigned.
    pub fn total_work_time(&mut self, problem: &Problem, courier: CourierId) -> Time {
        self.refresh(problem);
        self.cache.work_time[courier.index()]
    }

    /// Moment a package is handled by its vehicle.
    pub fn service_time(&mut self, problem: &Problem, package: PackageId) -> Time {
        self.refresh(problem);
        self.cache.service_time[package]
    }

    /// Distance covered by a vehicle, return leg included.
    pub fn distance(&mut self, problem: &Problem, vehicle: VehicleId) -> Distance {
        self.refresh(problem);
        self.cache.distance[vehicle.index()]
    }

    /// Weight on board after the vehicle leaves the given node.
    pub fn load(&mut self, problem: &Problem, vehicle: VehicleId, node: NodeId) -> Weight {
        self.refresh(problem);
        self.cache.load.get(vehicle.index(), node as usize)
    }

    /// Objective value: wages plus weighted fuel plus the mean lateness
    /// penalty.
    pub fn cost(
        &mut self,
        problem: &Problem,
        fuel_weight: f64,
        lateness_weight: f64,
    ) -> Money {
        self.refresh(problem);

        let mut wages = 0.0;
        for (i, courier) in problem.couriers().iter().enumerate() {
            wages += courier.hourly_rate * self.cache.work_time[i];
        }

        let mut fuel = 0.0;
        for (j, vehicle) in problem.vehicles().iter().enumerate() {
            fuel += vehicle.fuel_consumption * self.cache.distance[j];
        }

        let mut delay = 0.0;
        if problem.n_packages() > 0 {
            for (k, package) in problem.packages().iter().enumerate() {
                delay += self.cache.service_time[k] - package.start_time;
            }
            delay /= problem.n_packages() as f64;
        }

        wages + fuel_weight * fuel + lateness_weight * delay
    }

    /// Human-readable rendering of the assignment and routes, one block per
    /// used vehicle.
    pub fn render(&self, problem: &Problem) -> String {
        let mut out = String::new();
        for j in 0..problem.n_vehicles() {
            let vehicle = VehicleId::from_index(j).unwrap();
            let Some(courier) = self.z[j] else { continue };

            let c = problem.courier(courier);
            let v = problem.vehicle(vehicle);
            let _ = writeln!(
                out,
                "courier {} (rate {}, limit {}) drives vehicle {} (capacity {}, fuel {})",
                courier.index(),
                c.hourly_rate,
                c.work_limit,
                j,
                v.capacity,
                v.fuel_consumption
            );
            for (k, assigned) in self.y.iter().enumerate() {
                if *assigned == Some(vehicle) {
                    let p = problem.package(k);
                    let _ = writeln!(
                        out,
                        "  package {} at node {} ({:?}, {} kg, [{}, {}])",
                        k, p.address, p.kind, p.weight, p.start_time, p.end_time
                    );
                }
            }
            let stops: Vec<String> = self
                .route_of(vehicle, true, true)
                .iter()
                .map(|node| node.to_string())
                .collect();
            let _ = writeln!(out, "  {}", stops.join(" -> "));
        }
        out
    }
}

// Identity is the decision state alone; the cache never participates.
impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl Eq for Solution {}

impl Hash for Solution {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for row in &self.x {
            row.hash(state);
        }
        self.y.hash(state);
        self.z.hash(state);
    }
}
