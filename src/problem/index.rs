use crate::problem::Problem;
use crate::types::*;

/// Precomputed data structures
#[derive(Default)]
pub(crate) struct ProblemIndex {
    /// For each vehicle, the list of couriers permitted to drive it.
    permitted_couriers: Vec<Vec<CourierId>>,
    /// For each node, the packages addressed to it.
    packages_by_address: Vec<Vec<PackageId>>,
}

impl ProblemIndex {
    /// Create a new problem index with precomputed data structures
    pub fn new(problem: &Problem) -> Self {
        ProblemIndex {
            permitted_couriers: Self::create_permitted_couriers(problem),
            packages_by_address: Self::create_packages_by_address(problem),
        }
    }

    /// Transpose the permission table into per-vehicle courier lists.
    fn create_permitted_couriers(problem: &Problem) -> Vec<Vec<CourierId>> {
        let mut permitted = vec![Vec::new(); problem.n_vehicles()];

        for veh_idx in 0..problem.n_vehicles() {
            let vehicle = VehicleId::from_index(veh_idx).unwrap();
            for cour_idx in 0..problem.n_couriers() {
                let courier = CourierId::from_index(cour_idx).unwrap();
                if problem.has_permission(courier, vehicle) {
                    permitted[veh_idx].push(courier);
                }
            }
        }

        permitted
    }

    /// Group package ids by their address node.
    fn create_packages_by_address(problem: &Problem) -> Vec<Vec<PackageId>> {
        let mut by_address = vec![Vec::new(); problem.n_nodes()];

        for (k, package) in problem.packages().iter().enumerate() {
            by_address[package.address as usize].push(k);
        }

        by_address
    }

    #[inline(always)]
    pub fn permitted_couriers(&self, vehicle: VehicleId) -> &[CourierId] {
        &self.permitted_couriers[vehicle.index()]
    }

    #[inline(always)]
    pub fn packages_at(&self, node: NodeId) -> &[PackageId] {
        &self.packages_by_address[node as usize]
    }
}
