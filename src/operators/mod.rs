pub mod construction;
pub mod couriers;
pub mod crossover;
pub mod mutation;
pub mod packages;
pub mod route;
pub mod vehicles;

pub use self::construction::{build_vehicle_route, generate_many_feasible, GeneratedPopulation};
pub use self::crossover::crossover;
pub use self::mutation::{mutate, Mutation, MutationKind, MutationProbabilities, MutationStats};

#[cfg(test)]
mod tests;
