mod io;

pub use io::{Args, ConfigError, SimulationConfig};
pub use clap::Parser;
