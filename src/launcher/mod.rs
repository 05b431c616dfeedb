// Container launch: command assembly, the state machine, reports.

pub mod commands;
pub mod orchestrator;
mod types;

pub use commands::plan;
pub use orchestrator::launch;
pub use types::{LaunchEvent, LaunchFailure, LaunchReport, LaunchState, LaunchStatus};
