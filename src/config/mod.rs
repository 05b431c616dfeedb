// Launch configuration: defaults, YAML file, command-line/env overrides.

mod loader;
mod types;

pub use loader::{DEFAULT_FILE, Overrides, load, parse, resolve};
pub use types::LaunchConfig;
