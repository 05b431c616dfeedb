// Container runtime boundary: command types and the CLI adapter.

pub mod engine;
pub mod types;

pub use engine::DockerCli;
pub use types::{CommandOutcome, ContainerRuntime, OutputMode, RuntimeCommand};
