use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

use super::types::{CommandOutcome, ContainerRuntime, OutputMode, RuntimeCommand};

/// Runtime adapter that shells out to the `docker` (or compatible) CLI and
/// blocks until each command exits.
#[derive(Debug, Clone)]
pub struct DockerCli {
    program: String,
}

impl DockerCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for DockerCli {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl ContainerRuntime for DockerCli {
    fn program(&self) -> &str {
        &self.program
    }

    fn execute(&self, cmd: &RuntimeCommand) -> Result<CommandOutcome> {
        debug!(command = %cmd.display(&self.program), "executing");

        let mut process = Command::new(&self.program);
        process.args(&cmd.args).stdin(Stdio::null());
        match cmd.output {
            OutputMode::Quiet => {
                process.stdout(Stdio::null()).stderr(Stdio::null());
            }
            OutputMode::StdoutOnly => {
                process.stderr(Stdio::null());
            }
            OutputMode::Inherit => {}
        }

        let status = process.status().with_context(|| {
            format!(
                "failed to invoke `{}` (is it installed and on PATH?)",
                self.program
            )
        })?;

        debug!(exit_code = ?status.code(), "command finished");
        Ok(CommandOutcome {
            exit_code: status.code(),
        })
    }
}
