// Human-readable phase messages for a launch.

use std::io::{self, Write};

use crate::launcher::{LaunchEvent, LaunchFailure};

const RULE: &str = "*****************************************************";

/// Render one event as the lines shown to the user.
///
/// `program` is the runtime CLI, used in the "view logs" hint.
pub fn render(event: &LaunchEvent, program: &str) -> Vec<String> {
    match event {
        LaunchEvent::TeardownStarted { container } => vec![format!(
            "Attempting to stop and remove any container named '{container}'..."
        )],
        LaunchEvent::ImageFound { image } => vec![format!(
            "✅ Image '{image}' found locally. Skipping build step."
        )],
        LaunchEvent::ImageMissing { image } => vec![format!(
            "❌ Image '{image}' not found locally. Starting build process..."
        )],
        LaunchEvent::BuildSucceeded { .. } => vec!["✅ Build successful.".to_string()],
        LaunchEvent::RunStarted {
            container,
            host_port,
            container_port,
        } => vec![format!(
            "🚀 Running container '{container}' and mapping host port {host_port} to container port {container_port}..."
        )],
        LaunchEvent::Started { container, url } => vec![
            String::new(),
            RULE.to_string(),
            "Container started successfully in detached mode (-d).".to_string(),
            format!("Application available at {url}"),
            format!("To view logs: {program} logs {container}"),
            RULE.to_string(),
        ],
        LaunchEvent::Failed(LaunchFailure::Build { .. }) => {
            vec!["💥 Error: Docker image build failed. Aborting.".to_string()]
        }
        LaunchEvent::Failed(LaunchFailure::Run { .. }) => {
            vec!["💥 Error: Docker container failed to start.".to_string()]
        }
    }
}

/// Writes rendered events to a sink, stdout by default.
pub struct Console<W: Write> {
    out: W,
    program: String,
}

impl Console<io::Stdout> {
    pub fn stdout(program: impl Into<String>) -> Self {
        Self::new(io::stdout(), program)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, program: impl Into<String>) -> Self {
        Self {
            out,
            program: program.into(),
        }
    }

    pub fn show(&mut self, event: &LaunchEvent) {
        for line in render(event, &self.program) {
            // Console is best-effort; a closed stdout must not abort a launch.
            let _ = writeln!(self.out, "{line}");
        }
        let _ = self.out.flush();
    }
}
