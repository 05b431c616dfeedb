use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// States a single launch moves through.
///
/// `Idle → TearingDown → CheckingImage → {Building | SkipBuild} → Running →
/// {Success | Failed}`; `Building` can also end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchState {
    Idle,
    TearingDown,
    CheckingImage,
    Building,
    SkipBuild,
    Running,
    Success,
    Failed,
}

impl LaunchState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LaunchState::Success | LaunchState::Failed)
    }

    /// Whether `self → next` is an edge of the launch state machine.
    pub fn can_advance_to(self, next: LaunchState) -> bool {
        use LaunchState::*;
        matches!(
            (self, next),
            (Idle, TearingDown)
                | (TearingDown, CheckingImage)
                | (CheckingImage, Building)
                | (CheckingImage, SkipBuild)
                | (Building, Running)
                | (Building, Failed)
                | (SkipBuild, Running)
                | (Running, Success)
                | (Running, Failed)
        )
    }
}

/// Fatal launch errors. Teardown problems are never one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchFailure {
    #[error("image build failed for '{image}'{exit}", exit = describe_exit(.exit_code))]
    Build {
        image: String,
        exit_code: Option<i32>,
    },

    #[error("container '{container}' failed to start{exit}", exit = describe_exit(.exit_code))]
    Run {
        container: String,
        exit_code: Option<i32>,
    },
}

impl LaunchFailure {
    /// Process exit code the CLI reports for this failure.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!(" (exit {c})"),
        None => " (could not be started or was killed)".to_string(),
    }
}

/// Progress notifications emitted while a launch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    TeardownStarted { container: String },
    ImageFound { image: String },
    ImageMissing { image: String },
    BuildSucceeded { image: String },
    RunStarted {
        container: String,
        host_port: u16,
        container_port: u16,
    },
    Started { container: String, url: String },
    Failed(LaunchFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchStatus {
    Success,
    Failed,
}

/// Machine-readable summary of one launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchReport {
    pub image: String,
    pub container: String,
    pub built: bool,
    pub status: LaunchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub states: Vec<LaunchState>,
    #[serde(
        rename = "error",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_failure"
    )]
    pub failure: Option<LaunchFailure>,
}

impl LaunchReport {
    pub fn succeeded(&self) -> bool {
        self.status == LaunchStatus::Success
    }

    pub fn exit_code(&self) -> i32 {
        match &self.failure {
            Some(failure) => failure.exit_code(),
            None => 0,
        }
    }
}

fn serialize_failure<S: Serializer>(
    failure: &Option<LaunchFailure>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match failure {
        Some(f) => serializer.collect_str(f),
        None => serializer.serialize_none(),
    }
}
