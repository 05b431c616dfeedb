use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Everything a single launch needs to know about the service it manages.
///
/// Built once per process (defaults, then file, then overrides) and treated
/// as read-only after [`LaunchConfig::validate`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchConfig {
    pub image: String,
    pub container: String,
    pub host_port: u16,
    pub container_port: u16,
    pub context: PathBuf,
    /// Program used to talk to the container runtime.
    pub runtime: String,
    /// Extra `run` arguments, shell-quoted.
    pub run_args: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            image: "user-service-app".to_string(),
            container: "user-service-container".to_string(),
            host_port: 8081,
            container_port: 8081,
            context: PathBuf::from("./"),
            runtime: "docker".to_string(),
            run_args: String::new(),
        }
    }
}

impl LaunchConfig {
    /// Reject configurations the runtime would choke on before touching it.
    pub fn validate(&self) -> Result<()> {
        check_identifier("image", &self.image)?;
        check_identifier("container", &self.container)?;
        check_identifier("runtime", &self.runtime)?;

        if self.host_port == 0 {
            bail!("host_port must be between 1 and 65535");
        }
        if self.container_port == 0 {
            bail!("container_port must be between 1 and 65535");
        }
        if self.context.as_os_str().is_empty() {
            bail!("context must not be empty");
        }

        self.extra_run_args()?;
        Ok(())
    }

    /// `run_args` split into individual arguments.
    pub fn extra_run_args(&self) -> Result<Vec<String>> {
        shell_words::split(&self.run_args)
            .with_context(|| format!("run_args is not valid shell syntax: {}", self.run_args))
    }

    /// Address the service is reachable on once the container is up.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.host_port)
    }
}

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        bail!("{field} must not be empty");
    }
    if value.chars().any(char::is_whitespace) {
        bail!("{field} must not contain whitespace: {value:?}");
    }
    Ok(())
}
