use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::LaunchConfig;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_FILE: &str = ".relaunch.yaml";

/// Load config from an explicit file, or from `.relaunch.yaml` in `dir`.
///
/// A missing default file yields the built-in defaults; a missing explicit
/// file is an error.
pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<LaunchConfig> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let candidate = dir.join(DEFAULT_FILE);
            if !candidate.exists() {
                return Ok(LaunchConfig::default());
            }
            candidate
        }
    };

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid config file {}", path.display()))
}

/// Parse YAML config text. Absent keys keep their defaults.
pub fn parse(contents: &str) -> Result<LaunchConfig> {
    if contents.trim().is_empty() {
        return Ok(LaunchConfig::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}

/// Values supplied on the command line or through `RELAUNCH_*` variables.
/// `None` leaves the file/default value in place.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub image: Option<String>,
    pub container: Option<String>,
    pub host_port: Option<u16>,
    pub container_port: Option<u16>,
    pub context: Option<PathBuf>,
    pub runtime: Option<String>,
    pub run_args: Option<String>,
}

impl Overrides {
    pub fn apply(self, mut cfg: LaunchConfig) -> LaunchConfig {
        if let Some(v) = self.image {
            cfg.image = v;
        }
        if let Some(v) = self.container {
            cfg.container = v;
        }
        if let Some(v) = self.host_port {
            cfg.host_port = v;
        }
        if let Some(v) = self.container_port {
            cfg.container_port = v;
        }
        if let Some(v) = self.context {
            cfg.context = v;
        }
        if let Some(v) = self.runtime {
            cfg.runtime = v;
        }
        if let Some(v) = self.run_args {
            cfg.run_args = v;
        }
        cfg
    }
}

/// Resolve the final, validated config: defaults, file, then overrides.
pub fn resolve(explicit: Option<&Path>, dir: &Path, overrides: Overrides) -> Result<LaunchConfig> {
    let cfg = overrides.apply(load(explicit, dir)?);
    cfg.validate().context("invalid launch configuration")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load(None, dir.path()).unwrap();
        assert_eq!(cfg, LaunchConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(load(Some(&missing), dir.path()).is_err());
    }

    #[test]
    fn default_file_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_FILE),
            "image: svc\ncontainer: svc-c\nhost_port: 9000\n",
        )
        .unwrap();

        let cfg = load(None, dir.path()).unwrap();
        assert_eq!(cfg.image, "svc");
        assert_eq!(cfg.container, "svc-c");
        assert_eq!(cfg.host_port, 9000);
        // Untouched keys keep their defaults.
        assert_eq!(cfg.container_port, 8081);
    }

    #[test]
    fn explicit_file_wins_over_default_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_FILE), "image: from-default\n").unwrap();
        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "image: from-explicit\n").unwrap();

        let cfg = load(Some(&explicit), dir.path()).unwrap();
        assert_eq!(cfg.image, "from-explicit");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("imagee: typo\n").is_err());
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        assert!(parse("host_port: 70000\n").is_err());
        assert!(parse("host_port: -1\n").is_err());
    }

    #[test]
    fn empty_file_is_defaults() {
        assert_eq!(parse("   \n").unwrap(), LaunchConfig::default());
    }

    #[test]
    fn overrides_take_precedence_over_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_FILE),
            "image: file-image\nhost_port: 9000\n",
        )
        .unwrap();

        let overrides = Overrides {
            host_port: Some(9100),
            runtime: Some("podman".into()),
            ..Overrides::default()
        };
        let cfg = resolve(None, dir.path(), overrides).unwrap();
        assert_eq!(cfg.image, "file-image");
        assert_eq!(cfg.host_port, 9100);
        assert_eq!(cfg.runtime, "podman");
    }

    #[test]
    fn resolve_validates_the_merged_config() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            container_port: Some(0),
            ..Overrides::default()
        };
        assert!(resolve(None, dir.path(), overrides).is_err());
    }
}
