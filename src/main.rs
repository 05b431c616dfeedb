use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use relaunch::config::{self, LaunchConfig, Overrides};
use relaunch::console::Console;
use relaunch::docker::{ContainerRuntime, DockerCli};
use relaunch::launcher::{self, LaunchReport};

/// Stop and remove the service container, build its image if missing, and
/// start a fresh detached container.
#[derive(Parser, Debug)]
#[command(name = "relaunch", version)]
struct Cli {
    /// YAML config file [default: ./.relaunch.yaml when present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image to build and run
    #[arg(long, env = "RELAUNCH_IMAGE")]
    image: Option<String>,

    /// Name of the container to replace
    #[arg(long, env = "RELAUNCH_CONTAINER")]
    container: Option<String>,

    /// Port published on the host
    #[arg(long, env = "RELAUNCH_HOST_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    host_port: Option<u16>,

    /// Port the service listens on inside the container
    #[arg(long, env = "RELAUNCH_CONTAINER_PORT", value_parser = clap::value_parser!(u16).range(1..))]
    container_port: Option<u16>,

    /// Build context directory
    #[arg(long, env = "RELAUNCH_CONTEXT")]
    context: Option<PathBuf>,

    /// Container runtime CLI (docker, podman)
    #[arg(long, env = "RELAUNCH_RUNTIME")]
    runtime: Option<String>,

    /// Extra arguments for `run`, shell-quoted
    #[arg(long, env = "RELAUNCH_RUN_ARGS", allow_hyphen_values = true)]
    run_args: Option<String>,

    /// Print the commands a launch would issue and exit
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON launch report to this file
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            image: self.image.clone(),
            container: self.container.clone(),
            host_port: self.host_port,
            container_port: self.container_port,
            context: self.context.clone(),
            runtime: self.runtime.clone(),
            run_args: self.run_args.clone(),
        }
    }
}

fn main() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(ExitCode::from(parse_exit_code(&e)));
        }
    };
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let cfg = config::resolve(cli.config.as_deref(), &cwd, cli.overrides())?;
    debug!(?cfg, "resolved launch config");

    let runtime = DockerCli::new(cfg.runtime.clone());

    if cli.dry_run {
        print_plan(&cfg, &runtime)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut console = Console::stdout(runtime.program());
    let report = launcher::launch(&cfg, &runtime, |event| console.show(event));
    info!(
        succeeded = report.succeeded(),
        built = report.built,
        "launch finished"
    );

    if let Some(path) = &cli.report_json {
        write_report(&report, path)?;
    }

    Ok(ExitCode::from(report.exit_code() as u8))
}

/// `--help` and `--version` exit 0; bad flags or `RELAUNCH_*` values are
/// configuration errors and exit 1.
fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "relaunch=debug" } else { "relaunch=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn print_plan(cfg: &LaunchConfig, runtime: &impl ContainerRuntime) -> Result<()> {
    for cmd in launcher::plan(cfg)? {
        println!("{}", cmd.display(runtime.program()));
    }
    Ok(())
}

fn write_report(report: &LaunchReport, path: &std::path::Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};
    use serial_test::serial;

    const IMAGE_VAR: &str = "RELAUNCH_TEST_IMAGE";
    const HOST_PORT_VAR: &str = "RELAUNCH_TEST_HOST_PORT";

    /// Parse with the env fallbacks pointed at test-only variable names.
    fn parse_with_env(args: &[&str]) -> Result<Cli, clap::Error> {
        let matches = Cli::command()
            .mut_arg("image", |a| a.env(IMAGE_VAR))
            .mut_arg("host_port", |a| a.env(HOST_PORT_VAR))
            .try_get_matches_from(args)?;
        Cli::from_arg_matches(&matches)
    }

    fn set_env(key: &str, value: &str) {
        // SAFETY: env-touching tests are #[serial], so no other test thread
        // reads the environment concurrently.
        unsafe { std::env::set_var(key, value) };
    }

    fn clear_env(key: &str) {
        // SAFETY: see set_env.
        unsafe { std::env::remove_var(key) };
    }

    fn dir_with_config(yaml: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(config::DEFAULT_FILE), yaml).unwrap();
        dir
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    #[serial]
    fn zero_port_is_rejected_by_parser() {
        let err = Cli::try_parse_from(["relaunch", "--host-port", "0"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 1);
    }

    #[test]
    #[serial]
    fn malformed_ports_exit_with_one() {
        for bad in ["abc", "70000", "-1"] {
            let err = Cli::try_parse_from(["relaunch", "--container-port", bad]).unwrap_err();
            assert_eq!(parse_exit_code(&err), 1, "value {bad}");
        }
    }

    #[test]
    #[serial]
    fn help_and_version_exit_with_zero() {
        let help = Cli::try_parse_from(["relaunch", "--help"]).unwrap_err();
        assert_eq!(parse_exit_code(&help), 0);
        let version = Cli::try_parse_from(["relaunch", "--version"]).unwrap_err();
        assert_eq!(parse_exit_code(&version), 0);
    }

    #[test]
    #[serial]
    fn env_overrides_file_and_flag_overrides_env() {
        let dir = dir_with_config("image: file-image\nhost_port: 9000\n");

        clear_env(IMAGE_VAR);
        let cli = parse_with_env(&["relaunch"]).unwrap();
        let cfg = config::resolve(None, dir.path(), cli.overrides()).unwrap();
        assert_eq!(cfg.image, "file-image");

        set_env(IMAGE_VAR, "env-image");
        let cli = parse_with_env(&["relaunch"]).unwrap();
        let cfg = config::resolve(None, dir.path(), cli.overrides()).unwrap();
        assert_eq!(cfg.image, "env-image");
        assert_eq!(cfg.host_port, 9000);

        let cli = parse_with_env(&["relaunch", "--image", "flag-image"]).unwrap();
        let cfg = config::resolve(None, dir.path(), cli.overrides()).unwrap();
        assert_eq!(cfg.image, "flag-image");

        clear_env(IMAGE_VAR);
    }

    #[test]
    #[serial]
    fn env_port_overrides_file() {
        let dir = dir_with_config("host_port: 9000\n");
        set_env(HOST_PORT_VAR, "9100");
        let cli = parse_with_env(&["relaunch"]).unwrap();
        clear_env(HOST_PORT_VAR);

        let cfg = config::resolve(None, dir.path(), cli.overrides()).unwrap();
        assert_eq!(cfg.host_port, 9100);
    }

    #[test]
    #[serial]
    fn malformed_env_port_is_a_configuration_error() {
        for bad in ["abc", "0", "65536"] {
            set_env(HOST_PORT_VAR, bad);
            let result = parse_with_env(&["relaunch"]);
            clear_env(HOST_PORT_VAR);

            let err = match result {
                Ok(_) => panic!("{HOST_PORT_VAR}={bad} should be rejected"),
                Err(e) => e,
            };
            assert_eq!(parse_exit_code(&err), 1, "value {bad}");
        }
    }

    #[test]
    #[serial]
    fn flags_become_overrides() {
        let cli = Cli::try_parse_from([
            "relaunch",
            "--image",
            "svc",
            "--container",
            "svc-c",
            "--host-port",
            "9000",
            "--run-args",
            "-e A=b",
        ])
        .unwrap();
        let o = cli.overrides();
        assert_eq!(o.image.as_deref(), Some("svc"));
        assert_eq!(o.container.as_deref(), Some("svc-c"));
        assert_eq!(o.host_port, Some(9000));
        assert_eq!(o.run_args.as_deref(), Some("-e A=b"));
    }
}
