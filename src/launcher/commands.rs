use anyhow::Result;

use crate::config::LaunchConfig;
use crate::docker::RuntimeCommand;

/// `stop <container>`; stderr discarded, so a missing container stays silent.
pub fn stop_command(cfg: &LaunchConfig) -> RuntimeCommand {
    RuntimeCommand::stdout_only(["stop", cfg.container.as_str()])
}

/// `rm <container>`; stderr discarded.
pub fn remove_command(cfg: &LaunchConfig) -> RuntimeCommand {
    RuntimeCommand::stdout_only(["rm", cfg.container.as_str()])
}

/// `image inspect <image>`; exit code 0 means the image exists.
pub fn inspect_command(cfg: &LaunchConfig) -> RuntimeCommand {
    RuntimeCommand::quiet(["image", "inspect", cfg.image.as_str()])
}

/// `build -t <image> <context>`, streamed to the terminal.
pub fn build_command(cfg: &LaunchConfig) -> RuntimeCommand {
    RuntimeCommand::inherit([
        "build".to_string(),
        "-t".to_string(),
        cfg.image.clone(),
        cfg.context.display().to_string(),
    ])
}

/// `run -d -p <host>:<container> --name <container> [run_args…] <image>`.
pub fn run_command(cfg: &LaunchConfig) -> Result<RuntimeCommand> {
    let mut args = vec![
        "run".to_string(),
        "-d".to_string(),
        "-p".to_string(),
        format!("{}:{}", cfg.host_port, cfg.container_port),
        "--name".to_string(),
        cfg.container.clone(),
    ];
    args.extend(cfg.extra_run_args()?);
    args.push(cfg.image.clone());

    Ok(RuntimeCommand::inherit(args))
}

/// Every command a launch could issue, in order, assuming the image is
/// missing.
pub fn plan(cfg: &LaunchConfig) -> Result<Vec<RuntimeCommand>> {
    Ok(vec![
        stop_command(cfg),
        remove_command(cfg),
        inspect_command(cfg),
        build_command(cfg),
        run_command(cfg)?,
    ])
}
