use tracing::{debug, error, info};

use crate::config::LaunchConfig;
use crate::docker::{ContainerRuntime, RuntimeCommand};

use super::commands::{build_command, inspect_command, remove_command, run_command, stop_command};
use super::types::{LaunchEvent, LaunchFailure, LaunchReport, LaunchState, LaunchStatus};

/// Ensure exactly one fresh container is running for `cfg`.
///
/// Runs, strictly in order: best-effort teardown (`stop`, `rm`), the image
/// existence probe, a build only when the image is missing, and finally a
/// detached `run`. Build and run failures end the launch immediately; there
/// is no retry. `observer` sees each phase as it happens.
///
/// The returned report is always complete; check [`LaunchReport::failure`]
/// or [`LaunchReport::exit_code`] for the outcome.
pub fn launch<R, F>(cfg: &LaunchConfig, runtime: &R, mut observer: F) -> LaunchReport
where
    R: ContainerRuntime + ?Sized,
    F: FnMut(&LaunchEvent),
{
    let mut run = Run::new(cfg);

    // ── Teardown ─────────────────────────────────────────────────────
    run.advance(LaunchState::TearingDown);
    observer(&LaunchEvent::TeardownStarted {
        container: cfg.container.clone(),
    });
    best_effort(runtime, &stop_command(cfg));
    best_effort(runtime, &remove_command(cfg));

    // ── Existence check ──────────────────────────────────────────────
    run.advance(LaunchState::CheckingImage);
    let needs_build = !image_exists(runtime, cfg);

    // ── Conditional build ────────────────────────────────────────────
    if needs_build {
        observer(&LaunchEvent::ImageMissing {
            image: cfg.image.clone(),
        });
        run.advance(LaunchState::Building);
        run.built = true;

        let exit_code = fatal_step(runtime, &build_command(cfg));
        if exit_code != Some(0) {
            let failure = LaunchFailure::Build {
                image: cfg.image.clone(),
                exit_code,
            };
            return run.fail(failure, &mut observer);
        }
        observer(&LaunchEvent::BuildSucceeded {
            image: cfg.image.clone(),
        });
    } else {
        observer(&LaunchEvent::ImageFound {
            image: cfg.image.clone(),
        });
        run.advance(LaunchState::SkipBuild);
    }

    // ── Run ──────────────────────────────────────────────────────────
    run.advance(LaunchState::Running);
    observer(&LaunchEvent::RunStarted {
        container: cfg.container.clone(),
        host_port: cfg.host_port,
        container_port: cfg.container_port,
    });

    let exit_code = match run_command(cfg) {
        Ok(cmd) => fatal_step(runtime, &cmd),
        Err(e) => {
            error!("cannot assemble run command: {e:#}");
            None
        }
    };
    if exit_code != Some(0) {
        let failure = LaunchFailure::Run {
            container: cfg.container.clone(),
            exit_code,
        };
        return run.fail(failure, &mut observer);
    }

    run.advance(LaunchState::Success);
    let url = cfg.url();
    info!(container = %cfg.container, %url, "container started");
    observer(&LaunchEvent::Started {
        container: cfg.container.clone(),
        url: url.clone(),
    });
    run.finish(LaunchStatus::Success, Some(url), None)
}

/// Bookkeeping for one pass through the state machine.
struct Run<'a> {
    cfg: &'a LaunchConfig,
    state: LaunchState,
    states: Vec<LaunchState>,
    built: bool,
}

impl<'a> Run<'a> {
    fn new(cfg: &'a LaunchConfig) -> Self {
        Self {
            cfg,
            state: LaunchState::Idle,
            states: vec![LaunchState::Idle],
            built: false,
        }
    }

    fn advance(&mut self, next: LaunchState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            self.state,
            next
        );
        info!(from = ?self.state, to = ?next, "launch state");
        self.state = next;
        self.states.push(next);
    }

    fn fail<F>(mut self, failure: LaunchFailure, observer: &mut F) -> LaunchReport
    where
        F: FnMut(&LaunchEvent),
    {
        self.advance(LaunchState::Failed);
        error!("{failure}");
        observer(&LaunchEvent::Failed(failure.clone()));
        self.finish(LaunchStatus::Failed, None, Some(failure))
    }

    fn finish(
        self,
        status: LaunchStatus,
        url: Option<String>,
        failure: Option<LaunchFailure>,
    ) -> LaunchReport {
        LaunchReport {
            image: self.cfg.image.clone(),
            container: self.cfg.container.clone(),
            built: self.built,
            status,
            url,
            states: self.states,
            failure,
        }
    }
}

/// Run a teardown command, swallowing every kind of failure.
fn best_effort<R: ContainerRuntime + ?Sized>(runtime: &R, cmd: &RuntimeCommand) {
    match runtime.execute(cmd) {
        Ok(outcome) if outcome.success() => {}
        Ok(outcome) => debug!(
            command = %cmd.display(runtime.program()),
            exit_code = ?outcome.exit_code,
            "ignoring teardown failure"
        ),
        Err(e) => debug!(
            command = %cmd.display(runtime.program()),
            "ignoring teardown failure: {e:#}"
        ),
    }
}

/// A spawn failure counts as "image absent"; the build step then reports
/// the underlying problem.
fn image_exists<R: ContainerRuntime + ?Sized>(runtime: &R, cfg: &LaunchConfig) -> bool {
    match runtime.execute(&inspect_command(cfg)) {
        Ok(outcome) => outcome.success(),
        Err(e) => {
            debug!("image probe could not run: {e:#}");
            false
        }
    }
}

/// Run a step whose failure ends the launch. Spawn errors map to `None`.
fn fatal_step<R: ContainerRuntime + ?Sized>(runtime: &R, cmd: &RuntimeCommand) -> Option<i32> {
    match runtime.execute(cmd) {
        Ok(outcome) => outcome.exit_code,
        Err(e) => {
            error!("{e:#}");
            None
        }
    }
}
