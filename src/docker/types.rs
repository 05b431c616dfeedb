use anyhow::Result;

/// Where a runtime command's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Discard everything; only the exit code matters.
    Quiet,
    /// Keep stdout, discard stderr (`2> /dev/null`).
    StdoutOnly,
    /// Stream straight to the user's terminal.
    Inherit,
}

/// One invocation of the runtime program. `args` excludes the program name
/// itself (the launcher layer is responsible for assembling it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCommand {
    pub args: Vec<String>,
    pub output: OutputMode,
}

impl RuntimeCommand {
    pub fn quiet<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            output: OutputMode::Quiet,
        }
    }

    pub fn stdout_only<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            output: OutputMode::StdoutOnly,
        }
    }

    pub fn inherit<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            output: OutputMode::Inherit,
        }
    }

    /// Shell-quoted rendering, prefixed with `program`.
    pub fn display(&self, program: &str) -> String {
        let mut words = Vec::with_capacity(self.args.len() + 1);
        words.push(program);
        words.extend(self.args.iter().map(String::as_str));
        shell_words::join(words)
    }
}

/// How a runtime command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// The container runtime, seen only through its command surface.
pub trait ContainerRuntime {
    /// Program name, used for display (`docker`, `podman`).
    fn program(&self) -> &str;

    /// Run `cmd` to completion. `Err` means the process could not be
    /// started at all; a non-zero exit is still `Ok`.
    fn execute(&self, cmd: &RuntimeCommand) -> Result<CommandOutcome>;
}
