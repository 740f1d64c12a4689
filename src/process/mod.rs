//! External tool invocation: argv assembly, log redirection and env injection.

use std::{
    ffi::OsString,
    fs::File,
    io,
    path::Path,
    process::{ExitStatus, Stdio},
};

use tokio::process::Command;
use tracing::debug;

/// An argument vector for one external tool run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ToolCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    /// Space-joined form used for verbose echoes.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion with stdout and stderr both appended to `log`.
    ///
    /// `env` entries are added on top of the inherited environment of this
    /// child only.
    pub async fn run_logged(&self, log: &File, env: &[(&str, &str)]) -> io::Result<ExitStatus> {
        let stdout = log.try_clone()?;
        let stderr = log.try_clone()?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .envs(env.iter().copied())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr));

        debug!(cmd = %self.display(), "spawning tool");
        let status = command.status().await?;
        debug!(cmd = %self.display(), code = ?status.code(), "tool finished");
        Ok(status)
    }
}

/// Create (truncating) a log file that several tool runs append to in turn.
pub fn open_log(path: &Path) -> io::Result<File> {
    File::create(path)
}
