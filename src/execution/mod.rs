//! Execution driver: launch the built program under the configured launcher.

use std::{
    io,
    path::{Path, PathBuf},
    process::ExitStatus,
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{Config, ConfigError, MPIEXEC, MPIEXECFLAGS},
    printer::Console,
    process::{open_log, ToolCommand},
    workspace::Workspace,
};

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot launch `{tool}` for {}: {source}", program.display())]
    Spawn {
        tool: String,
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open execution log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub log: PathBuf,
    pub elapsed: Duration,
    /// Exit status of the launcher. Informational only.
    pub status: ExitStatus,
}

impl ExecutionReport {
    pub fn timing_line(&self) -> String {
        format!(
            "Execution of the program took {} seconds",
            format_scientific(self.elapsed.as_secs_f64())
        )
    }
}

pub struct Runner<'a> {
    cfg: &'a Config,
    workspace: &'a Workspace,
}

impl<'a> Runner<'a> {
    pub fn new(cfg: &'a Config, workspace: &'a Workspace) -> Self {
        Self { cfg, workspace }
    }

    pub fn command(&self, program: &Path, args: &[String]) -> Result<ToolCommand, ExecuteError> {
        Ok(ToolCommand::new(self.cfg.require(MPIEXEC)?)
            .args(self.cfg.flags(MPIEXECFLAGS)?)
            .arg(program)
            .args(args.iter().cloned()))
    }

    /// Run `program`, replay its log, then print the elapsed time.
    pub async fn run(
        &self,
        program: &Path,
        args: &[String],
        console: &mut Console,
    ) -> Result<ExecutionReport, ExecuteError> {
        let cmd = self.command(program, args)?;
        let log_path = self.workspace.exec_log();
        let log = open_log(&log_path).map_err(|source| ExecuteError::Log {
            path: log_path.clone(),
            source,
        })?;

        if self.cfg.is_verbose() {
            console.notice(&format!("Running: {}", cmd.display()));
        }

        let started = Instant::now();
        let status = cmd
            .run_logged(&log, &self.workspace.child_env())
            .await
            .map_err(|source| ExecuteError::Spawn {
                tool: cmd.program().to_string_lossy().into_owned(),
                program: program.to_path_buf(),
                source,
            })?;
        let elapsed = started.elapsed();
        drop(log);

        if status.success() {
            info!(program = %program.display(), ?elapsed, "program finished");
        } else {
            warn!(program = %program.display(), code = ?status.code(), "program exited unsuccessfully");
        }

        let report = ExecutionReport { log: log_path, elapsed, status };
        if let Err(e) = console.replay(&report.log) {
            console.error(&format!("cannot replay {}: {e}", report.log.display()));
        }
        console.line(&report.timing_line());
        Ok(report)
    }
}

/// Scientific notation with four decimals and a signed two-digit exponent,
/// e.g. `1.2346E-03`.
pub fn format_scientific(value: f64) -> String {
    let raw = format!("{:.4E}", value);
    match raw.split_once('E') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}E{sign}{:02}", exp.abs())
            }
            Err(_) => raw,
        },
        None => raw,
    }
}
