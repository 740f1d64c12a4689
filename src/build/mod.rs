//! Build driver: sequential compile of every source, then one link step.

use std::{
    fmt, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::{Config, ConfigError, LINKER, POSTLINKFLAGS, PRELINKFLAGS},
    printer::Console,
    process::{open_log, ToolCommand},
    workspace::Workspace,
};

mod request;

pub use request::{BuildRequest, Language, SourceFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compile,
    Link,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compile => "compiling",
            Stage::Link => "linking",
        })
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no source files to build")]
    NoSources,

    #[error("cannot determine language of {}", .0.display())]
    UnknownLanguage(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Error in {stage} file {}: {}", file.display(), describe_exit(*code))]
    ToolFailed {
        stage: Stage,
        file: PathBuf,
        code: Option<i32>,
    },

    #[error("Error in {stage} file {}: cannot launch `{tool}`: {source}", file.display())]
    Spawn {
        stage: Stage,
        tool: String,
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot open compile log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BuildError {
    /// Exit code of the failing tool, when one ran and exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::ToolFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "terminated by signal".to_string(),
    }
}

pub struct Builder<'a> {
    cfg: &'a Config,
    workspace: &'a Workspace,
}

impl<'a> Builder<'a> {
    pub fn new(cfg: &'a Config, workspace: &'a Workspace) -> Self {
        Self { cfg, workspace }
    }

    /// Compile every source in order, then link. Stops at the first failure.
    pub async fn compile_and_link(
        &self,
        request: &BuildRequest,
        console: &mut Console,
    ) -> Result<PathBuf, BuildError> {
        let log_path = self.workspace.compile_log();
        let log = open_log(&log_path).map_err(|source| BuildError::Log {
            path: log_path.clone(),
            source,
        })?;
        let verbose = self.cfg.is_verbose();
        let out_dir = self.workspace.run_dir();

        for source in request.sources() {
            let compiler = self.cfg.require(source.language.compiler_key())?;
            let flags = self.cfg.flags(source.language.flags_key())?;
            let cmd = ToolCommand::new(compiler)
                .args(flags)
                .arg("-c")
                .arg(&source.path)
                .arg("-o")
                .arg(source.object_path(out_dir));

            if verbose {
                console.notice(&format!("Compiling: {}", cmd.display()));
            }
            self.step(Stage::Compile, &cmd, &source.path, &log).await?;
        }

        let program = request.program_path(out_dir);
        let cmd = ToolCommand::new(self.cfg.require(LINKER)?)
            .args(self.cfg.flags(PRELINKFLAGS)?)
            .args(request.objects(out_dir))
            .arg("-o")
            .arg(&program)
            .args(self.cfg.flags(POSTLINKFLAGS)?);

        if verbose {
            console.notice(&format!("Linking: {}", cmd.display()));
        }
        self.step(Stage::Link, &cmd, &program, &log).await?;

        info!(program = %program.display(), "build succeeded");
        Ok(program)
    }

    /// Build and report. Errors are printed, never returned; the compile log
    /// is replayed in every case.
    pub async fn build(&self, request: &BuildRequest, console: &mut Console) -> Option<PathBuf> {
        let result = self.compile_and_link(request, console).await;
        self.report(result, console)
    }

    /// Validate `files` and build them. A rejected request still truncates
    /// the compile log, so a previous invocation's output is never replayed.
    pub async fn build_files<I, P>(&self, files: I, console: &mut Console) -> Option<PathBuf>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        match BuildRequest::new(files) {
            Ok(request) => self.build(&request, console).await,
            Err(e) => {
                let log_path = self.workspace.compile_log();
                if let Err(source) = open_log(&log_path) {
                    let err = BuildError::Log { path: log_path, source };
                    warn!(error = %err, "cannot truncate compile log");
                    console.error(&err.to_string());
                }
                self.report(Err(e), console)
            }
        }
    }

    fn report(&self, result: Result<PathBuf, BuildError>, console: &mut Console) -> Option<PathBuf> {
        if let Err(e) = &result {
            warn!(error = %e, "build failed");
            console.error(&e.to_string());
        }

        let log = self.workspace.compile_log();
        if log.exists() {
            if let Err(e) = console.replay(&log) {
                console.error(&format!("cannot replay {}: {e}", log.display()));
            }
        }

        result.ok()
    }

    async fn step(
        &self,
        stage: Stage,
        cmd: &ToolCommand,
        file: &Path,
        log: &std::fs::File,
    ) -> Result<(), BuildError> {
        debug!(%stage, file = %file.display(), "running build step");
        let status = cmd
            .run_logged(log, &self.workspace.child_env())
            .await
            .map_err(|source| BuildError::Spawn {
                stage,
                tool: cmd.program().to_string_lossy().into_owned(),
                file: file.to_path_buf(),
                source,
            })?;

        if !status.success() {
            return Err(BuildError::ToolFailed {
                stage,
                file: file.to_path_buf(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
