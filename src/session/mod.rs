//! One cell invocation: resolve configuration, prepare the run directory,
//! build, then run.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    build::{Builder, Language},
    config::{Config, ConfigError, VERBOSE},
    execution::{ExecutionReport, Runner},
    printer::Console,
    workspace::Workspace,
};

mod directive;

pub use directive::{Directive, DirectiveError};

#[derive(Debug)]
pub enum Outcome {
    /// Configuration, directive or workspace failure; nothing was built.
    Aborted,
    BuildFailed,
    /// The launcher could not be started.
    RunFailed,
    Ran(ExecutionReport),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Ran(_) => 0,
            Outcome::BuildFailed | Outcome::RunFailed => 1,
            Outcome::Aborted => 2,
        }
    }
}

pub struct Session {
    config_path: PathBuf,
    console: Console,
}

impl Session {
    pub fn new(config_path: impl Into<PathBuf>, console: Console) -> Self {
        Self { config_path: config_path.into(), console }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn console(&mut self) -> &mut Console {
        &mut self.console
    }

    /// Fresh configuration: file, then environment, then the directive.
    pub fn resolve_config(&self, directive: &Directive) -> Result<Config, ConfigError> {
        let mut cfg = Config::load(&self.config_path)?;
        cfg.overlay_environment();

        let report = cfg.apply_overrides(&directive.overrides);
        for token in &report.rejected {
            warn!(token = %token, "ignoring malformed override");
        }
        if !report.applied.is_empty() {
            debug!(keys = ?report.applied, "applied inline overrides");
        }
        if directive.verbose {
            cfg.set(VERBOSE, "yes");
        }
        Ok(cfg)
    }

    /// Handle a notebook cell given its raw directive line.
    pub async fn handle_cell(&mut self, line: &str, source: &str, language: Language) -> Outcome {
        match Directive::parse(line) {
            Ok(directive) => self.run_cell(&directive, source, language).await,
            Err(e) => {
                self.console.error(&e.to_string());
                Outcome::Aborted
            }
        }
    }

    /// Write `source` to `code.<ext>` in the run directory, build and run it.
    pub async fn run_cell(&mut self, directive: &Directive, source: &str, language: Language) -> Outcome {
        let Some((cfg, workspace)) = self.prepare(directive) else {
            return Outcome::Aborted;
        };
        let path = match workspace.write_source(language, source) {
            Ok(path) => path,
            Err(e) => {
                self.console.error(&e.to_string());
                return Outcome::Aborted;
            }
        };
        self.build_and_run(&cfg, &workspace, vec![path], &directive.program_args)
            .await
    }

    /// Build existing source files in the given order and run the result.
    pub async fn run_files(&mut self, directive: &Directive, files: &[PathBuf]) -> Outcome {
        let Some((cfg, workspace)) = self.prepare(directive) else {
            return Outcome::Aborted;
        };
        self.build_and_run(&cfg, &workspace, files.to_vec(), &directive.program_args)
            .await
    }

    fn prepare(&mut self, directive: &Directive) -> Option<(Config, Workspace)> {
        let cfg = match self.resolve_config(directive) {
            Ok(cfg) => cfg,
            Err(e) => {
                self.console.error(&e.to_string());
                return None;
            }
        };
        match Workspace::prepare(&cfg) {
            Ok(ws) => Some((cfg, ws)),
            Err(e) => {
                self.console.error(&e.to_string());
                None
            }
        }
    }

    async fn build_and_run(
        &mut self,
        cfg: &Config,
        workspace: &Workspace,
        files: Vec<PathBuf>,
        args: &[String],
    ) -> Outcome {
        let builder = Builder::new(cfg, workspace);
        let Some(program) = builder.build_files(files, &mut self.console).await else {
            return Outcome::BuildFailed;
        };

        match Runner::new(cfg, workspace).run(&program, args, &mut self.console).await {
            Ok(report) => {
                if !report.status.success() {
                    let code = report
                        .status
                        .code()
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| "signal".to_string());
                    self.console.line(&format!("Program exited with status {code}"));
                }
                Outcome::Ran(report)
            }
            Err(e) => {
                self.console.error(&e.to_string());
                Outcome::RunFailed
            }
        }
    }
}
