//! Run directory preparation and per-invocation process environment.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::{
    build::Language,
    config::{Config, ConfigError, OMP_NUM_THREADS, RUN_DIR},
};

pub const COMPILE_LOG: &str = "compile.log";
pub const EXEC_LOG: &str = "exec.log";
const SOURCE_STEM: &str = "code";

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot create run directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write source file {}: {source}", path.display())]
    WriteSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct Workspace {
    run_dir: PathBuf,
    thread_count: String,
}

impl Workspace {
    /// Create the run directory and capture the thread count for child processes.
    pub fn prepare(cfg: &Config) -> Result<Self, WorkspaceError> {
        let run_dir = PathBuf::from(cfg.require(RUN_DIR)?);
        let thread_count = cfg.require(OMP_NUM_THREADS)?.trim().to_string();

        fs::create_dir_all(&run_dir).map_err(|source| WorkspaceError::CreateDir {
            path: run_dir.clone(),
            source,
        })?;
        debug!(run_dir = %run_dir.display(), threads = %thread_count, "workspace ready");

        Ok(Self { run_dir, thread_count })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    pub fn thread_count(&self) -> &str {
        &self.thread_count
    }

    /// Environment overrides applied to every spawned tool.
    pub fn child_env(&self) -> [(&'static str, &str); 1] {
        [(OMP_NUM_THREADS, self.thread_count.as_str())]
    }

    pub fn source_path(&self, language: Language) -> PathBuf {
        self.run_dir
            .join(format!("{SOURCE_STEM}.{}", language.extension()))
    }

    /// Write cell text verbatim to `code.<ext>` in the run directory.
    pub fn write_source(&self, language: Language, text: &str) -> Result<PathBuf, WorkspaceError> {
        let path = self.source_path(language);
        fs::write(&path, text).map_err(|source| WorkspaceError::WriteSource {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    pub fn compile_log(&self) -> PathBuf {
        self.run_dir.join(COMPILE_LOG)
    }

    pub fn exec_log(&self) -> PathBuf {
        self.run_dir.join(EXEC_LOG)
    }
}
