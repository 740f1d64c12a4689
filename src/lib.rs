//! Compile, link and launch inline C, C++ and Fortran cells through external
//! toolchains and an MPI launcher.

pub mod build;
pub mod config;
pub mod execution;
pub mod printer;
pub mod process;
pub mod session;
pub mod workspace;

pub use build::{BuildError, BuildRequest, Builder, Language};
pub use config::{Config, ConfigError, OverrideReport};
pub use execution::{ExecuteError, ExecutionReport, Runner};
pub use printer::Console;
pub use session::{Directive, DirectiveError, Outcome, Session};
pub use workspace::{Workspace, WorkspaceError};
