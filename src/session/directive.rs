//! The `;`-separated flag line that accompanies a cell.

use clap::Parser;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid directive: {0}")]
pub struct DirectiveError(#[from] clap::Error);

#[derive(Parser, Debug, Clone)]
#[command(name = "directive", no_binary_name = true, disable_help_flag = true)]
struct DirectiveArgs {
    /// Inline configuration overrides (`KEY=value:KEY=value`).
    #[arg(long, default_value = "")]
    sysargs: String,

    /// Program arguments as one whitespace-separated string.
    #[arg(long, default_value = "")]
    pargs: String,

    /// A single program argument; may be repeated.
    #[arg(long = "arg", allow_hyphen_values = true)]
    arg: Vec<String>,

    /// Echo every tool invocation.
    #[arg(long)]
    verbose: bool,
}

/// Parsed directive: overrides, program argv and verbosity for one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directive {
    pub overrides: String,
    pub program_args: Vec<String>,
    pub verbose: bool,
}

impl Directive {
    pub fn parse(line: &str) -> Result<Self, DirectiveError> {
        let tokens = line
            .split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let args = DirectiveArgs::try_parse_from(tokens)?;

        let mut program_args: Vec<String> =
            args.pargs.split_whitespace().map(str::to_string).collect();
        program_args.extend(args.arg);

        Ok(Self {
            overrides: args.sysargs,
            program_args,
            verbose: args.verbose,
        })
    }

    /// Append more overrides; later ones win.
    pub fn push_overrides(&mut self, more: &str) {
        if more.is_empty() {
            return;
        }
        if !self.overrides.is_empty() {
            self.overrides.push(':');
        }
        self.overrides.push_str(more);
    }
}
