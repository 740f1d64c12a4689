use std::path::PathBuf;

use clap::Parser;
use hpcmagic::Language;

#[derive(Parser, Debug, Clone)]
#[command(name = "hpcmagic", about = "Compile and run C, C++ and Fortran cells", version)]
pub struct Cli {
    /// Source files to build, in order. The last one names the program.
    /// Without files the cell is read from stdin.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Arguments passed to the program, after `--`.
    #[arg(last = true, value_name = "PROGRAM_ARGS")]
    pub program_args: Vec<String>,

    /// Language of the cell read from stdin.
    #[arg(short = 'l', long = "lang", value_enum, default_value_t = Language::C)]
    pub lang: Language,

    /// Notebook directive line, e.g. "--sysargs=CC=gcc;--pargs=1 2".
    #[arg(short = 'd', long, default_value = "", allow_hyphen_values = true)]
    pub directive: String,

    /// Inline configuration overrides (KEY=value:KEY=value).
    #[arg(long, allow_hyphen_values = true)]
    pub sysargs: Option<String>,

    /// Echo every compile, link and launch command.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Configuration file (default: HPCMAGIC_CONFIG, then the user config directory).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write a configuration template and exit.
    #[arg(long = "init-config")]
    pub init_config: bool,

    /// Allow --init-config to overwrite an existing file.
    #[arg(long, requires = "init_config")]
    pub force: bool,

    /// Print the resolved configuration and exit.
    #[arg(long = "show-config", conflicts_with = "init_config")]
    pub show_config: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
