mod cli;

use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use hpcmagic::{
    config::{self, template},
    Console, Directive, Session,
};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "HPCMAGIC_LOG";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .without_time()
        .init();

    let args = cli::Cli::parse();

    if args.init_config {
        let path = args.config.clone().unwrap_or_else(config::user_config_path);
        template::write_template(&path, args.force)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Wrote configuration template to {}", path.display());
        return Ok(());
    }

    let config_path = config::discover_config_path(args.config.as_deref());

    // CLI flags layer on top of the directive line.
    let mut directive = Directive::parse(&args.directive)?;
    if let Some(extra) = args.sysargs.as_deref() {
        directive.push_overrides(extra);
    }
    directive.verbose |= args.verbose;
    directive.program_args.extend(args.program_args.iter().cloned());

    let mut session = Session::new(&config_path, Console::stdout());

    if args.show_config {
        let cfg = session.resolve_config(&directive)?;
        println!("# {}", config_path.display());
        for (k, v) in cfg.entries() {
            println!("{k} = {v}");
        }
        return Ok(());
    }

    println!("Using configfile at {}", config_path.display());

    let outcome = if args.files.is_empty() {
        if io::stdin().is_terminal() {
            bail!("no source files given and nothing piped on stdin");
        }
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        session.run_cell(&directive, &source, args.lang).await
    } else {
        session.run_files(&directive, &args.files).await
    };

    let code = outcome.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
