//! Docagram CLI - extract entity relationships from text and draw them.

use clap::Parser;
use docagram_cli::repl;
use docagram_cli::{Cli, Command, Config, Formatter, Session};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> docagram_cli::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    let mut config = match config_path {
        Some(path) => Config::load(Some(path))?,
        None => Config::load(None).unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            let cfg = Config::default();
            cfg.save(None).ok();
            cfg
        }),
    };

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let session_path = match cli.session {
        Some(path) => path,
        None => Config::session_path()?,
    };
    let mut session = Session::load(session_path)?;

    match cli.command {
        None | Some(Command::Repl) => {
            repl::run_repl(&mut session, &mut config, config_path, &formatter).await?;
        }
        Some(cmd) => {
            repl::execute_command(cmd, &mut session, &mut config, config_path, &formatter).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
