use std::io::IsTerminal;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Unpack RSB resource containers
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: rsb::commands::Commands,
}

/// Compact log lines, INFO unless `RUST_LOG` says otherwise
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let format = tracing_subscriber::fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .try_init()
        .into_diagnostic()
}

fn main() -> Result<()> {
    better_panic::install();

    let cli = Cli::parse();
    init_tracing()?;

    cli.command.handle()
}
