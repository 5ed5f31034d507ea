use anyhow::Result;
use clap::Parser;
use organizer::cli::{Cli, Commands};
use organizer::{commands, App};
use organizer_core::OrganizerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let mut config = OrganizerConfig::default();
    if let Some(capacity) = cli.cache_capacity {
        config.cache_capacity = capacity;
    }
    config.clear_path_on_flat = cli.clear_path_on_flat;

    let app = App::load(&cli.settings, cli.categories.as_deref(), cli.evidence.as_deref(), config).await?;

    match cli.command {
        Commands::Hierarchy(args) => commands::handle_hierarchy(args, app).await?,
        Commands::Mode(args) => commands::handle_mode(args, app).await?,
        Commands::Browse(args) => commands::handle_browse(args, app).await?,
        Commands::Show(args) => commands::handle_show(args, app).await?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the verbosity flags.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
