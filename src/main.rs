//! mangascore - Main Entry Point

use clap::Parser;
use mangascore::cli::{cmd_clean, cmd_featurize, cmd_info, cmd_run, cmd_user_init, resolve_config, Cli, Commands, RunArgs};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mangascore=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = || resolve_config(cli.config.as_deref(), cli.data_dir.as_deref());

    match &cli.command {
        Some(Commands::Run(args)) => cmd_run(&args.apply(config()?))?,
        Some(Commands::Clean { force }) => cmd_clean(&config()?, *force)?,
        Some(Commands::Featurize) => cmd_featurize(&config()?)?,
        Some(Commands::UserInit) => cmd_user_init(&config()?)?,
        Some(Commands::Info { data }) => cmd_info(data)?,
        None => cmd_run(&RunArgs::default().apply(config()?))?,
    }

    Ok(())
}
