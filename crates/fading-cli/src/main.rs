//! wifi-fading entry point

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fading_cli::{commands, AppConfig, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = AppConfig::load(cli.config.as_deref())?;
            commands::run(config, args).await?;
        }
        Commands::Classify(args) => {
            let config = AppConfig::load(cli.config.as_deref())?;
            commands::classify(&config, &args).await?;
        }
        Commands::Version => {
            println!("wifi-fading {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
