//! ExoNeural - Main Entry Point

use clap::Parser;
use exoneural::cli::{cmd_check, cmd_predict, cmd_serve, cmd_token, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG wins, then LOG_LEVEL
    let default_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.to_lowercase().into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port, host }) => {
            cmd_serve(host, port).await?;
        }
        Some(Commands::Predict { input, output, artifacts }) => {
            cmd_predict(&input, output.as_deref(), artifacts.as_deref())?;
        }
        Some(Commands::Check { artifacts }) => {
            cmd_check(artifacts.as_deref())?;
        }
        Some(Commands::Token { subject }) => {
            cmd_token(&subject)?;
        }
        None => {
            cmd_serve(None, None).await?;
        }
    }

    Ok(())
}
