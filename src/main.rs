use clap::Parser;
use docchat::cli::handle_ask;
use docchat::cli::handle_chat;
use docchat::cli::handle_config_command;
use docchat::cli::handle_serve_api;
use docchat::cli::Cli;
use docchat::cli::Commands;
use docchat::config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration; a missing credential stops here
    let config = AppConfig::load_from(cli.config.as_deref())?;

    // Initialize logging
    if cli.verbose {
        docchat::logging::init_logging_with_level("debug")?;
    } else {
        docchat::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => {
            handle_serve_api(&config, host, port, cors).await?;
        }
        Commands::Chat { files } => {
            handle_chat(&config, &files).await?;
        }
        Commands::Ask {
            question,
            files,
            sources,
        } => {
            handle_ask(&config, &files, &question, sources).await?;
        }
        Commands::Config => {
            handle_config_command(&config)?;
        }
    }

    Ok(())
}
