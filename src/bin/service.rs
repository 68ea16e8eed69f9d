//! Reference Service - Entry Point
//!
//! `service [PORT]`: serves the flag storage protocol from memory until Ctrl-C.

use clap::Parser;
use log::{error, info};

use flagkeeper::Server;
use flagkeeper::config::{DEFAULT_CONFIG_PATH, Settings};

#[derive(Parser, Debug)]
#[command(name = "service")]
#[command(version)]
#[command(about = "Reference flag storage service with fault injection", long_about = None)]
struct CliArgs {
    /// Port to listen on (overrides service.port)
    port: Option<u16>,

    /// Configuration file (TOML); missing file means defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = CliArgs::parse();
    let mut settings = Settings::load(&cli.config)?;
    if let Some(port) = cli.port {
        settings.service.port = port;
    }

    info!("Launching reference service...");
    let server = Server::bind(settings.service).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = &result {
                error!("Service stopped: {}", e);
            }
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
