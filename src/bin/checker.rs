//! Checker - Entry Point
//!
//! `checker put HOST PORT FLAG`, `checker get HOST PORT STATE`, `checker chk HOST PORT`.
//! Exit code 0 on success, 1 on misuse, otherwise the service status code.

use clap::{Parser, Subcommand};
use log::{error, info};

use flagkeeper::checker::{self, Action, Target};
use flagkeeper::config::{DEFAULT_CONFIG_PATH, Settings};
use flagkeeper::status::CHECKER_ERROR_EXIT_CODE;

#[derive(Parser, Debug)]
#[command(name = "checker")]
#[command(version)]
#[command(about = "Checks that a service stores and returns flags", long_about = None)]
struct CliArgs {
    /// Configuration file (TOML); missing file means defaults
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Put a flag into the service. Prints the state.
    Put { host: String, port: u16, flag: String },
    /// Get the flag for a state from the service. Prints the flag.
    Get { host: String, port: u16, state: String },
    /// Check availability and integrity of the service.
    Chk { host: String, port: u16 },
}

impl Role {
    fn into_parts(self) -> (Target, Action) {
        match self {
            Role::Put { host, port, flag } => (Target::new(host, port), Action::Put { flag }),
            Role::Get { host, port, state } => (Target::new(host, port), Action::Get { state }),
            Role::Chk { host, port } => (Target::new(host, port), Action::Chk),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match CliArgs::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { CHECKER_ERROR_EXIT_CODE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let settings = match Settings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(CHECKER_ERROR_EXIT_CODE);
        }
    };

    let (target, action) = cli.role.into_parts();
    info!("Running {} against {}", action.name(), target);

    let code = checker::dispatch(&target, &action, &settings.checker).await;
    std::process::exit(code);
}
