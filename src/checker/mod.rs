//! Checker
//!
//! Drives the put/get/chk roles against a remote service and turns their
//! outcome into a process exit code. Also runs checker executables on
//! behalf of a scheduler and classifies how they exited.

pub mod connection;
pub mod driver;
pub mod runner;

pub use driver::{chk, get, put};
pub use runner::{RunOutput, run_checker};

use std::fmt;

use crate::config::CheckerConfig;
use crate::error::CheckerError;
use crate::error::handlers::{error_to_exit_code, handle_error};

/// Address of the checked service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn socket_addr(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// A checker role with its role-specific argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Put { flag: String },
    Get { state: String },
    Chk,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Put { .. } => "put",
            Action::Get { .. } => "get",
            Action::Chk => "chk",
        }
    }

    /// Command-line arguments for a checker executable.
    pub fn to_args(&self, target: &Target) -> Vec<String> {
        let mut args = vec![
            self.name().to_string(),
            target.host.clone(),
            target.port.to_string(),
        ];
        match self {
            Action::Put { flag } => args.push(flag.clone()),
            Action::Get { state } => args.push(state.clone()),
            Action::Chk => {}
        }
        args
    }
}

/// Runs one role. `put` yields the state token, `get` the flag, `chk` nothing.
pub async fn run_action(
    target: &Target,
    action: &Action,
    config: &CheckerConfig,
) -> Result<Option<String>, CheckerError> {
    match action {
        Action::Put { flag } => Ok(Some(put(target, flag, config).await?.to_string())),
        Action::Get { state } => Ok(Some(get(target, state, config).await?)),
        Action::Chk => chk(target, config).await.map(|()| None),
    }
}

/// Runs one role, prints its result to stdout and returns the exit code.
pub async fn dispatch(target: &Target, action: &Action, config: &CheckerConfig) -> i32 {
    match run_action(target, action, config).await {
        Ok(output) => {
            if let Some(value) = output {
                println!("{}", value);
            }
            0
        }
        Err(e) => {
            handle_error(&e);
            error_to_exit_code(&e)
        }
    }
}
