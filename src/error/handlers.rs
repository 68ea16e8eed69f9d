//! Error handlers
//!
//! Maps classified checker failures onto process exit codes.

use crate::error::types::CheckerError;
use crate::status::CHECKER_ERROR_EXIT_CODE;
use log::error;

/// Log a checker failure
pub fn handle_error(err: &CheckerError) {
    match err.status() {
        Some(status) => error!("{}: {}", status, err),
        None => error!("Checker error: {}", err),
    }
}

/// Convert a checker failure to its process exit code
pub fn error_to_exit_code(err: &CheckerError) -> i32 {
    err.status()
        .map(|status| status.exit_code())
        .unwrap_or(CHECKER_ERROR_EXIT_CODE)
}
