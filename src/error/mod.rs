//! Error handling
//!
//! Defines error types and their mapping onto exit codes.

pub mod handlers;
pub mod types;

pub use types::*;
