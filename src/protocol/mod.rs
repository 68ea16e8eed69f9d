//! Wire protocol
//!
//! Newline-terminated UTF-8 tokens exchanged between the checker and the
//! service. Every read and write is an exact token match; higher layers
//! decide what a mismatch or a closed connection means.

pub mod commands;
pub mod responses;
pub mod wire;

pub use commands::{Command, FaultCommand, parse_command};
pub use responses::Reply;
pub use wire::{read_token, write_token};
