pub mod auth;
pub mod checker;
pub mod config;
pub mod error;
pub mod protocol;
pub mod service;
pub mod status;

pub use checker::{Action, Target};
pub use service::Server;
pub use status::Status;
