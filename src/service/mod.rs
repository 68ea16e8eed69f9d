//! Reference service
//!
//! A disposable in-memory implementation of the service side of the
//! protocol, with fault-injection hooks that force every checker status.

pub mod control;
pub mod core;
pub mod session;
pub mod state;

pub use control::send_fault_command;
pub use self::core::Server;
pub use session::{Session, SessionOutcome, handle_session};
pub use state::{FaultFlags, FlagStore, ServiceState};
