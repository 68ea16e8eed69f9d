//! Error types
//!
//! Defines domain-specific error types for each part of the checker and the service.

use std::fmt;
use std::io;
use std::time::Duration;

use crate::protocol::Reply;
use crate::status::Status;

/// Transport and framing errors on a single checker connection
#[derive(Debug)]
pub enum WireError {
    Refused { addr: String, source: io::Error },
    ConnectTimeout { addr: String, after: Duration },
    Timeout(Duration),
    Io(io::Error),
    /// `received` is `None` when the peer closed the connection instead.
    UnexpectedReply {
        expected: Reply,
        received: Option<String>,
    },
}

impl WireError {
    /// True for errors where the peer answered, but not with what the protocol requires.
    pub fn is_protocol(&self) -> bool {
        matches!(self, WireError::UnexpectedReply { .. })
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Refused { addr, source } => {
                write!(f, "Connection to {} refused: {}", addr, source)
            }
            WireError::ConnectTimeout { addr, after } => {
                write!(f, "Connection to {} timed out after {:?}", addr, after)
            }
            WireError::Timeout(after) => write!(f, "No data from service within {:?}", after),
            WireError::Io(e) => write!(f, "I/O error: {}", e),
            WireError::UnexpectedReply {
                expected,
                received: Some(line),
            } => write!(f, "Expected {}, got {:?}", expected, line),
            WireError::UnexpectedReply {
                expected,
                received: None,
            } => write!(f, "Expected {}, connection closed", expected),
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WireError::Refused { source, .. } => Some(source),
            WireError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WireError {
    fn from(error: io::Error) -> Self {
        WireError::Io(error)
    }
}

/// Malformed `login:password` state tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateTokenError {
    MissingSeparator,
    ExtraSeparator,
    Unframeable(String),
}

impl fmt::Display for StateTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateTokenError::MissingSeparator => write!(f, "State has no ':' separator"),
            StateTokenError::ExtraSeparator => write!(f, "State has more than one ':' separator"),
            StateTokenError::Unframeable(s) => {
                write!(f, "State contains a line terminator: {:?}", s)
            }
        }
    }
}

impl std::error::Error for StateTokenError {}

/// Service-side authentication errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    UserNotFound(String),
    InvalidPassword(String),
    UserExists(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::UserNotFound(u) => write!(f, "User not found: {}", u),
            AuthError::InvalidPassword(u) => write!(f, "Invalid password for user: {}", u),
            AuthError::UserExists(u) => write!(f, "User already registered: {}", u),
        }
    }
}

impl std::error::Error for AuthError {}

/// Classified checker failure
#[derive(Debug)]
pub enum CheckerError {
    Down(WireError),
    Mumble(WireError),
    Corrupt(WireError),
    /// The service answered GET with NOOK.
    FlagMissing,
    MalformedFlag(String),
    Mismatch { sent: String, received: String },
    InvalidState(StateTokenError),
    InvalidFlag(String),
}

impl CheckerError {
    /// Reclassifies a protocol mismatch as CORRUPT, leaving transport errors as they are.
    pub fn corrupt_on_mismatch(error: WireError) -> Self {
        if error.is_protocol() {
            CheckerError::Corrupt(error)
        } else {
            CheckerError::from(error)
        }
    }

    /// The service health this error implies, or `None` for caller misuse.
    pub fn status(&self) -> Option<Status> {
        match self {
            CheckerError::Down(_) => Some(Status::Down),
            CheckerError::Mumble(_) | CheckerError::Mismatch { .. } => Some(Status::Mumble),
            CheckerError::Corrupt(_)
            | CheckerError::FlagMissing
            | CheckerError::MalformedFlag(_) => Some(Status::Corrupt),
            CheckerError::InvalidState(_) | CheckerError::InvalidFlag(_) => None,
        }
    }
}

impl fmt::Display for CheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerError::Down(e) => write!(f, "Service down: {}", e),
            CheckerError::Mumble(e) => write!(f, "Service mumble: {}", e),
            CheckerError::Corrupt(e) => write!(f, "Service corrupt: {}", e),
            CheckerError::FlagMissing => write!(f, "Service corrupt: no flag stored"),
            CheckerError::MalformedFlag(s) => {
                write!(f, "Service corrupt: malformed flag reply {:?}", s)
            }
            CheckerError::Mismatch { sent, received } => write!(
                f,
                "Service mumble: stored {:?} but read back {:?}",
                sent, received
            ),
            CheckerError::InvalidState(e) => write!(f, "Invalid state: {}", e),
            CheckerError::InvalidFlag(s) => write!(f, "Invalid flag: {:?}", s),
        }
    }
}

impl std::error::Error for CheckerError {}

/// Refused or unreachable is DOWN; everything else on the wire is MUMBLE.
impl From<WireError> for CheckerError {
    fn from(error: WireError) -> Self {
        match error {
            WireError::Refused { .. } | WireError::ConnectTimeout { .. } => {
                CheckerError::Down(error)
            }
            _ => CheckerError::Mumble(error),
        }
    }
}

impl From<StateTokenError> for CheckerError {
    fn from(error: StateTokenError) -> Self {
        CheckerError::InvalidState(error)
    }
}

/// Reference service errors
#[derive(Debug)]
pub enum ServiceError {
    Bind { addr: String, source: io::Error },
    Io(io::Error),
    SessionTimeout(Duration),
    QueueClosed,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Bind { addr, source } => {
                write!(f, "Failed to bind to {}: {}", addr, source)
            }
            ServiceError::Io(e) => write!(f, "I/O error: {}", e),
            ServiceError::SessionTimeout(after) => {
                write!(f, "Session exceeded {:?}", after)
            }
            ServiceError::QueueClosed => write!(f, "Connection queue closed"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<io::Error> for ServiceError {
    fn from(error: io::Error) -> Self {
        ServiceError::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refused() -> WireError {
        WireError::Refused {
            addr: "127.0.0.1:1".into(),
            source: io::Error::from(io::ErrorKind::ConnectionRefused),
        }
    }

    fn closed() -> WireError {
        WireError::UnexpectedReply {
            expected: Reply::Ok,
            received: None,
        }
    }

    #[test]
    fn test_default_classification() {
        assert_eq!(CheckerError::from(refused()).status(), Some(Status::Down));
        assert_eq!(CheckerError::from(closed()).status(), Some(Status::Mumble));
        let timeout = WireError::Timeout(Duration::from_secs(1));
        assert_eq!(CheckerError::from(timeout).status(), Some(Status::Mumble));
    }

    #[test]
    fn test_corrupt_on_mismatch_keeps_transport_errors() {
        let e = CheckerError::corrupt_on_mismatch(closed());
        assert_eq!(e.status(), Some(Status::Corrupt));

        let e = CheckerError::corrupt_on_mismatch(WireError::Timeout(Duration::from_secs(1)));
        assert_eq!(e.status(), Some(Status::Mumble));
    }

    #[test]
    fn test_invocation_errors_have_no_status() {
        let e = CheckerError::from(StateTokenError::MissingSeparator);
        assert_eq!(e.status(), None);
        assert_eq!(CheckerError::InvalidFlag("a\nb".into()).status(), None);
    }

    #[test]
    fn test_display_unexpected_reply() {
        let e = WireError::UnexpectedReply {
            expected: Reply::Ok,
            received: Some("EXIST".into()),
        };
        assert_eq!(e.to_string(), "Expected OK, got \"EXIST\"");
        assert_eq!(closed().to_string(), "Expected OK, connection closed");
    }
}
