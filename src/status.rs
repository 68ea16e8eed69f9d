//! Status taxonomy
//!
//! The health classifications shared by the checker and whoever schedules
//! it, and their process exit code encoding.

use std::fmt;

/// Exit code for caller misuse: bad arguments, unknown role, malformed input.
pub const CHECKER_ERROR_EXIT_CODE: i32 = 1;

/// Exit code the external `timeout` wrapper reports when it kills a checker.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code of a remote launcher that could not reach its host.
pub const LAUNCHER_FAILURE_EXIT_CODE: i32 = 255;

/// Service health, ordered from healthy to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Ok,
    Mumble,
    Corrupt,
    Down,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Mumble => 2,
            Status::Corrupt => 3,
            Status::Down => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Mumble => "MUMBLE",
            Status::Corrupt => "CORRUPT",
            Status::Down => "DOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished checker process should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Service(Status),
    CheckerError,
    Unknown(Option<i32>),
}

/// Maps a checker process exit code to a verdict.
///
/// `None` means the process was terminated by a signal.
pub fn classify_exit(code: Option<i32>) -> Verdict {
    match code {
        Some(0) => Verdict::Service(Status::Ok),
        Some(CHECKER_ERROR_EXIT_CODE) | Some(LAUNCHER_FAILURE_EXIT_CODE) => Verdict::CheckerError,
        Some(2) => Verdict::Service(Status::Mumble),
        Some(3) => Verdict::Service(Status::Corrupt),
        Some(4) | Some(TIMEOUT_EXIT_CODE) => Verdict::Service(Status::Down),
        other => Verdict::Unknown(other),
    }
}
