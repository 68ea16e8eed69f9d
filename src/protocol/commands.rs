//! Module `commands`
//!
//! Top-level command tokens a client may open a connection with.

use std::fmt;

/// A top-level command, the first line of every connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Reg,
    Put,
    Get,
    Fault(FaultCommand),
    Unknown(String), // Anything else, replied to with NOOK
}

/// Test-only commands that flip service state instead of serving a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCommand {
    Clear,
    RegFail,
    RegOk,
    DataFail,
    Sleep,
}

impl FaultCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultCommand::Clear => "CLEAR",
            FaultCommand::RegFail => "REGFAIL",
            FaultCommand::RegOk => "REGOK",
            FaultCommand::DataFail => "DATAFAIL",
            FaultCommand::Sleep => "SLEEP",
        }
    }
}

impl fmt::Display for FaultCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Command {
    pub fn as_str(&self) -> &str {
        match self {
            Command::Reg => "REG",
            Command::Put => "PUT",
            Command::Get => "GET",
            Command::Fault(fault) => fault.as_str(),
            Command::Unknown(raw) => raw,
        }
    }
}

/// Parses a command line with its terminator already removed.
///
/// Matching is exact and case-sensitive: `reg` or `REG ` are unknown commands.
pub fn parse_command(raw: &str) -> Command {
    match raw {
        "REG" => Command::Reg,
        "PUT" => Command::Put,
        "GET" => Command::Get,
        "CLEAR" => Command::Fault(FaultCommand::Clear),
        "REGFAIL" => Command::Fault(FaultCommand::RegFail),
        "REGOK" => Command::Fault(FaultCommand::RegOk),
        "DATAFAIL" => Command::Fault(FaultCommand::DataFail),
        "SLEEP" => Command::Fault(FaultCommand::Sleep),
        other => Command::Unknown(other.to_string()),
    }
}
