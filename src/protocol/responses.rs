//! Acknowledgement tokens
//!
//! Replies the service sends between steps of a sub-protocol.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Nook,
    Exist,
    Incorrect,
}

impl Reply {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reply::Ok => "OK",
            Reply::Nook => "NOOK",
            Reply::Exist => "EXIST",
            Reply::Incorrect => "INCORRECT",
        }
    }

    /// Exact token match against a received line.
    pub fn parse(line: &str) -> Option<Reply> {
        match line {
            "OK" => Some(Reply::Ok),
            "NOOK" => Some(Reply::Nook),
            "EXIST" => Some(Reply::Exist),
            "INCORRECT" => Some(Reply::Incorrect),
            _ => None,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful GET: the flag line followed by `OK`.
pub fn format_flag_reply(flag: &str) -> String {
    format!("{}\n{}", flag, Reply::Ok)
}
