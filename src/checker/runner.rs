//! Checker runner
//!
//! Runs a checker executable for a scheduler: passes the role arguments,
//! captures the result line and the logs, enforces a wall-clock limit and
//! classifies the exit status.

use log::{debug, warn};
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::checker::{Action, Target};
use crate::config::RunnerConfig;
use crate::status::{Status, Verdict, classify_exit};

#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Standard output with surrounding spaces and newlines removed:
    /// the state token after `put`, the flag after `get`.
    pub stdout: String,
    /// Standard error, where checkers write their logs.
    pub logs: String,
    pub verdict: Verdict,
}

impl RunOutput {
    pub fn status(&self) -> Option<Status> {
        match self.verdict {
            Verdict::Service(status) => Some(status),
            _ => None,
        }
    }
}

/// Runs `program` for one role against `target`.
///
/// A checker still running after `config.timeout()` is killed and the
/// service is reported DOWN. Failing to start the program is an error.
pub async fn run_checker(
    program: &Path,
    target: &Target,
    action: &Action,
    config: &RunnerConfig,
) -> io::Result<RunOutput> {
    let timeout = config.timeout();
    let args = action.to_args(target);
    debug!("Running {} {:?}", program.display(), args);

    let child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            warn!(
                "Checker {} {} exceeded {:?}, killed",
                program.display(),
                action.name(),
                timeout
            );
            return Ok(RunOutput {
                stdout: String::new(),
                logs: String::new(),
                verdict: Verdict::Service(Status::Down),
            });
        }
    };

    let verdict = classify_exit(output.status.code());
    debug!("Checker {} exited with {:?}", action.name(), verdict);

    Ok(RunOutput {
        stdout: String::from_utf8_lossy(&output.stdout)
            .trim_matches([' ', '\n'])
            .to_string(),
        logs: String::from_utf8_lossy(&output.stderr).into_owned(),
        verdict,
    })
}
