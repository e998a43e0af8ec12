// ABOUTME: Bounded execution of external cluster tools.
// ABOUTME: Captures stdout/stderr and kills the child when its deadline passes.

use snafu::{ResultExt, Snafu};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Failure to run a command at all. A command that runs and exits non-zero
/// is reported through [`CommandOutput::success`] instead.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("failed to execute {program}: {source}"))]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} did not finish within {}s", timeout.as_secs()))]
    TimedOut { program: String, timeout: Duration },
}

/// Captured result of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// stderr if the command wrote any, otherwise stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }

    /// Whether either stream mentions `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.stdout.contains(needle) || self.stderr.contains(needle)
    }
}

/// Run `program` with `args`, waiting at most `timeout`.
pub async fn run_command(
    program: &Path,
    args: &[String],
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let program_name = program.display().to_string();
    tracing::debug!(program = %program_name, ?args, "running command");

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(result) => result.context(SpawnSnafu {
            program: program_name.clone(),
        })?,
        Err(_elapsed) => {
            tracing::warn!(program = %program_name, timeout_secs = timeout.as_secs(), "command timed out");
            return TimedOutSnafu {
                program: program_name,
                timeout,
            }
            .fail();
        }
    };

    let result = CommandOutput {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    };

    if !result.success {
        tracing::debug!(
            program = %program_name,
            exit_code = ?result.exit_code,
            stderr = %result.stderr.trim(),
            "command exited unsuccessfully"
        );
    }

    Ok(result)
}
