// ABOUTME: Driver error types with SNAFU pattern.
// ABOUTME: Separates "could not run the tool" from "the tool reported failure".

use snafu::Snafu;
use std::path::PathBuf;

use crate::process::{CommandError, CommandOutput};

/// Errors from infrastructure driver operations.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DriverError {
    #[snafu(display("{source}"))]
    Command { source: CommandError },

    #[snafu(display("{operation} failed: {}", output.diagnostic()))]
    Failed {
        operation: String,
        output: CommandOutput,
    },

    #[snafu(display("failed to write values file {}: {source}", path.display()))]
    ValuesFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to encode release values: {source}"))]
    ValuesEncode { source: serde_yaml::Error },

    #[snafu(display("release status is not valid JSON: {source}"))]
    StatusParse { source: serde_json::Error },
}

impl DriverError {
    /// Raw output captured from the tool, when it ran.
    pub fn raw_output(&self) -> Option<&CommandOutput> {
        match self {
            DriverError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }

    /// Whether the tool could not be reached at all (missing binary, deadline).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, DriverError::Command { .. })
    }
}

impl From<CommandError> for DriverError {
    fn from(source: CommandError) -> Self {
        DriverError::Command { source }
    }
}
