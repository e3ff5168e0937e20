//! Error types for the runner module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running chdman.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configured executable does not exist or is not executable.
    #[error("chdman executable not found or not accessible at: {}", path.display())]
    ExecutableNotFound { path: PathBuf },

    /// The OS refused to launch the process.
    #[error("Failed to launch chdman: {0}")]
    Spawn(#[source] std::io::Error),

    /// I/O error while waiting on the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool ran and reported failure through its exit code.
    #[error("{}", exit_message(*code, tail))]
    ExitedNonZero { code: i32, tail: Vec<String> },
}

fn exit_message(code: i32, tail: &[String]) -> String {
    let context = tail.join("\n");
    if context.trim().is_empty() {
        format!("chdman exited with code {}", code)
    } else {
        format!("chdman error (exit code {}):\n{}", code, context)
    }
}

impl RunnerError {
    /// Creates a non-zero exit error from the captured output tail.
    pub fn exited(code: i32, tail: Vec<String>) -> Self {
        Self::ExitedNonZero { code, tail }
    }

    /// Exit code of the tool, if it ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExitedNonZero { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the failure is a configuration problem rather than a tool error.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(self, Self::ExecutableNotFound { .. })
    }

    /// Actionable guidance to show next to the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ExecutableNotFound { .. } => Some(
                "Make sure the chdman path is correct (it should end with /chdman), \
                 or run `chdrunner locate` to search the usual install locations.",
            ),
            Self::Spawn(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                Some("Permission denied while launching chdman; check the file mode and sandbox settings.")
            }
            _ => None,
        }
    }
}
