//! Types for the runner module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Resolved location of the chdman executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutableLocation {
    path: PathBuf,
    verified: bool,
}

impl ExecutableLocation {
    /// A location confirmed to point at an executable file.
    pub fn verified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verified: true,
        }
    }

    /// A location taken as entered, without any filesystem check.
    pub fn unverified(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            verified: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

/// One decoded line of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputLine {
    /// Line text without its terminator.
    pub text: String,
    /// Parsed progress fraction, if the line carried one.
    pub progress: Option<f64>,
}

impl OutputLine {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let progress = crate::progress::parse_percent(&text);
        Self { text, progress }
    }
}
