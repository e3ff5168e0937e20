//! Resolve a user-entered chdman path into an [`ExecutableLocation`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::runner::{check_executable, ExecutableLocation, EXTRA_SEARCH_DIRS};

/// File name of the tool.
pub const TOOL_NAME: &str = "chdman";

/// Install guidance shown when chdman could not be found anywhere.
pub const NOT_FOUND_HELP: &str = "\
chdman was not found.

1. Install MAME with Homebrew (chdman ships with it):
   brew install mame

2. After installation chdman should be at:
   /opt/homebrew/bin/chdman (Apple Silicon)
   /usr/local/bin/chdman (Intel)

3. Run `chdrunner locate` again, or set tool.path to the full path above.

Without Homebrew, install it first:
   /bin/bash -c \"$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)\"
then run `brew install mame`.";

/// Resolves `configured` against the filesystem and the process `PATH`.
///
/// An executable absolute path is taken as is. Otherwise the Homebrew
/// locations and then each `PATH` entry are probed. When nothing is found
/// the normalized input comes back unverified.
pub fn resolve(configured: &str) -> ExecutableLocation {
    let path_var = std::env::var_os("PATH");
    let candidates: Vec<PathBuf> = EXTRA_SEARCH_DIRS
        .iter()
        .map(|dir| Path::new(dir).join(TOOL_NAME))
        .collect();
    resolve_in(configured, &candidates, path_var.as_deref())
}

/// Trims whitespace and turns a bare `.../bin` directory into `.../bin/chdman`.
pub fn normalize(configured: &str) -> String {
    let trimmed = configured.trim();
    if trimmed.ends_with("/bin") || trimmed.ends_with("/bin/") {
        format!("{}/{}", trimmed.trim_end_matches('/'), TOOL_NAME)
    } else {
        trimmed.to_string()
    }
}

fn resolve_in(
    configured: &str,
    candidates: &[PathBuf],
    path_var: Option<&OsStr>,
) -> ExecutableLocation {
    let normalized = normalize(configured);
    let entered = Path::new(&normalized);

    if entered.is_absolute() && check_executable(entered).is_ok() {
        debug!(path = %entered.display(), "Configured chdman path verified");
        return ExecutableLocation::verified(entered);
    }

    if let Some(found) = candidates.iter().find(|c| check_executable(c).is_ok()) {
        info!(path = %found.display(), "Found chdman in install location");
        return ExecutableLocation::verified(found.clone());
    }

    if let Some(found) = search_path_var(path_var) {
        info!(path = %found.display(), "Found chdman on PATH");
        return ExecutableLocation::verified(found);
    }

    debug!(path = %normalized, "chdman not found");
    ExecutableLocation::unverified(normalized)
}

fn search_path_var(path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(TOOL_NAME))
        .find(|candidate| check_executable(candidate).is_ok())
}
