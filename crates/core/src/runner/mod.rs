//! Runner module for launching chdman.
//!
//! [`ProcessRunner`] starts one chdman invocation, reads stdout and stderr
//! concurrently while the tool runs, turns each output line into an
//! [`OutputLine`] with its parsed progress, and resolves once the process has
//! exited. A non-zero exit becomes [`RunnerError::ExitedNonZero`] carrying the
//! last few captured lines.
//!
//! # Example
//!
//! ```ignore
//! use chdrunner_core::runner::{ExecutableLocation, ProcessRunner, ToolRunner};
//!
//! let runner = ProcessRunner::with_defaults();
//! let chdman = ExecutableLocation::verified("/opt/homebrew/bin/chdman");
//! let args = build_arguments(Direction::CueToChd, input, output, &[]);
//!
//! runner
//!     .run(&chdman, &args, &mut |line| {
//!         if let Some(fraction) = line.progress {
//!             println!("{:.0}%", fraction * 100.0);
//!         }
//!     })
//!     .await?;
//! ```

mod config;
mod error;
mod history;
mod process;
mod traits;
mod types;

pub use config::RunnerConfig;
pub use error::RunnerError;
pub use history::{OutputHistory, DEFAULT_HISTORY_LINES};
pub use process::{check_executable, search_path, ProcessRunner, EXTRA_SEARCH_DIRS};
pub use traits::{LineSink, ToolRunner};
pub use types::{ExecutableLocation, OutputLine};
