//! Trait definitions for the runner module.

use async_trait::async_trait;

use super::error::RunnerError;
use super::types::{ExecutableLocation, OutputLine};

/// Receives every output line of a run, in delivery order.
pub type LineSink<'a> = &'a mut (dyn FnMut(OutputLine) + Send);

/// Runs one chdman invocation to completion.
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Returns the name of this runner implementation.
    fn name(&self) -> &str;

    /// Runs `executable` with `args`, streaming output lines into `on_line`.
    ///
    /// Resolves once, after the process exited. `on_line` is never called
    /// after this returns.
    async fn run(
        &self,
        executable: &ExecutableLocation,
        args: &[String],
        on_line: LineSink<'_>,
    ) -> Result<(), RunnerError>;
}
