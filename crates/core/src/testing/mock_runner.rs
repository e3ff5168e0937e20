//! Mock tool runner for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::runner::{ExecutableLocation, LineSink, OutputLine, RunnerError, ToolRunner};

/// A recorded invocation for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedRun {
    /// Executable the run was started with.
    pub executable: PathBuf,
    /// Full argument vector.
    pub args: Vec<String>,
    /// Whether the run succeeded.
    pub success: bool,
}

#[derive(Debug, Clone)]
struct ScriptedFailure {
    code: i32,
    lines: Vec<String>,
}

/// Mock implementation of the ToolRunner trait.
///
/// Provides controllable behavior for testing:
/// - Record every invocation with its argument vector
/// - Emit a fixed set of output lines per run
/// - Fail runs for chosen input paths with an exit code and output
/// - Simulate a missing executable
///
/// Clones share state, so a test can keep a handle while the sequencer owns
/// another.
#[derive(Debug, Clone)]
pub struct MockToolRunner {
    runs: Arc<RwLock<Vec<RecordedRun>>>,
    output_lines: Arc<RwLock<Vec<String>>>,
    failures: Arc<RwLock<HashMap<PathBuf, ScriptedFailure>>>,
    executable_missing: Arc<RwLock<bool>>,
}

impl Default for MockToolRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolRunner {
    /// Create a new mock runner that succeeds with a short progress trace.
    pub fn new() -> Self {
        Self {
            runs: Arc::new(RwLock::new(Vec::new())),
            output_lines: Arc::new(RwLock::new(vec![
                "Compressing, 50% complete...".to_string(),
                "Compression complete".to_string(),
            ])),
            failures: Arc::new(RwLock::new(HashMap::new())),
            executable_missing: Arc::new(RwLock::new(false)),
        }
    }

    /// Get all recorded runs.
    pub async fn recorded_runs(&self) -> Vec<RecordedRun> {
        self.runs.read().await.clone()
    }

    /// Get the number of runs performed, failed ones included.
    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    /// Set the lines every successful run emits.
    pub async fn set_output_lines(&self, lines: Vec<String>) {
        *self.output_lines.write().await = lines;
    }

    /// Make runs whose `-i` argument equals `input` exit with `code`.
    pub async fn fail_input(&self, input: impl AsRef<Path>, code: i32, lines: Vec<String>) {
        self.failures
            .write()
            .await
            .insert(input.as_ref().to_path_buf(), ScriptedFailure { code, lines });
    }

    /// Make every run fail as if the executable did not exist.
    pub async fn set_executable_missing(&self, missing: bool) {
        *self.executable_missing.write().await = missing;
    }
}

fn input_argument(args: &[String]) -> Option<PathBuf> {
    args.iter()
        .position(|a| a == "-i")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

#[async_trait]
impl ToolRunner for MockToolRunner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        executable: &ExecutableLocation,
        args: &[String],
        on_line: LineSink<'_>,
    ) -> Result<(), RunnerError> {
        // A missing executable fails before anything is launched or recorded.
        if *self.executable_missing.read().await {
            return Err(RunnerError::ExecutableNotFound {
                path: executable.path().to_path_buf(),
            });
        }

        let failure = match input_argument(args) {
            Some(input) => self.failures.read().await.get(&input).cloned(),
            None => None,
        };

        let lines = match &failure {
            Some(f) => f.lines.clone(),
            None => self.output_lines.read().await.clone(),
        };
        for line in &lines {
            on_line(OutputLine::new(line.as_str()));
        }

        self.runs.write().await.push(RecordedRun {
            executable: executable.path().to_path_buf(),
            args: args.to_vec(),
            success: failure.is_none(),
        });

        match failure {
            Some(f) => {
                let skip = lines.len().saturating_sub(crate::runner::DEFAULT_HISTORY_LINES);
                Err(RunnerError::exited(f.code, lines[skip..].to_vec()))
            }
            None => Ok(()),
        }
    }
}
