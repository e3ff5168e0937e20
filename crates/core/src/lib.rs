pub mod batch;
pub mod command;
pub mod config;
pub mod locate;
pub mod progress;
pub mod runner;
pub mod testing;

pub use batch::{
    BatchConfig, BatchError, BatchEvent, BatchQueue, BatchSequencer, BatchSummary, Job, JobId,
    JobStatus,
};
pub use command::{build_arguments, Direction, OptionKind, ToolOption};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use progress::{parse_percent, PROGRESS_UNKNOWN};
pub use runner::{
    ExecutableLocation, OutputLine, ProcessRunner, RunnerConfig, RunnerError, ToolRunner,
};
