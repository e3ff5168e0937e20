//! Batch module for converting many files in one run.
//!
//! [`BatchSequencer`] walks a job list strictly in order, one chdman process
//! at a time. Jobs whose output already exists can be skipped, and the run
//! can stop at the first failure. Progress reaches the caller as
//! [`BatchEvent`]s on a channel the caller owns.
//!
//! # Example
//!
//! ```ignore
//! use chdrunner_core::batch::{BatchConfig, BatchQueue, BatchSequencer};
//! use chdrunner_core::command::Direction;
//! use chdrunner_core::runner::ProcessRunner;
//!
//! let mut queue = BatchQueue::new(Direction::CueToChd);
//! queue.add_inputs(["/games/a.cue", "/games/b.cue"]);
//!
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let sequencer = BatchSequencer::new(ProcessRunner::with_defaults());
//! let summary = sequencer
//!     .run_batch(&chdman, queue.jobs_mut(), Direction::CueToChd, &[], &BatchConfig::default(), &tx)
//!     .await?;
//! println!("{}", summary);
//! ```

mod error;
mod queue;
mod sequencer;
mod types;

pub use error::BatchError;
pub use queue::BatchQueue;
pub use sequencer::BatchSequencer;
pub use types::{
    BatchConfig, BatchEvent, BatchSummary, Job, JobId, JobStatus, OUTPUT_EXISTS_MESSAGE,
};
