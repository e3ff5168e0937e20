//! Error types for the batch module.

use thiserror::Error;

use super::types::{JobId, JobStatus};

/// Errors that prevent a batch from running.
///
/// Individual job failures are never reported here; they are recorded on
/// the job and counted in the summary.
#[derive(Debug, Error)]
pub enum BatchError {
    /// No jobs were supplied.
    #[error("No files added for batch conversion")]
    EmptyBatch,

    /// Concurrent batch execution was requested.
    #[error("Unsupported concurrency {requested}: batches run one job at a time")]
    UnsupportedConcurrency { requested: usize },

    /// A job handed to the sequencer was not pending.
    #[error("Job {job_id} is {status}, expected pending")]
    JobNotPending { job_id: JobId, status: JobStatus },

    /// A job was asked to make an illegal status change.
    #[error("Job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        job_id: JobId,
        from: JobStatus,
        to: JobStatus,
    },
}
