//! Types for the batch module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use super::error::BatchError;

/// Message recorded on jobs skipped because their output exists.
pub const OUTPUT_EXISTS_MESSAGE: &str = "Output file already exists";

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Skipped,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Skipped)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Skipped)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input/output conversion unit of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub status: JobStatus,
    /// Last known progress fraction in `[0.0, 1.0]`.
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Creates a pending job.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(),
            input_path: input_path.into(),
            output_path: output_path.into(),
            status: JobStatus::Pending,
            progress: 0.0,
            error_message: None,
            started_at: None,
            finished_at: None,
        }
    }

    fn transition(&mut self, next: JobStatus) -> Result<(), BatchError> {
        if !self.status.can_transition_to(next) {
            return Err(BatchError::InvalidTransition {
                job_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_processing(&mut self) -> Result<(), BatchError> {
        self.transition(JobStatus::Processing)?;
        self.progress = 0.0;
        self.error_message = None;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_completed(&mut self) -> Result<(), BatchError> {
        self.transition(JobStatus::Completed)?;
        self.progress = 1.0;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) -> Result<(), BatchError> {
        self.transition(JobStatus::Failed)?;
        self.error_message = Some(message.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    pub fn mark_skipped(&mut self, reason: impl Into<String>) -> Result<(), BatchError> {
        self.transition(JobStatus::Skipped)?;
        self.error_message = Some(reason.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Records a parsed progress value; `None` keeps the current value.
    pub fn apply_progress(&mut self, progress: Option<f64>) {
        if let Some(fraction) = progress {
            self.progress = fraction.clamp(0.0, 1.0);
        }
    }

    /// Puts the job back to pending, clearing the previous run's results.
    pub fn reset(&mut self) {
        self.status = JobStatus::Pending;
        self.progress = 0.0;
        self.error_message = None;
        self.started_at = None;
        self.finished_at = None;
    }

    /// Wall-clock duration of the run, once finished.
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

/// Policy for a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Skip jobs whose output file already exists.
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,

    /// End the batch at the first failed job.
    #[serde(default)]
    pub stop_on_error: bool,

    /// Jobs run at the same time. Only 1 is supported.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_skip_existing() -> bool {
    true
}

fn default_max_concurrent() -> usize {
    1
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            skip_existing: default_skip_existing(),
            stop_on_error: false,
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl BatchConfig {
    pub fn with_skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn with_stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }
}

/// Counts from a finished batch run.
///
/// `total` is the number of jobs handed in. When the run stopped early the
/// buckets add up to less than `total`; the difference stayed pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl BatchSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Default::default()
        }
    }

    /// Fraction of all jobs that succeeded; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.succeeded as f64 / self.total as f64
    }

    /// Jobs that reached a terminal state.
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// Jobs left pending by an early stop.
    pub fn pending(&self) -> usize {
        self.total.saturating_sub(self.attempted())
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total: {}", self.total)?;
        writeln!(f, "Succeeded: {}", self.succeeded)?;
        writeln!(f, "Failed: {}", self.failed)?;
        write!(f, "Skipped: {}", self.skipped)
    }
}

/// Notification emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// A job changed status; carries a snapshot of the job.
    JobUpdated(Job),
    /// A job produced an output line.
    JobProgress {
        job_id: JobId,
        /// Progress fraction, or `PROGRESS_UNKNOWN` when the line had none.
        progress: f64,
        line: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_lifecycle() {
        let mut job = Job::new("/in/game.cue", "/out/game.chd");
        assert_eq!(job.status, JobStatus::Pending);

        job.mark_processing().unwrap();
        job.apply_progress(Some(0.4));
        job.apply_progress(None);
        assert_eq!(job.progress, 0.4);

        job.mark_completed().unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.progress, 1.0);
        assert!(job.duration_ms().is_some());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut job = Job::new("a", "b");
        job.mark_skipped(OUTPUT_EXISTS_MESSAGE).unwrap();
        assert!(job.mark_processing().is_err());
        assert!(job.mark_completed().is_err());
        assert_eq!(job.status, JobStatus::Skipped);

        let mut failed = Job::new("a", "b");
        failed.mark_processing().unwrap();
        failed.mark_failed("boom").unwrap();
        assert!(matches!(
            failed.mark_completed(),
            Err(BatchError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_pending_cannot_complete_directly() {
        let mut job = Job::new("a", "b");
        assert!(job.mark_completed().is_err());
        assert!(job.mark_failed("x").is_err());
    }

    #[test]
    fn test_reset_returns_to_pending() {
        let mut job = Job::new("a", "b");
        job.mark_processing().unwrap();
        job.mark_failed("boom").unwrap();
        job.reset();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.error_message.is_none());
        assert!(job.mark_processing().is_ok());
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(BatchSummary::new(0).success_rate(), 0.0);
        let summary = BatchSummary {
            total: 4,
            succeeded: 3,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(summary.success_rate(), 0.75);
        assert_eq!(summary.pending(), 0);
    }

    #[test]
    fn test_summary_pending_after_early_stop() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 1,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.pending(), 1);
    }

    #[test]
    fn test_summary_display() {
        let summary = BatchSummary {
            total: 3,
            succeeded: 1,
            failed: 1,
            skipped: 1,
        };
        assert_eq!(
            summary.to_string(),
            "Total: 3\nSucceeded: 1\nFailed: 1\nSkipped: 1"
        );
    }

    #[test]
    fn test_batch_config_defaults() {
        let config = BatchConfig::default();
        assert!(config.skip_existing);
        assert!(!config.stop_on_error);
        assert_eq!(config.max_concurrent, 1);

        let parsed: BatchConfig = toml::from_str("stop_on_error = true").unwrap();
        assert!(parsed.stop_on_error);
        assert!(parsed.skip_existing);
    }

    #[test]
    fn test_event_serialization() {
        let event = BatchEvent::JobProgress {
            job_id: JobId::new(),
            progress: -1.0,
            line: "chdman".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "job_progress");
        assert_eq!(json["progress"], -1.0);
    }
}
