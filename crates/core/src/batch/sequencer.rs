//! Sequential batch runner.

use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::command::{build_arguments, Direction, ToolOption};
use crate::progress::progress_or_sentinel;
use crate::runner::{ExecutableLocation, OutputLine, RunnerError, ToolRunner};

use super::error::BatchError;
use super::types::{
    BatchConfig, BatchEvent, BatchSummary, Job, JobStatus, OUTPUT_EXISTS_MESSAGE,
};

/// Runs a list of jobs one after another through a [`ToolRunner`].
pub struct BatchSequencer<R> {
    runner: R,
}

impl<R: ToolRunner> BatchSequencer<R> {
    /// Creates a sequencer driving `runner`.
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs every job in order and returns the counts.
    ///
    /// Jobs are updated in place and every status change is also sent on
    /// `events` as a [`BatchEvent::JobUpdated`] snapshot. Output lines are
    /// sent as [`BatchEvent::JobProgress`]. A dropped receiver does not stop
    /// the batch.
    ///
    /// With `stop_on_error` the run ends at the first failure and the jobs
    /// after it stay pending and uncounted; `total` still counts them.
    pub async fn run_batch(
        &self,
        executable: &ExecutableLocation,
        jobs: &mut [Job],
        direction: Direction,
        options: &[ToolOption],
        config: &BatchConfig,
        events: &mpsc::UnboundedSender<BatchEvent>,
    ) -> Result<BatchSummary, BatchError> {
        validate_batch(jobs, config)?;

        let start = Instant::now();
        let mut summary = BatchSummary::new(jobs.len());
        info!(
            jobs = jobs.len(),
            direction = %direction,
            skip_existing = config.skip_existing,
            stop_on_error = config.stop_on_error,
            "Starting batch conversion"
        );

        for job in jobs.iter_mut() {
            if config.skip_existing && output_exists(job).await {
                job.mark_skipped(OUTPUT_EXISTS_MESSAGE)?;
                summary.skipped += 1;
                debug!(job_id = %job.id, output = %job.output_path.display(), "Skipping job, output exists");
                emit_update(events, job);
                continue;
            }

            job.mark_processing()?;
            emit_update(events, job);
            info!(job_id = %job.id, input = %job.input_path.display(), "Processing job");

            let args = build_arguments(direction, &job.input_path, &job.output_path, options);
            let outcome = self.run_job(executable, &args, job, events).await;

            match outcome {
                Ok(()) => {
                    job.mark_completed()?;
                    summary.succeeded += 1;
                    emit_update(events, job);
                }
                Err(e) => {
                    warn!(job_id = %job.id, error = %e, "Job failed");
                    job.mark_failed(failure_message(&e))?;
                    summary.failed += 1;
                    emit_update(events, job);

                    if config.stop_on_error {
                        info!("Stopping batch after failure");
                        break;
                    }
                }
            }
        }

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch conversion finished"
        );

        Ok(summary)
    }

    async fn run_job(
        &self,
        executable: &ExecutableLocation,
        args: &[String],
        job: &mut Job,
        events: &mpsc::UnboundedSender<BatchEvent>,
    ) -> Result<(), RunnerError> {
        let job_id = job.id;
        let mut relay = |line: OutputLine| {
            job.apply_progress(line.progress);
            let _ = events.send(BatchEvent::JobProgress {
                job_id,
                progress: progress_or_sentinel(line.progress),
                line: line.text,
            });
        };
        self.runner.run(executable, args, &mut relay).await
    }
}

fn validate_batch(jobs: &[Job], config: &BatchConfig) -> Result<(), BatchError> {
    if jobs.is_empty() {
        return Err(BatchError::EmptyBatch);
    }
    if config.max_concurrent != 1 {
        return Err(BatchError::UnsupportedConcurrency {
            requested: config.max_concurrent,
        });
    }
    if let Some(job) = jobs.iter().find(|j| j.status != JobStatus::Pending) {
        return Err(BatchError::JobNotPending {
            job_id: job.id,
            status: job.status,
        });
    }
    Ok(())
}

async fn output_exists(job: &Job) -> bool {
    tokio::fs::try_exists(&job.output_path)
        .await
        .unwrap_or(false)
}

fn emit_update(events: &mpsc::UnboundedSender<BatchEvent>, job: &Job) {
    let _ = events.send(BatchEvent::JobUpdated(job.clone()));
}

fn failure_message(error: &RunnerError) -> String {
    match error.hint() {
        Some(hint) => format!("{}\n\n{}", error, hint),
        None => error.to_string(),
    }
}
