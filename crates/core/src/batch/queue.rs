//! Caller-side list of batch jobs.

use std::path::{Path, PathBuf};

use crate::command::Direction;

use super::types::{BatchEvent, Job, JobId};

/// Ordered job list with output paths derived from the direction.
///
/// Outputs go to `<output dir>/<input stem>.<output extension>`, the output
/// directory defaulting to the input's own directory.
#[derive(Debug, Clone)]
pub struct BatchQueue {
    direction: Direction,
    output_directory: Option<PathBuf>,
    jobs: Vec<Job>,
}

impl BatchQueue {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            output_directory: None,
            jobs: Vec::new(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Changes the direction and re-derives every output path.
    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
        self.rederive_outputs();
    }

    pub fn output_directory(&self) -> Option<&Path> {
        self.output_directory.as_deref()
    }

    /// Changes the output directory and re-derives every output path.
    pub fn set_output_directory(&mut self, directory: Option<PathBuf>) {
        self.output_directory = directory;
        self.rederive_outputs();
    }

    /// Output path a given input would get.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let base_dir = match &self.output_directory {
            Some(dir) => dir.clone(),
            None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let stem = input.file_stem().unwrap_or(input.as_os_str());
        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(self.direction.output_extension());
        base_dir.join(file_name)
    }

    /// Queues inputs not already present. Returns how many were added.
    pub fn add_inputs<I, P>(&mut self, inputs: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut added = 0;
        for input in inputs {
            let input = input.into();
            if self.jobs.iter().any(|j| j.input_path == input) {
                continue;
            }
            let output = self.output_path_for(&input);
            self.jobs.push(Job::new(input, output));
            added += 1;
        }
        added
    }

    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        let index = self.jobs.iter().position(|j| j.id == id)?;
        Some(self.jobs.remove(index))
    }

    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// Puts every job back to pending so the queue can run again.
    pub fn reset(&mut self) {
        for job in &mut self.jobs {
            job.reset();
        }
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn jobs_mut(&mut self) -> &mut [Job] {
        &mut self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Fraction of jobs in a terminal state.
    pub fn overall_progress(&self) -> f64 {
        if self.jobs.is_empty() {
            return 0.0;
        }
        let finished = self.jobs.iter().filter(|j| j.status.is_terminal()).count();
        finished as f64 / self.jobs.len() as f64
    }

    /// Mirrors a sequencer event into this queue.
    ///
    /// Used when the sequencer runs on a copy of the jobs and the queue is
    /// the caller's own view. Unknown progress leaves the job's value alone.
    pub fn apply_event(&mut self, event: &BatchEvent) {
        match event {
            BatchEvent::JobUpdated(updated) => {
                if let Some(job) = self.jobs.iter_mut().find(|j| j.id == updated.id) {
                    *job = updated.clone();
                }
            }
            BatchEvent::JobProgress {
                job_id, progress, ..
            } => {
                if let Some(job) = self.jobs.iter_mut().find(|j| j.id == *job_id) {
                    job.apply_progress((*progress >= 0.0).then_some(*progress));
                }
            }
        }
    }

    fn rederive_outputs(&mut self) {
        for index in 0..self.jobs.len() {
            let output = self.output_path_for(&self.jobs[index].input_path);
            self.jobs[index].output_path = output;
        }
    }
}
