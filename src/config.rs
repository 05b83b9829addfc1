//! Pipeline configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default number of relay workers (and output lanes)
pub const DEFAULT_WORKERS: usize = 20;
/// Default generation deadline
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(1);
/// Default artificial per-item worker latency
pub const DEFAULT_WORKER_DELAY: Duration = Duration::from_millis(1);

/// Configuration for a pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of relay workers, each with a dedicated output lane
    pub workers: usize,
    /// How long the generator keeps producing before it is cancelled
    pub deadline: Duration,
    /// Pause taken by a worker after forwarding each item
    pub worker_delay: Duration,
    /// Buffer size of the merged lane feeding the sink
    pub merge_capacity: usize,
    /// Maximum time allowed for the pipeline to drain once cancelled
    pub shutdown_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            deadline: DEFAULT_DEADLINE,
            worker_delay: DEFAULT_WORKER_DELAY,
            merge_capacity: DEFAULT_WORKERS,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with the default constants
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker count; the merged lane is resized to match
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self.merge_capacity = workers.max(1);
        self
    }

    /// Set the generation deadline
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the per-item worker delay
    pub fn worker_delay(mut self, delay: Duration) -> Self {
        self.worker_delay = delay;
        self
    }

    /// Set the merged lane buffer size
    pub fn merge_capacity(mut self, capacity: usize) -> Self {
        self.merge_capacity = capacity;
        self
    }

    /// Set the drain window
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Reject configurations the pipeline cannot run
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::config("worker count must be at least 1"));
        }
        if self.merge_capacity == 0 {
            return Err(Error::config("merged lane capacity must be at least 1"));
        }
        Ok(())
    }
}
