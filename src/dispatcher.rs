//! Fan-out stage: a fixed pool of relay workers sharing one input lane.
//!
//! Workers race to receive from the shared input; which worker gets which
//! item is unspecified. Each worker owns a dedicated output lane and closes
//! it (by dropping its sender) once the input is closed and drained.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

use crate::error::Result;

/// Receiving half of a lane that several workers consume concurrently
pub type SharedLane<T> = Arc<Mutex<mpsc::Receiver<T>>>;

/// A single relay task
pub struct Worker<T> {
    id: usize,
    input: SharedLane<T>,
    output: mpsc::Sender<T>,
    delay: Duration,
}

impl<T: Send + 'static> Worker<T> {
    pub fn new(id: usize, input: SharedLane<T>, output: mpsc::Sender<T>, delay: Duration) -> Self {
        Self {
            id,
            input,
            output,
            delay,
        }
    }

    /// Relay items until the input lane is closed and drained.
    ///
    /// Returns the number of items forwarded. The output lane closes when
    /// `self` is dropped, on every exit path.
    pub async fn run(self) -> Result<u64> {
        let mut relayed = 0u64;

        loop {
            // Only the receive holds the lock; sending and sleeping do not.
            let next = {
                let mut input = self.input.lock().await;
                input.recv().await
            };
            let Some(item) = next else {
                break;
            };

            self.output.send(item).await?;
            relayed += 1;

            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
        }

        trace!(worker = self.id, relayed, "worker input closed");
        Ok(relayed)
    }
}

/// Configuration for the worker pool
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Number of workers, and therefore output lanes
    pub workers: usize,
    /// Pause after each forwarded item
    pub delay: Duration,
    /// Buffer size of each worker output lane
    pub lane_capacity: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: crate::config::DEFAULT_WORKERS,
            delay: crate::config::DEFAULT_WORKER_DELAY,
            lane_capacity: 1,
        }
    }
}

/// A running pool of workers and the output lanes they feed
pub struct WorkerPool<T> {
    outputs: Vec<mpsc::Receiver<T>>,
    handles: Vec<JoinHandle<Result<u64>>>,
}

impl<T: Send + 'static> WorkerPool<T> {
    /// Spawn `config.workers` relays all consuming `input`
    pub fn spawn(input: mpsc::Receiver<T>, config: &DispatcherConfig) -> Self {
        let input: SharedLane<T> = Arc::new(Mutex::new(input));
        let mut outputs = Vec::with_capacity(config.workers);
        let mut handles = Vec::with_capacity(config.workers);

        for id in 0..config.workers {
            let (tx, rx) = mpsc::channel(config.lane_capacity.max(1));
            let worker = Worker::new(id, input.clone(), tx, config.delay);
            handles.push(tokio::spawn(worker.run()));
            outputs.push(rx);
        }

        Self { outputs, handles }
    }

    /// Split into the output lanes (index = lane index) and the worker handles
    pub fn into_parts(self) -> (Vec<mpsc::Receiver<T>>, Vec<JoinHandle<Result<u64>>>) {
        (self.outputs, self.handles)
    }
}
