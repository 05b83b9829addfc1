//! Fan-in stage: drains every worker lane into one merged lane.
//!
//! One collector runs per worker lane. A separate closer task owns the
//! merged lane's original sender and drops it only after every collector has
//! been joined, so slow lanes are never cut off by fast ones.

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::state::LaneHits;
use crate::util::StageGuard;

/// Drains a single worker lane into the merged lane
pub struct Collector<T> {
    lane: usize,
    input: mpsc::Receiver<T>,
    merged: mpsc::Sender<T>,
    hits: Arc<LaneHits>,
}

impl<T: Send + 'static> Collector<T> {
    pub fn new(
        lane: usize,
        input: mpsc::Receiver<T>,
        merged: mpsc::Sender<T>,
        hits: Arc<LaneHits>,
    ) -> Self {
        Self {
            lane,
            input,
            merged,
            hits,
        }
    }

    /// Forward every item from this lane, counting it against the lane first.
    pub async fn run(mut self) -> Result<u64> {
        let mut collected = 0u64;

        while let Some(item) = self.input.recv().await {
            self.hits.hit(self.lane).await;
            self.merged.send(item).await?;
            collected += 1;
        }

        trace!(lane = self.lane, collected, "collector lane drained");
        Ok(collected)
    }
}

/// The merged lane plus the closer task guarding it
pub struct FanIn<T> {
    merged: mpsc::Receiver<T>,
    closer: JoinHandle<Result<u64>>,
}

impl<T: Send + 'static> FanIn<T> {
    /// Spawn one collector per lane and the closer that waits on all of them.
    ///
    /// `lanes[i]` is counted under lane index `i` in `hits`.
    pub fn spawn(lanes: Vec<mpsc::Receiver<T>>, hits: Arc<LaneHits>, capacity: usize) -> Self {
        let (merged_tx, merged_rx) = mpsc::channel(capacity.max(1));

        let collectors: Vec<JoinHandle<Result<u64>>> = lanes
            .into_iter()
            .enumerate()
            .map(|(lane, input)| {
                let collector = Collector::new(lane, input, merged_tx.clone(), hits.clone());
                tokio::spawn(collector.run())
            })
            .collect();

        // Owned by the closer future, so aborting the closer takes the
        // collectors down with it.
        let mut guard = StageGuard::new();
        for collector in &collectors {
            guard.track(collector);
        }

        let closer = tokio::spawn(async move {
            let results = join_all(collectors).await;
            drop(guard);
            drop(merged_tx);

            let mut total = 0u64;
            let mut first_error = None;
            for result in results {
                match result.map_err(Error::from).and_then(|r| r) {
                    Ok(collected) => total += collected,
                    Err(e) => {
                        first_error.get_or_insert(e);
                    }
                }
            }
            debug!(total, "all collectors joined, merged lane closed");

            match first_error {
                Some(e) => Err(e),
                None => Ok(total),
            }
        });

        Self {
            merged: merged_rx,
            closer,
        }
    }

    /// Split into the merged lane and the closer handle.
    ///
    /// Aborting the closer also aborts every collector it is waiting on.
    pub fn into_parts(self) -> (mpsc::Receiver<T>, JoinHandle<Result<u64>>) {
        (self.merged, self.closer)
    }
}
