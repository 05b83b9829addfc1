//! Shared counters mutated by the pipeline stages.
//!
//! Every counter starts at zero when the pipeline is built, is written only
//! while stages are running, and is read by the verifier after quiescence.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::Item;

/// A running count and sum of observed items.
///
/// Each tally has a single writer stage; atomics keep it readable from other
/// tasks without a lock.
#[derive(Debug)]
pub struct Tally {
    name: &'static str,
    count: AtomicU64,
    sum: AtomicI64,
}

impl Tally {
    /// Create an empty tally
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            count: AtomicU64::new(0),
            sum: AtomicI64::new(0),
        }
    }

    /// Count one item and add its value to the sum
    pub fn record(&self, value: Item) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.fetch_add(value, Ordering::Relaxed);

        #[cfg(feature = "metrics")]
        metrics::counter!(format!("fanweld.{}.items", self.name)).increment(1);
    }

    /// Number of items recorded
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of the items recorded
    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Per-lane hit counters shared by every fan-in collector.
///
/// A single coarse lock guards the whole array.
#[derive(Debug)]
pub struct LaneHits {
    hits: Mutex<Vec<u64>>,
}

impl LaneHits {
    /// Create `lanes` zeroed counters
    pub fn new(lanes: usize) -> Self {
        Self {
            hits: Mutex::new(vec![0; lanes]),
        }
    }

    /// Increment the counter for `lane`
    pub async fn hit(&self, lane: usize) {
        let mut hits = self.hits.lock().await;
        if let Some(slot) = hits.get_mut(lane) {
            *slot += 1;
        }

        #[cfg(feature = "metrics")]
        metrics::counter!("fanweld.lane.hits", "lane" => lane.to_string()).increment(1);
    }

    /// Copy of the counters, index = lane index
    pub async fn snapshot(&self) -> Vec<u64> {
        self.hits.lock().await.clone()
    }

    pub async fn lanes(&self) -> usize {
        self.hits.lock().await.len()
    }
}

/// All counters for one pipeline run, handed by reference to each stage.
#[derive(Debug, Clone)]
pub struct SharedState {
    pub source: Arc<Tally>,
    pub sink: Arc<Tally>,
    pub lane_hits: Arc<LaneHits>,
}

impl SharedState {
    /// Create zeroed counters for a pipeline with `lanes` workers
    pub fn new(lanes: usize) -> Self {
        Self {
            source: Arc::new(Tally::new("source")),
            sink: Arc::new(Tally::new("sink")),
            lane_hits: Arc::new(LaneHits::new(lanes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_accumulates() {
        let tally = Tally::new("source");
        for v in 1..=5 {
            tally.record(v);
        }
        assert_eq!(tally.count(), 5);
        assert_eq!(tally.sum(), 15);
        assert_eq!(tally.name(), "source");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn lane_hits_are_safe_under_contention() {
        let hits = Arc::new(LaneHits::new(4));
        let mut handles = Vec::new();
        for lane in 0..4 {
            let hits = hits.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..250 {
                    hits.hit(lane).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(hits.snapshot().await, vec![250, 250, 250, 250]);
        assert_eq!(hits.lanes().await, 4);
    }

    #[tokio::test]
    async fn fresh_state_is_zeroed() {
        let state = SharedState::new(3);
        assert_eq!(state.source.count(), 0);
        assert_eq!(state.sink.sum(), 0);
        assert_eq!(state.lane_hits.snapshot().await, vec![0, 0, 0]);
    }
}
