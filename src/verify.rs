//! Post-pipeline report and conservation checks.

use std::fmt;

use crate::error::{Result, Violation};
use crate::state::SharedState;

/// Totals observed at both ends of the pipeline after quiescence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    pub source_count: u64,
    pub source_sum: i64,
    pub sink_count: u64,
    pub sink_sum: i64,
    /// Items collected per worker lane, index = lane index
    pub lane_hits: Vec<u64>,
}

impl Report {
    /// Read every counter. Only meaningful once all stages have been joined.
    pub async fn collect(state: &SharedState) -> Self {
        Self {
            source_count: state.source.count(),
            source_sum: state.source.sum(),
            sink_count: state.sink.count(),
            sink_sum: state.sink.sum(),
            lane_hits: state.lane_hits.snapshot().await,
        }
    }

    /// Total of the per-lane counters
    pub fn lane_total(&self) -> u64 {
        self.lane_hits.iter().sum()
    }

    /// Check conservation; the first failing invariant is returned.
    pub fn verify(&self) -> Result<()> {
        if self.source_sum != self.sink_sum {
            return Err(Violation::SumMismatch {
                produced: self.source_sum,
                drained: self.sink_sum,
            }
            .into());
        }
        if self.source_count != self.sink_count {
            return Err(Violation::CountMismatch {
                produced: self.source_count,
                drained: self.sink_count,
            }
            .into());
        }
        let lanes = self.lane_total();
        if lanes != self.source_count {
            return Err(Violation::LanePartition {
                lanes,
                produced: self.source_count,
            }
            .into());
        }
        Ok(())
    }
}

/// Three report lines: counts, sums, then the per-lane breakdown.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count: {} {}", self.source_count, self.sink_count)?;
        writeln!(f, "sum: {} {}", self.source_sum, self.sink_sum)?;
        write!(f, "lanes: {:?}", self.lane_hits)
    }
}
