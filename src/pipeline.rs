//! Pipeline orchestration and execution.
//!
//! This module wires the stages together:
//!
//! ```text
//! Generator -> input lane -> Worker 0..N -> N lanes -> Collector 0..N -> merged lane -> Aggregator
//! ```
//!
//! Only the generator sees the cancellation token. Every other stage stops
//! because its upstream lane closed, so one cancel unwinds the whole chain.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::collector::FanIn;
use crate::config::PipelineConfig;
use crate::dispatcher::{DispatcherConfig, WorkerPool};
use crate::error::{Error, Result};
use crate::sinks::{Aggregator, TallySink};
use crate::sources::{Generator, SequenceSource};
use crate::state::SharedState;
use crate::traits::Source;
use crate::util::{deadline_token, join_stage, within, StageGuard};
use crate::verify::Report;
use crate::Item;

/// Pipeline-wide lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The generator is producing under the cancellation watch
    Running,
    /// The generator has stopped; downstream stages are flushing in-flight items
    Draining,
    /// Quiescent and every invariant held
    Verified,
    /// Quiescent and an invariant was violated
    Failed,
}

/// A fan-out/fan-in pipeline over a [`Source`] of integers
pub struct Pipeline<S = SequenceSource> {
    source: S,
    config: PipelineConfig,
}

impl Pipeline<SequenceSource> {
    /// Create a pipeline over the unbounded 1, 2, 3, ... sequence
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_source(SequenceSource::new(), config)
    }
}

impl<S> Pipeline<S>
where
    S: Source<Item = Item> + Send + 'static,
{
    /// Create a pipeline over a custom source
    pub fn with_source(source: S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    /// Run until the configured deadline, then drain and report
    pub async fn run(self) -> Result<Report> {
        let token = deadline_token(self.config.deadline);
        // Stops the deadline timer when the source runs dry before it fires.
        let _stop_timer = token.clone().drop_guard();
        self.run_until(token).await
    }

    /// Run, then fail with the first violated invariant if any
    pub async fn run_verified(self) -> Result<Report> {
        let report = self.run().await?;
        match report.verify() {
            Ok(()) => {
                info!(phase = ?Phase::Verified, count = report.sink_count, "pipeline verified");
                Ok(report)
            }
            Err(e) => {
                error!(phase = ?Phase::Failed, error = %e, "pipeline failed verification");
                Err(e)
            }
        }
    }

    /// Run until `token` is cancelled (or the source is exhausted), then
    /// drain every lane and return the totals.
    ///
    /// The report is read only after every stage task has been joined. On
    /// any early return, including a drain timeout, every stage still running
    /// is aborted.
    pub async fn run_until(self, token: CancellationToken) -> Result<Report> {
        self.config.validate()?;
        let Pipeline { source, config } = self;
        let state = SharedState::new(config.workers);

        info!(
            phase = ?Phase::Running,
            workers = config.workers,
            deadline_ms = config.deadline.as_millis() as u64,
            "pipeline starting"
        );

        let (input_tx, input_rx) = mpsc::channel(1);

        let source_tally = state.source.clone();
        let generator = Generator::new(source, token, move |v| source_tally.record(v));
        let generator = tokio::spawn(generator.run(input_tx));

        let pool = WorkerPool::spawn(
            input_rx,
            &DispatcherConfig {
                workers: config.workers,
                delay: config.worker_delay,
                ..DispatcherConfig::default()
            },
        );
        let (lanes, workers) = pool.into_parts();

        let (merged, closer) =
            FanIn::spawn(lanes, state.lane_hits.clone(), config.merge_capacity).into_parts();

        let sink = TallySink::new(state.sink.clone());
        let aggregator = tokio::spawn(Aggregator::new(sink).run(merged));

        let mut stages = StageGuard::new();
        stages.track(&generator);
        for worker in &workers {
            stages.track(worker);
        }
        stages.track(&closer);
        stages.track(&aggregator);

        let produced = join_stage(generator).await?;
        info!(phase = ?Phase::Draining, produced, "generator stopped, draining");

        let drained = within(config.shutdown_timeout, async {
            let mut relayed = 0u64;
            for worker in workers {
                relayed += join_stage(worker).await?;
            }
            let collected = join_stage(closer).await?;
            let consumed = join_stage(aggregator).await?;
            debug!(relayed, collected, consumed, "all stages joined");
            Ok::<_, Error>(consumed)
        })
        .await;

        let consumed = match drained {
            Ok(consumed) => consumed,
            Err(e) => {
                warn!(stages = stages.len(), error = %e, "drain failed, aborting stages");
                return Err(e);
            }
        };

        debug!(produced, consumed, "pipeline quiescent");
        Ok(Report::collect(&state).await)
    }
}
