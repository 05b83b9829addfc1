//! Sink implementations and the aggregator stage that drives them.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::error::Result;
use crate::state::Tally;
use crate::traits::Sink;
use crate::Item;

/// A sink that counts and sums items into a shared [`Tally`]
#[derive(Debug, Clone)]
pub struct TallySink {
    tally: Arc<Tally>,
}

impl TallySink {
    pub fn new(tally: Arc<Tally>) -> Self {
        Self { tally }
    }

    /// Get a reference to the underlying tally
    pub fn tally(&self) -> Arc<Tally> {
        self.tally.clone()
    }
}

#[async_trait]
impl Sink for TallySink {
    type Item = Item;

    async fn consume(&mut self, item: Self::Item) -> Result<()> {
        self.tally.record(item);
        Ok(())
    }
}

/// Tail of the pipeline: a single task draining the merged lane into a sink
pub struct Aggregator<C> {
    sink: C,
}

impl<C> Aggregator<C>
where
    C: Sink + Send,
{
    pub fn new(sink: C) -> Self {
        Self { sink }
    }

    /// Drain `merged` to exhaustion and return the number of items consumed.
    ///
    /// Ends only when every sender of the merged lane has been dropped.
    pub async fn run(mut self, merged: mpsc::Receiver<C::Item>) -> Result<u64> {
        let mut stream = ReceiverStream::new(merged);
        let mut consumed = 0u64;

        while let Some(item) = stream.next().await {
            self.sink.consume(item).await?;
            consumed += 1;
        }

        self.sink.finish().await?;
        debug!(consumed, "sink drained merged lane");
        Ok(consumed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn aggregator_tallies_until_closed() {
        let tally = Arc::new(Tally::new("sink"));
        let (tx, rx) = mpsc::channel(8);

        for v in [3, 1, 2, 5, 4] {
            tx.send(v).await.unwrap();
        }
        drop(tx);

        let consumed = Aggregator::new(TallySink::new(tally.clone()))
            .run(rx)
            .await
            .unwrap();

        assert_eq!(consumed, 5);
        assert_eq!(tally.count(), 5);
        assert_eq!(tally.sum(), 15);
    }

    #[tokio::test]
    async fn aggregator_on_closed_empty_lane() {
        let sink = TallySink::new(Arc::new(Tally::new("sink")));
        let tally = sink.tally();
        let (tx, rx) = mpsc::channel::<i64>(1);
        drop(tx);

        assert_eq!(Aggregator::new(sink).run(rx).await.unwrap(), 0);
        assert_eq!(tally.count(), 0);
        assert_eq!(tally.sum(), 0);
    }
}
