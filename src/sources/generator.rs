use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::Result;
use crate::traits::Source;

/// Head of the pipeline: pulls from a [`Source`] and pushes onto the input lane.
///
/// The generator is the only stage that watches the cancellation token.
/// Everything downstream stops by seeing its input lane close, which happens
/// here when the sender is dropped on return.
pub struct Generator<S, F> {
    source: S,
    token: CancellationToken,
    observer: F,
}

impl<S, F> Generator<S, F>
where
    S: Source + Send,
    S::Item: Clone,
    F: FnMut(S::Item) + Send,
{
    /// Create a generator that reports every sent item to `observer`
    pub fn new(source: S, token: CancellationToken, observer: F) -> Self {
        Self {
            source,
            token,
            observer,
        }
    }

    /// Produce until cancelled or the source runs dry, returning the number sent.
    ///
    /// The observer runs strictly after the matching send completes, so a
    /// value is never counted before it is on the lane.
    pub async fn run(mut self, lane: mpsc::Sender<S::Item>) -> Result<u64> {
        let mut produced = 0u64;

        loop {
            if self.token.is_cancelled() {
                debug!(produced, "generator cancelled");
                break;
            }

            let Some(item) = self.source.produce().await? else {
                debug!(produced, "generator source exhausted");
                break;
            };

            lane.send(item.clone()).await?;
            (self.observer)(item);
            produced += 1;
        }

        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sources::SequenceSource;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn stops_without_sending_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let (tx, mut rx) = mpsc::channel(1);

        let generator = Generator::new(SequenceSource::new(), token, |_| {});
        let produced = generator.run(tx).await.unwrap();

        assert_eq!(produced, 0);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn observer_cancel_stops_after_current_item() {
        let token = CancellationToken::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (tx, mut rx) = mpsc::channel(16);

        let observer = {
            let token = token.clone();
            let seen = seen.clone();
            move |v: i64| {
                seen.lock().unwrap().push(v);
                if v == 5 {
                    token.cancel();
                }
            }
        };
        let produced = Generator::new(SequenceSource::new(), token, observer)
            .run(tx)
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Some(v) = rx.recv().await {
            received.push(v);
        }
        assert_eq!(produced, 5);
        assert_eq!(received, vec![1, 2, 3, 4, 5]);
        assert_eq!(*seen.lock().unwrap(), received);
    }

    #[tokio::test]
    async fn closes_lane_on_exhaustion() {
        let (tx, mut rx) = mpsc::channel(8);
        let produced = Generator::new(SequenceSource::up_to(3), CancellationToken::new(), |_| {})
            .run(tx)
            .await
            .unwrap();

        assert_eq!(produced, 3);
        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(rx.recv().await, Some(3));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn dropped_consumer_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let result = Generator::new(SequenceSource::new(), CancellationToken::new(), |_| {})
            .run(tx)
            .await;
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }
}
