//! Sources and the generator stage that drives them.
//!
//! This module provides the integer sequence fed into the pipeline and the
//! cancellation-aware generator that pushes it onto the input lane.

use async_trait::async_trait;

use crate::error::Result;
use crate::traits::Source;
use crate::Item;

mod generator;

pub use generator::Generator;

/// A source yielding 1, 2, 3, ... without gaps
#[derive(Debug, Clone)]
pub struct SequenceSource {
    next: Item,
    limit: Option<Item>,
}

impl SequenceSource {
    /// Create an unbounded sequence starting at 1
    pub fn new() -> Self {
        Self {
            next: 1,
            limit: None,
        }
    }

    /// Create a sequence that stops after yielding `limit`
    pub fn up_to(limit: Item) -> Self {
        Self {
            next: 1,
            limit: Some(limit),
        }
    }

    /// The value the next call to `produce` will yield
    pub fn peek(&self) -> Item {
        self.next
    }
}

#[async_trait]
impl Source for SequenceSource {
    type Item = Item;

    async fn produce(&mut self) -> Result<Option<Self::Item>> {
        if let Some(limit) = self.limit {
            if self.next > limit {
                return Ok(None);
            }
        }

        let item = self.next;
        self.next += 1;
        Ok(Some(item))
    }
}

impl Default for SequenceSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequence_starts_at_one() {
        let mut source = SequenceSource::new();
        assert_eq!(source.produce().await.unwrap(), Some(1));
        assert_eq!(source.produce().await.unwrap(), Some(2));
        assert_eq!(source.peek(), 3);
    }

    #[tokio::test]
    async fn bounded_sequence_exhausts() {
        let mut source = SequenceSource::up_to(3);
        let mut items = Vec::new();
        while let Some(item) = source.produce().await.unwrap() {
            items.push(item);
        }
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(source.produce().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_bounded_sequence() {
        let mut source = SequenceSource::up_to(0);
        assert_eq!(source.produce().await.unwrap(), None);
    }
}
