//! Core traits for the pipeline's edges.
//!
//! A [`Source`] feeds the generator at the head of the pipeline and a
//! [`Sink`] absorbs the merged stream at its tail. The stages in between are
//! fixed relays and need no trait of their own.

use crate::error::Result;
use async_trait::async_trait;

/// A source yields the values the generator puts on the input lane.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use fanweld::error::Result;
/// use fanweld::traits::Source;
///
/// struct Evens {
///     next: i64,
/// }
///
/// #[async_trait]
/// impl Source for Evens {
///     type Item = i64;
///
///     async fn produce(&mut self) -> Result<Option<Self::Item>> {
///         self.next += 2;
///         Ok(Some(self.next))
///     }
/// }
/// ```
#[async_trait]
pub trait Source {
    /// The type of items this source generates
    type Item: Send + 'static;

    /// Produce the next item, or None if the source is exhausted.
    async fn produce(&mut self) -> Result<Option<Self::Item>>;
}

/// A sink drains the merged lane.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use fanweld::error::Result;
/// use fanweld::traits::Sink;
///
/// struct Max(i64);
///
/// #[async_trait]
/// impl Sink for Max {
///     type Item = i64;
///
///     async fn consume(&mut self, item: Self::Item) -> Result<()> {
///         self.0 = self.0.max(item);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Sink {
    /// The type of items this sink accepts
    type Item: Send + 'static;

    /// Absorb a single item.
    async fn consume(&mut self, item: Self::Item) -> Result<()>;

    /// Called once the merged lane is closed and drained.
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
