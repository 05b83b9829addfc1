//! # Self-verifying fan-out/fan-in pipeline
//!
//! A generator pushes 1, 2, 3, ... onto a single lane until a deadline
//! cancels it. A fixed pool of workers relays items onto one lane each, a
//! fan-in stage merges those lanes back together, and a sink tallies what
//! arrives. Once everything has drained, the totals seen at the source are
//! checked against the totals seen at the sink.
//!
//! ## Core Concepts
//!
//! - **Source**: yields values for the generator
//! - **Worker**: relays items from the shared input lane to its own lane
//! - **Collector**: merges one worker lane into the shared merged lane
//! - **Sink**: absorbs the merged stream
//! - **Report**: the totals, checked for conservation
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use fanweld::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = PipelineConfig::new()
//!         .workers(4)
//!         .deadline(Duration::from_millis(20));
//!
//!     let report = Pipeline::new(config).run_verified().await?;
//!     assert_eq!(report.source_count, report.sink_count);
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod sinks;
pub mod sources;
pub mod state;
pub mod traits;
pub mod util;
pub mod verify;

/// The value type carried through every lane
pub type Item = i64;

// Re-export commonly used items
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::error::{Error, Result, Violation};
    pub use crate::pipeline::{Phase, Pipeline};
    pub use crate::sinks::TallySink;
    pub use crate::sources::SequenceSource;
    pub use crate::traits::{Sink, Source};
    pub use crate::verify::Report;
    pub use crate::Item;
}

// Re-export main error type
pub use error::{Error, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
