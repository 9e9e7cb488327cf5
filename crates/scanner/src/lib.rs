//! Market scan pipeline.
//!
//! Stages, in order:
//! - [`selector`]: budget cap and sampling over the price list
//! - [`volume`]: latest daily volume and liquidity floor
//! - [`orderbook`]: best buy / best sell from live orders
//! - [`profit`]: spread, ROI, and fee-adjusted profit
//! - [`ranker`]: final thresholds and deterministic ordering
//!
//! [`pipeline::ScanPipeline`] wires them together and [`report`] renders the
//! result.

pub mod error;
pub mod memory;
pub mod orderbook;
pub mod pipeline;
pub mod profit;
pub mod ranker;
pub mod report;
pub mod selector;
pub mod volume;

pub use error::{ScanError, SkippedItem, Stage};
pub use memory::InMemoryMarketData;
pub use pipeline::{ScanOutcome, ScanPipeline, StageCounts};
pub use report::{render, ReportFormat};

/// Items that made it through a fetching stage, plus the ones dropped on error.
#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedItem>,
}

impl<T> Default for StageOutput<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}
