use market_scan_core::{ConfigError, FetchError, ItemTypeId};
use serde::Serialize;
use thiserror::Error;

/// A scan could not produce a result at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to fetch price list: {0}")]
    Fetch(#[from] FetchError),
}

/// Pipeline stage that dropped an item after a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    History,
    OrderBook,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::History => write!(f, "history"),
            Self::OrderBook => write!(f, "order book"),
        }
    }
}

/// An item removed from a batch because its lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedItem {
    pub item_type_id: ItemTypeId,
    pub stage: Stage,
    pub reason: String,
    /// The lookup may succeed if the scan is rerun.
    pub transient: bool,
}

impl SkippedItem {
    pub fn new(item_type_id: ItemTypeId, stage: Stage, error: &FetchError) -> Self {
        Self {
            item_type_id,
            stage,
            reason: error.to_string(),
            transient: error.is_transient(),
        }
    }
}
