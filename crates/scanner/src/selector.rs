use market_scan_core::{ItemTypeId, PriceCandidate, ScanConfig};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::info;

/// Picks the price-list entries worth looking up in detail.
///
/// Keeps entries priced at or under `max_buy_price`, orders them by average
/// price descending (ties by item id ascending), and returns at most
/// `sample_size` of them.
#[must_use]
pub fn select_candidates(
    prices: &BTreeMap<ItemTypeId, Decimal>,
    config: &ScanConfig,
) -> Vec<PriceCandidate> {
    if config.sample_size == 0 {
        return Vec::new();
    }

    let mut affordable: Vec<PriceCandidate> = prices
        .iter()
        .filter(|(_, price)| **price <= config.max_buy_price)
        .map(|(&item_type_id, &average_price)| PriceCandidate {
            item_type_id,
            average_price,
        })
        .collect();

    affordable.sort_by(|a, b| {
        b.average_price
            .cmp(&a.average_price)
            .then_with(|| a.item_type_id.cmp(&b.item_type_id))
    });
    affordable.truncate(config.sample_size);

    info!(
        "Candidate selection complete: {} sampled out of {} priced items",
        affordable.len(),
        prices.len()
    );

    affordable
}
