use crate::error::{SkippedItem, Stage};
use crate::StageOutput;
use futures_util::stream::{self, StreamExt};
use market_scan_core::{MarketDataClient, OrderBookSnapshot, RegionId, VolumeSample};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Returns true when the snapshot can be priced: both sides present and a
/// strictly positive best buy.
#[must_use]
pub fn is_tradeable(snapshot: &OrderBookSnapshot) -> bool {
    matches!(snapshot.both_sides(), Some((buy, _)) if buy > Decimal::ZERO)
}

/// Fetches the live book of every sample and keeps the two-sided ones.
///
/// Lookups run `concurrency` at a time; output keeps the input order. A failed
/// lookup drops only that item and is reported in `skipped`.
pub async fn analyze_order_books<C>(
    client: &C,
    region_id: RegionId,
    samples: &[VolumeSample],
    concurrency: usize,
) -> StageOutput<(VolumeSample, OrderBookSnapshot)>
where
    C: MarketDataClient + ?Sized,
{
    let lookups: Vec<_> = stream::iter(samples.iter().copied())
        .map(|sample| async move {
            let orders = client
                .fetch_order_book(region_id, sample.item_type_id)
                .await;
            (sample, orders)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut output = StageOutput::default();
    for (sample, orders) in lookups {
        match orders {
            Ok(orders) => {
                let snapshot = OrderBookSnapshot::from_orders(sample.item_type_id, &orders);
                if is_tradeable(&snapshot) {
                    output.items.push((sample, snapshot));
                } else {
                    debug!(type_id = sample.item_type_id, "No two-sided book");
                }
            }
            Err(e) => {
                warn!(
                    type_id = sample.item_type_id,
                    error = %e,
                    "Order book lookup failed, dropping item"
                );
                output
                    .skipped
                    .push(SkippedItem::new(sample.item_type_id, Stage::OrderBook, &e));
            }
        }
    }

    info!(
        "Order book analysis complete: {} of {} items have both sides quoted",
        output.items.len(),
        samples.len()
    );

    output
}
