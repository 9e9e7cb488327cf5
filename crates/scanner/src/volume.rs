use crate::error::{SkippedItem, Stage};
use crate::StageOutput;
use futures_util::stream::{self, StreamExt};
use market_scan_core::{MarketDataClient, PriceCandidate, RegionId, VolumeSample};
use tracing::{info, warn};

/// Attaches a history volume to a candidate if it clears the liquidity floor.
///
/// Missing history counts as zero volume, so it only passes a floor of zero.
#[must_use]
pub fn admit(
    candidate: PriceCandidate,
    daily_volume: Option<u64>,
    min_daily_volume: u64,
) -> Option<VolumeSample> {
    let daily_volume = match daily_volume {
        Some(volume) => volume,
        None if min_daily_volume == 0 => 0,
        None => return None,
    };

    (daily_volume >= min_daily_volume).then_some(VolumeSample {
        item_type_id: candidate.item_type_id,
        average_price: candidate.average_price,
        daily_volume,
    })
}

/// Looks up the latest daily volume of every candidate and keeps the liquid ones.
///
/// Lookups run `concurrency` at a time; output keeps the input order. A failed
/// lookup drops only that item and is reported in `skipped`.
pub async fn filter_by_volume<C>(
    client: &C,
    region_id: RegionId,
    candidates: &[PriceCandidate],
    min_daily_volume: u64,
    concurrency: usize,
) -> StageOutput<VolumeSample>
where
    C: MarketDataClient + ?Sized,
{
    let lookups: Vec<_> = stream::iter(candidates.iter().copied())
        .map(|candidate| async move {
            let volume = client
                .fetch_daily_volume(region_id, candidate.item_type_id)
                .await;
            (candidate, volume)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut output = StageOutput::default();
    for (candidate, volume) in lookups {
        match volume {
            Ok(volume) => {
                if let Some(sample) = admit(candidate, volume, min_daily_volume) {
                    output.items.push(sample);
                }
            }
            Err(e) => {
                warn!(
                    type_id = candidate.item_type_id,
                    error = %e,
                    "History lookup failed, dropping item"
                );
                output
                    .skipped
                    .push(SkippedItem::new(candidate.item_type_id, Stage::History, &e));
            }
        }
    }

    info!(
        "Volume filter complete: {} of {} candidates trade at least {} units/day",
        output.items.len(),
        candidates.len(),
        min_daily_volume
    );

    output
}
