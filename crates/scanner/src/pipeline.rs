//! End-to-end scan: price list to ranked opportunities.
//!
//! Stages run strictly in sequence because each one narrows the item set the
//! next one has to fetch. Only per-item lookups inside a stage overlap.

use crate::error::{ScanError, SkippedItem};
use crate::orderbook::analyze_order_books;
use crate::profit::estimate_all;
use crate::ranker::{rank, RankingCriteria};
use crate::selector::select_candidates;
use crate::volume::filter_by_volume;
use market_scan_core::{ConfigError, ItemTypeId, MarketDataClient, Opportunity, ScanConfig};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// How many items survived each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCounts {
    pub priced: usize,
    pub sampled: usize,
    pub liquid: usize,
    pub two_sided: usize,
    pub ranked: usize,
}

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanOutcome {
    pub config: ScanConfig,
    /// Ranked best first; empty when nothing qualified.
    pub opportunities: Vec<Opportunity>,
    /// Items dropped because a lookup failed.
    pub skipped: Vec<SkippedItem>,
    pub counts: StageCounts,
}

pub struct ScanPipeline<C: ?Sized> {
    client: Arc<C>,
    config: ScanConfig,
}

impl<C> ScanPipeline<C>
where
    C: MarketDataClient + ?Sized,
{
    /// Creates a pipeline over a validated configuration.
    ///
    /// # Errors
    /// Returns an error if any threshold in `config` is out of range.
    pub fn new(client: Arc<C>, config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { client, config })
    }

    /// Runs every stage once.
    ///
    /// # Errors
    /// Only a failed price-list fetch is fatal; per-item failures end up in
    /// `ScanOutcome::skipped`.
    pub async fn run(&self) -> Result<ScanOutcome, ScanError> {
        let config = &self.config;
        let client = self.client.as_ref();
        let mut counts = StageCounts::default();

        info!(
            "Scanning region {} (sample {}, max buy {}, min volume {})",
            config.region_id, config.sample_size, config.max_buy_price, config.min_daily_volume
        );

        let prices = client.fetch_price_list(config.region_id).await?;
        counts.priced = prices.len();

        let candidates = select_candidates(&prices, config);
        counts.sampled = candidates.len();

        let liquid = filter_by_volume(
            client,
            config.region_id,
            &candidates,
            config.min_daily_volume,
            config.concurrency,
        )
        .await;
        counts.liquid = liquid.items.len();

        let books =
            analyze_order_books(client, config.region_id, &liquid.items, config.concurrency).await;
        counts.two_sided = books.items.len();

        let priced = estimate_all(&books.items, config);
        let mut opportunities = rank(priced, &RankingCriteria::from(config));
        counts.ranked = opportunities.len();

        self.resolve_names(&mut opportunities).await;

        let mut skipped = liquid.skipped;
        skipped.extend(books.skipped);
        if !skipped.is_empty() {
            warn!("{} items skipped after failed lookups", skipped.len());
        }

        Ok(ScanOutcome {
            config: config.clone(),
            opportunities,
            skipped,
            counts,
        })
    }

    /// Replaces placeholder names; a failed lookup keeps the placeholders.
    async fn resolve_names(&self, opportunities: &mut [Opportunity]) {
        if opportunities.is_empty() {
            return;
        }

        let ids: Vec<ItemTypeId> = opportunities.iter().map(|o| o.item_type_id).collect();
        match self.client.fetch_item_names(&ids).await {
            Ok(names) => {
                for opportunity in opportunities.iter_mut() {
                    if let Some(name) = names.get(&opportunity.item_type_id) {
                        opportunity.name.clone_from(name);
                    }
                }
            }
            Err(e) => warn!(error = %e, "Name lookup failed, keeping type ids"),
        }
    }
}
