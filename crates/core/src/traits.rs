use crate::error::FetchError;
use crate::types::{ItemTypeId, MarketOrder, RegionId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Remote market-data lookups the scan pipeline depends on.
#[async_trait]
pub trait MarketDataClient: Send + Sync {
    /// Average price for every item type with market data.
    async fn fetch_price_list(
        &self,
        region_id: RegionId,
    ) -> Result<BTreeMap<ItemTypeId, Decimal>, FetchError>;

    /// Volume of the most recent recorded trading day, `None` without history.
    async fn fetch_daily_volume(
        &self,
        region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> Result<Option<u64>, FetchError>;

    /// All open buy and sell orders for an item in a region.
    async fn fetch_order_book(
        &self,
        region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> Result<Vec<MarketOrder>, FetchError>;

    /// Display names for item types. Unknown ids are simply absent.
    async fn fetch_item_names(
        &self,
        _item_type_ids: &[ItemTypeId],
    ) -> Result<HashMap<ItemTypeId, String>, FetchError> {
        Ok(HashMap::new())
    }
}
