//! Fixed-response market data source.
//!
//! Serves canned price lists, histories, and order books so a scan can be
//! replayed deterministically without network access.

use async_trait::async_trait;
use market_scan_core::{FetchError, ItemTypeId, MarketDataClient, MarketOrder, RegionId};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Which lookup an `InMemoryMarketData` served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    PriceList,
    History(ItemTypeId),
    OrderBook(ItemTypeId),
    Names,
}

/// In-memory `MarketDataClient`.
///
/// Items without a configured history have none (`Ok(None)`); items without
/// a configured book have no open orders.
#[derive(Debug, Default)]
pub struct InMemoryMarketData {
    prices: BTreeMap<ItemTypeId, Decimal>,
    price_list_error: Option<FetchError>,
    volumes: HashMap<ItemTypeId, Result<Option<u64>, FetchError>>,
    books: HashMap<ItemTypeId, Result<Vec<MarketOrder>, FetchError>>,
    names: HashMap<ItemTypeId, String>,
    names_error: Option<FetchError>,
    lookups: Mutex<Vec<Lookup>>,
}

impl InMemoryMarketData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_price(mut self, item_type_id: ItemTypeId, average_price: Decimal) -> Self {
        self.prices.insert(item_type_id, average_price);
        self
    }

    #[must_use]
    pub fn with_price_list_error(mut self, error: FetchError) -> Self {
        self.price_list_error = Some(error);
        self
    }

    #[must_use]
    pub fn with_volume(mut self, item_type_id: ItemTypeId, daily_volume: u64) -> Self {
        self.volumes.insert(item_type_id, Ok(Some(daily_volume)));
        self
    }

    #[must_use]
    pub fn with_history_error(mut self, item_type_id: ItemTypeId, error: FetchError) -> Self {
        self.volumes.insert(item_type_id, Err(error));
        self
    }

    #[must_use]
    pub fn with_orders(mut self, item_type_id: ItemTypeId, orders: Vec<MarketOrder>) -> Self {
        self.books.insert(item_type_id, Ok(orders));
        self
    }

    #[must_use]
    pub fn with_book_error(mut self, item_type_id: ItemTypeId, error: FetchError) -> Self {
        self.books.insert(item_type_id, Err(error));
        self
    }

    #[must_use]
    pub fn with_name(mut self, item_type_id: ItemTypeId, name: impl Into<String>) -> Self {
        self.names.insert(item_type_id, name.into());
        self
    }

    #[must_use]
    pub fn with_names_error(mut self, error: FetchError) -> Self {
        self.names_error = Some(error);
        self
    }

    /// Every lookup served so far, in call order.
    #[must_use]
    pub fn lookups(&self) -> Vec<Lookup> {
        self.lookups.lock().clone()
    }

    fn record(&self, lookup: Lookup) {
        self.lookups.lock().push(lookup);
    }
}

#[async_trait]
impl MarketDataClient for InMemoryMarketData {
    async fn fetch_price_list(
        &self,
        _region_id: RegionId,
    ) -> Result<BTreeMap<ItemTypeId, Decimal>, FetchError> {
        self.record(Lookup::PriceList);
        match &self.price_list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.prices.clone()),
        }
    }

    async fn fetch_daily_volume(
        &self,
        _region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> Result<Option<u64>, FetchError> {
        self.record(Lookup::History(item_type_id));
        self.volumes
            .get(&item_type_id)
            .cloned()
            .unwrap_or(Ok(None))
    }

    async fn fetch_order_book(
        &self,
        _region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> Result<Vec<MarketOrder>, FetchError> {
        self.record(Lookup::OrderBook(item_type_id));
        self.books
            .get(&item_type_id)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_item_names(
        &self,
        item_type_ids: &[ItemTypeId],
    ) -> Result<HashMap<ItemTypeId, String>, FetchError> {
        self.record(Lookup::Names);
        if let Some(err) = &self.names_error {
            return Err(err.clone());
        }
        Ok(item_type_ids
            .iter()
            .filter_map(|id| self.names.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}
