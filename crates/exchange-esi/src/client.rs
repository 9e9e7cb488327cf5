//! ESI REST client with rate limiting.
//!
//! Provides typed access to the public market endpoints of the EVE Swagger
//! Interface with automatic rate limiting using the governor crate.
//!
//! # Example
//!
//! ```ignore
//! use market_scan_esi::{EsiClient, EsiClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = EsiClient::new(EsiClientConfig::default())?;
//!
//!     let prices = client.get_market_prices().await?;
//!     println!("Found {} priced items", prices.len());
//!
//!     let orders = client.get_region_orders(10000002, 34).await?;
//!     println!("Tritanium has {} open orders in The Forge", orders.len());
//!
//!     Ok(())
//! }
//! ```

use crate::error::{EsiError, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use market_scan_core::{
    EsiConfig, FetchError, ItemTypeId, MarketDataClient, MarketOrder, RegionId,
};
use nonzero_ext::nonzero;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroU32;
use std::sync::Arc;

// =============================================================================
// Constants
// =============================================================================

/// ESI base URL (latest route).
pub const ESI_BASE_URL: &str = "https://esi.evetech.net/latest";

/// Datasource for the live game server.
pub const ESI_DATASOURCE: &str = "tranquility";

/// `/universe/names/` accepts at most this many ids per request.
pub const MAX_NAMES_PER_REQUEST: usize = 1000;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the ESI client.
#[derive(Debug, Clone)]
pub struct EsiClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// `datasource` query parameter.
    pub datasource: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header; ESI asks callers to identify themselves.
    pub user_agent: String,
}

impl Default for EsiClientConfig {
    fn default() -> Self {
        Self {
            base_url: ESI_BASE_URL.to_string(),
            datasource: ESI_DATASOURCE.to_string(),
            requests_per_minute: nonzero!(600u32),
            timeout_secs: 20,
            user_agent: concat!("market-scan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TryFrom<&EsiConfig> for EsiClientConfig {
    type Error = EsiError;

    fn try_from(config: &EsiConfig) -> Result<Self> {
        let requests_per_minute = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            EsiError::Configuration("requests_per_minute must be at least 1".to_string())
        })?;

        Ok(Self {
            datasource: config.datasource.clone(),
            user_agent: config.user_agent.clone(),
            ..Self::default()
        }
        .with_base_url(config.base_url.trim_end_matches('/'))
        .with_rate_limit(requests_per_minute)
        .with_timeout_secs(config.timeout_secs))
    }
}

impl EsiClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Entry of `GET /markets/prices/`.
#[derive(Debug, Clone, Deserialize)]
struct RawMarketPrice {
    type_id: ItemTypeId,
    average_price: Option<f64>,
}

/// Entry of `GET /markets/{region_id}/history/`.
#[derive(Debug, Clone, Deserialize)]
struct RawHistoryDay {
    /// `YYYY-MM-DD`, so lexical order is chronological.
    date: String,
    volume: u64,
}

/// Entry of `GET /markets/{region_id}/orders/`.
#[derive(Debug, Clone, Deserialize)]
struct RawOrder {
    is_buy_order: bool,
    price: f64,
}

/// Entry of `POST /universe/names/`.
#[derive(Debug, Clone, Deserialize)]
struct RawName {
    id: ItemTypeId,
    name: String,
}

/// Decodes each array element independently, dropping malformed ones.
fn decode_entries<T: DeserializeOwned>(payload: serde_json::Value) -> Vec<T> {
    match payload {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

fn parse_prices(payload: serde_json::Value) -> BTreeMap<ItemTypeId, Decimal> {
    decode_entries::<RawMarketPrice>(payload)
        .into_iter()
        .filter_map(|raw| {
            raw.average_price
                .and_then(to_decimal)
                .map(|price| (raw.type_id, price))
        })
        .collect()
}

fn parse_latest_volume(payload: serde_json::Value) -> Option<u64> {
    decode_entries::<RawHistoryDay>(payload)
        .into_iter()
        .max_by(|a, b| a.date.cmp(&b.date))
        .map(|day| day.volume)
}

fn parse_orders(payload: serde_json::Value) -> Vec<MarketOrder> {
    decode_entries::<RawOrder>(payload)
        .into_iter()
        .filter_map(|raw| {
            to_decimal(raw.price).map(|price| MarketOrder {
                is_buy_order: raw.is_buy_order,
                price,
            })
        })
        .collect()
}

// =============================================================================
// EsiClient
// =============================================================================

/// ESI REST API client.
///
/// All requests are rate-limited; ESI market endpoints need no authentication.
pub struct EsiClient {
    /// Configuration.
    config: EsiClientConfig,

    /// HTTP client.
    http: Client,

    /// Rate limiter.
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for EsiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EsiClient")
            .field("base_url", &self.config.base_url)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl EsiClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: EsiClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| EsiError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    /// Creates a client from the file/env configuration section.
    ///
    /// # Errors
    /// Returns error if the settings are invalid.
    pub fn from_settings(settings: &EsiConfig) -> Result<Self> {
        Self::new(EsiClientConfig::try_from(settings)?)
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Waits for the rate limiter and sends a request.
    ///
    /// Returns the decoded body and the `X-Pages` header (1 when absent).
    async fn send(&self, request: RequestBuilder) -> Result<(serde_json::Value, u32)> {
        self.rate_limiter.until_ready().await;

        let response = request
            .header("Accept", "application/json")
            .query(&[("datasource", self.config.datasource.as_str())])
            .send()
            .await?;

        tracing::debug!(url = %response.url(), status = %response.status(), "ESI response");

        let status = response.status();

        // 420 is ESI's error-limit signal, 429 the generic one.
        if status.as_u16() == 420 || status.as_u16() == 429 {
            let retry_after = ["Retry-After", "X-ESI-Error-Limit-Reset"]
                .iter()
                .find_map(|name| {
                    response
                        .headers()
                        .get(*name)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                })
                .unwrap_or(60);
            return Err(EsiError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(EsiError::api(status.as_u16(), text));
        }

        let pages = response
            .headers()
            .get("X-Pages")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(1)
            .max(1);

        let body = response.json::<serde_json::Value>().await?;
        Ok((body, pages))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // =========================================================================
    // Market Endpoints
    // =========================================================================

    /// Gets universe-wide average prices keyed by type id.
    ///
    /// Entries without a numeric `average_price` are skipped.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_market_prices(&self) -> Result<BTreeMap<ItemTypeId, Decimal>> {
        let (payload, _) = self.send(self.http.get(self.url("/markets/prices/"))).await?;
        Ok(parse_prices(payload))
    }

    /// Gets the volume of the latest day in an item's regional history.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_latest_daily_volume(
        &self,
        region_id: RegionId,
        type_id: ItemTypeId,
    ) -> Result<Option<u64>> {
        let path = format!("/markets/{region_id}/history/");
        let request = self
            .http
            .get(self.url(&path))
            .query(&[("type_id", type_id)]);

        let (payload, _) = self.send(request).await?;
        Ok(parse_latest_volume(payload))
    }

    /// Gets every open order for an item in a region, following `X-Pages`.
    ///
    /// # Errors
    /// Returns error if any page fails.
    pub async fn get_region_orders(
        &self,
        region_id: RegionId,
        type_id: ItemTypeId,
    ) -> Result<Vec<MarketOrder>> {
        let path = format!("/markets/{region_id}/orders/");
        let (first, pages) = self.send(self.order_page(&path, type_id, 1)).await?;
        let mut orders = parse_orders(first);

        if pages > 1 {
            tracing::debug!(type_id, pages, "order book spans multiple pages");
        }

        for page in 2..=pages {
            let (payload, _) = self.send(self.order_page(&path, type_id, page)).await?;
            orders.extend(parse_orders(payload));
        }

        Ok(orders)
    }

    fn order_page(&self, path: &str, type_id: ItemTypeId, page: u32) -> RequestBuilder {
        self.http.get(self.url(path)).query(&[
            ("order_type", "all".to_string()),
            ("type_id", type_id.to_string()),
            ("page", page.to_string()),
        ])
    }

    // =========================================================================
    // Universe Endpoints
    // =========================================================================

    /// Resolves type ids to names.
    ///
    /// # Errors
    /// Returns error if any chunk fails.
    pub async fn get_names(&self, ids: &[ItemTypeId]) -> Result<HashMap<ItemTypeId, String>> {
        let mut names = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(MAX_NAMES_PER_REQUEST) {
            let request = self.http.post(self.url("/universe/names/")).json(chunk);
            let (payload, _) = self.send(request).await?;
            names.extend(
                decode_entries::<RawName>(payload)
                    .into_iter()
                    .map(|raw| (raw.id, raw.name)),
            );
        }

        Ok(names)
    }
}

#[async_trait]
impl MarketDataClient for EsiClient {
    async fn fetch_price_list(
        &self,
        region_id: RegionId,
    ) -> std::result::Result<BTreeMap<ItemTypeId, Decimal>, FetchError> {
        tracing::debug!(region_id, "ESI price list is universe-wide");
        Ok(self.get_market_prices().await?)
    }

    async fn fetch_daily_volume(
        &self,
        region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> std::result::Result<Option<u64>, FetchError> {
        Ok(self.get_latest_daily_volume(region_id, item_type_id).await?)
    }

    async fn fetch_order_book(
        &self,
        region_id: RegionId,
        item_type_id: ItemTypeId,
    ) -> std::result::Result<Vec<MarketOrder>, FetchError> {
        Ok(self.get_region_orders(region_id, item_type_id).await?)
    }

    async fn fetch_item_names(
        &self,
        item_type_ids: &[ItemTypeId],
    ) -> std::result::Result<HashMap<ItemTypeId, String>, FetchError> {
        if item_type_ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self.get_names(item_type_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_scan_core::OrderBookSnapshot;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> EsiClient {
        EsiClient::new(EsiClientConfig::default().with_base_url(server.uri())).unwrap()
    }

    // ==================== Payload Parsing Tests ====================

    #[test]
    fn test_parse_prices_skips_malformed_entries() {
        let payload = json!([
            {"type_id": 34, "average_price": 5.12, "adjusted_price": 4.9},
            {"type_id": 35, "adjusted_price": 10.0},
            {"type_id": "x", "average_price": 1.0},
            {"average_price": 2.0},
            "garbage",
            {"type_id": 36, "average_price": 100}
        ]);

        let prices = parse_prices(payload);

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[&34], dec!(5.12));
        assert_eq!(prices[&36], dec!(100));
    }

    #[test]
    fn test_parse_prices_non_array_payload() {
        assert!(parse_prices(json!({"error": "nope"})).is_empty());
    }

    #[test]
    fn test_latest_volume_uses_most_recent_date() {
        let payload = json!([
            {"date": "2026-10-15", "volume": 10, "average": 1.0},
            {"date": "2026-10-17", "volume": 300, "average": 1.0},
            {"date": "2026-10-16", "volume": 20, "average": 1.0}
        ]);

        assert_eq!(parse_latest_volume(payload), Some(300));
    }

    #[test]
    fn test_latest_volume_empty_history() {
        assert_eq!(parse_latest_volume(json!([])), None);
    }

    #[test]
    fn test_parse_orders_sides() {
        let payload = json!([
            {"order_id": 1, "is_buy_order": true, "price": 10.5, "volume_remain": 3},
            {"order_id": 2, "is_buy_order": false, "price": 12.0, "volume_remain": 1},
            {"order_id": 3, "price": 11.0}
        ]);

        let orders = parse_orders(payload);

        assert_eq!(
            orders,
            vec![MarketOrder::buy(dec!(10.5)), MarketOrder::sell(dec!(12))]
        );
    }

    #[test]
    fn test_config_from_settings_rejects_zero_rate() {
        let settings = EsiConfig {
            requests_per_minute: 0,
            ..EsiConfig::default()
        };
        assert!(matches!(
            EsiClientConfig::try_from(&settings),
            Err(EsiError::Configuration(_))
        ));
    }

    #[test]
    fn test_config_from_settings_trims_trailing_slash() {
        let settings = EsiConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..EsiConfig::default()
        };
        let config = EsiClientConfig::try_from(&settings).unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_config_from_settings_carries_limits() {
        let settings = EsiConfig {
            requests_per_minute: 150,
            timeout_secs: 5,
            datasource: "singularity".to_string(),
            ..EsiConfig::default()
        };
        let config = EsiClientConfig::try_from(&settings).unwrap();

        assert_eq!(config.requests_per_minute.get(), 150);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.datasource, "singularity");
    }

    // ==================== Mock Server Tests ====================

    #[tokio::test]
    async fn test_get_market_prices() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .and(query_param("datasource", "tranquility"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"type_id": 34, "average_price": 5.0},
                {"type_id": 587, "average_price": 350000.0}
            ])))
            .mount(&server)
            .await;

        let prices = client_for(&server).get_market_prices().await.unwrap();

        assert_eq!(prices.len(), 2);
        assert_eq!(prices[&587], dec!(350000));
    }

    #[tokio::test]
    async fn test_history_volume() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/history/"))
            .and(query_param("type_id", "34"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"date": "2026-10-16", "volume": 1000},
                {"date": "2026-10-17", "volume": 1500}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let volume = client.fetch_daily_volume(10_000_002, 34).await.unwrap();

        assert_eq!(volume, Some(1500));
    }

    #[tokio::test]
    async fn test_orders_follow_pages() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/orders/"))
            .and(query_param("type_id", "5"))
            .and(query_param("page", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Pages", "2")
                    .set_body_json(json!([
                        {"is_buy_order": true, "price": 10.0},
                        {"is_buy_order": false, "price": 20.0}
                    ])),
            )
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/orders/"))
            .and(query_param("type_id", "5"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"is_buy_order": true, "price": 12.0},
                {"is_buy_order": false, "price": 18.0}
            ])))
            .mount(&server)
            .await;

        let orders = client_for(&server)
            .fetch_order_book(10_000_002, 5)
            .await
            .unwrap();

        assert_eq!(orders.len(), 4);
        assert!(orders.contains(&MarketOrder::buy(dec!(12))));
        assert!(orders.contains(&MarketOrder::sell(dec!(18))));
    }

    #[tokio::test]
    async fn test_orders_read_every_page_of_a_deep_book() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/orders/"))
            .and(query_param("type_id", "44992"))
            .and(query_param("page", "51"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"is_buy_order": false, "price": 11.0}
            ])))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/orders/"))
            .and(query_param("type_id", "44992"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("X-Pages", "51")
                    .set_body_json(json!([
                        {"is_buy_order": true, "price": 9.0},
                        {"is_buy_order": false, "price": 20.0}
                    ])),
            )
            .mount(&server)
            .await;

        let orders = client_for(&server)
            .fetch_order_book(10_000_002, 44992)
            .await
            .unwrap();
        let snapshot = OrderBookSnapshot::from_orders(44992, &orders);

        assert_eq!(orders.len(), 101);
        assert_eq!(snapshot.best_sell_price, Some(dec!(11)));
        assert_eq!(snapshot.best_buy_price, Some(dec!(9)));
        assert_eq!(server.received_requests().await.unwrap().len(), 51);
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/orders/"))
            .respond_with(ResponseTemplate::new(503).set_body_string("downtime"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_order_book(10_000_002, 5)
            .await
            .unwrap_err();

        assert_eq!(err, FetchError::api(503, "downtime"));
    }

    #[tokio::test]
    async fn test_error_limit_is_rate_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/10000002/history/"))
            .respond_with(
                ResponseTemplate::new(420).insert_header("X-ESI-Error-Limit-Reset", "17"),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_latest_daily_volume(10_000_002, 34)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EsiError::RateLimit {
                retry_after_secs: 17
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/markets/prices/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_price_list(10_000_002).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[tokio::test]
    async fn test_get_names() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/universe/names/"))
            .and(body_json(json!([34, 35])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 34, "name": "Tritanium", "category": "inventory_type"},
                {"id": 35, "name": "Pyerite", "category": "inventory_type"}
            ])))
            .mount(&server)
            .await;

        let names = client_for(&server).fetch_item_names(&[34, 35]).await.unwrap();

        assert_eq!(names.get(&34).map(String::as_str), Some("Tritanium"));
        assert_eq!(names.get(&35).map(String::as_str), Some("Pyerite"));
    }

    #[tokio::test]
    async fn test_get_names_empty_input_makes_no_request() {
        let server = MockServer::start().await;
        let names = client_for(&server).fetch_item_names(&[]).await.unwrap();
        assert!(names.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }
}
