//! EVE Swagger Interface (ESI) integration for the market scanner.
//!
//! This crate provides:
//! - REST client with rate limiting for the public ESI market endpoints
//! - Tolerant payload decoding (malformed entries are skipped, not fatal)
//! - A `MarketDataClient` implementation consumed by the scan pipeline
//!
//! # API Endpoints
//!
//! - `GET /markets/prices/` - Universe-wide average prices
//! - `GET /markets/{region_id}/history/` - Daily trade history for a type
//! - `GET /markets/{region_id}/orders/` - Open orders for a type (paged)
//! - `POST /universe/names/` - Resolve ids to names

pub mod client;
pub mod error;

pub use client::{EsiClient, EsiClientConfig, ESI_BASE_URL, ESI_DATASOURCE};
pub use error::{EsiError, Result};
