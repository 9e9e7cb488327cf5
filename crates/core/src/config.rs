use crate::error::ConfigError;
use crate::types::RegionId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The Forge (Jita).
pub const DEFAULT_REGION_ID: RegionId = 10_000_002;
pub const DEFAULT_TOP_N: usize = 25;
pub const DEFAULT_SAMPLE_SIZE: usize = 75;
pub const DEFAULT_MAX_BUY_PRICE: Decimal = Decimal::from_parts(250_000_000, 0, 0, false, 0);
pub const DEFAULT_MIN_DAILY_VOLUME: u64 = 100;
/// 4.5%
pub const DEFAULT_SALES_TAX_PCT: Decimal = Decimal::from_parts(45, 0, 0, false, 1);
/// 3.0%
pub const DEFAULT_BROKER_FEE_PCT: Decimal = Decimal::from_parts(3, 0, 0, false, 0);
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Client-side settings loaded from `config/Config.toml` and `APP_*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub esi: EsiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EsiConfig {
    pub base_url: String,
    pub datasource: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for EsiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://esi.evetech.net/latest".to_string(),
            datasource: "tranquility".to_string(),
            requests_per_minute: 600,
            timeout_secs: 20,
            user_agent: concat!("market-scan/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Sort key for the final ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    /// Post-fee profit per unit, then spread.
    #[default]
    NetProfit,
    /// Raw spread, then post-fee profit per unit.
    Spread,
}

/// Parameters for one scan. Built once, validated, then only read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub region_id: RegionId,
    /// Maximum number of opportunities to report.
    pub top_n: usize,
    /// Maximum number of price-list candidates to look up.
    pub sample_size: usize,
    pub max_buy_price: Decimal,
    pub min_daily_volume: u64,
    pub sales_tax_pct: Decimal,
    pub broker_fee_pct: Decimal,
    pub min_net_profit: Decimal,
    pub rank_by: RankBy,
    /// In-flight per-item requests within a stage.
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            region_id: DEFAULT_REGION_ID,
            top_n: DEFAULT_TOP_N,
            sample_size: DEFAULT_SAMPLE_SIZE,
            max_buy_price: DEFAULT_MAX_BUY_PRICE,
            min_daily_volume: DEFAULT_MIN_DAILY_VOLUME,
            sales_tax_pct: DEFAULT_SALES_TAX_PCT,
            broker_fee_pct: DEFAULT_BROKER_FEE_PCT,
            min_net_profit: Decimal::ZERO,
            rank_by: RankBy::NetProfit,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl ScanConfig {
    #[must_use]
    pub fn with_region_id(mut self, region_id: RegionId) -> Self {
        self.region_id = region_id;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    #[must_use]
    pub fn with_max_buy_price(mut self, max_buy_price: Decimal) -> Self {
        self.max_buy_price = max_buy_price;
        self
    }

    #[must_use]
    pub fn with_min_daily_volume(mut self, min_daily_volume: u64) -> Self {
        self.min_daily_volume = min_daily_volume;
        self
    }

    #[must_use]
    pub fn with_fees(mut self, sales_tax_pct: Decimal, broker_fee_pct: Decimal) -> Self {
        self.sales_tax_pct = sales_tax_pct;
        self.broker_fee_pct = broker_fee_pct;
        self
    }

    #[must_use]
    pub fn with_min_net_profit(mut self, min_net_profit: Decimal) -> Self {
        self.min_net_profit = min_net_profit;
        self
    }

    #[must_use]
    pub fn with_rank_by(mut self, rank_by: RankBy) -> Self {
        self.rank_by = rank_by;
        self
    }

    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sales tax as a fraction (4.5% -> 0.045).
    #[must_use]
    pub fn sales_tax_rate(&self) -> Decimal {
        self.sales_tax_pct / Decimal::ONE_HUNDRED
    }

    /// Broker fee as a fraction.
    #[must_use]
    pub fn broker_fee_rate(&self) -> Decimal {
        self.broker_fee_pct / Decimal::ONE_HUNDRED
    }

    /// Checks every threshold before a scan starts.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("max_buy_price", self.max_buy_price)?;
        non_negative("min_net_profit", self.min_net_profit)?;
        percentage("sales_tax_pct", self.sales_tax_pct)?;
        percentage("broker_fee_pct", self.broker_fee_pct)?;

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        Ok(())
    }
}

fn non_negative(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

fn percentage(field: &'static str, value: Decimal) -> Result<(), ConfigError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ConfigError::PercentOutOfRange { field, value });
    }
    Ok(())
}
