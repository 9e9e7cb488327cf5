//! CLI command for the market scan.
//!
//! Samples the region's price list, filters for liquidity, reads live order
//! books, and prints the opportunities with the best post-fee margin.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use market_scan_core::config::{
    DEFAULT_CONCURRENCY, DEFAULT_MIN_DAILY_VOLUME, DEFAULT_REGION_ID, DEFAULT_SAMPLE_SIZE,
    DEFAULT_TOP_N,
};
use market_scan_core::{AppConfig, ConfigLoader, RankBy, ScanConfig};
use market_scan_esi::EsiClient;
use market_scan_scanner::{render, ReportFormat, ScanPipeline};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankByArg {
    NetProfit,
    Spread,
}

impl From<RankByArg> for RankBy {
    fn from(arg: RankByArg) -> Self {
        match arg {
            RankByArg::NetProfit => Self::NetProfit,
            RankByArg::Spread => Self::Spread,
        }
    }
}

/// Arguments for the scan command.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// EVE region ID (default: The Forge).
    #[arg(long, default_value_t = DEFAULT_REGION_ID)]
    pub region_id: u32,

    /// How many results to show.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,

    /// How many candidate items to scan before ranking.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Maximum best-buy price to include in results (ISK).
    #[arg(long, default_value = "250000000", allow_negative_numbers = true)]
    pub max_buy_price: Decimal,

    /// Minimum latest daily trade volume required (units/day).
    #[arg(long, default_value_t = DEFAULT_MIN_DAILY_VOLUME)]
    pub min_daily_volume: u64,

    /// Sales tax percentage applied to the sell side.
    #[arg(long, default_value = "4.5", allow_negative_numbers = true)]
    pub sales_tax_pct: Decimal,

    /// Broker fee percentage applied to the buy side.
    #[arg(long, default_value = "3.0", allow_negative_numbers = true)]
    pub broker_fee_pct: Decimal,

    /// Minimum post-fee profit per unit to include.
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub min_net_profit: Decimal,

    /// Sort key for the final ranking.
    #[arg(long, value_enum, default_value_t = RankByArg::NetProfit)]
    pub rank_by: RankByArg,

    /// Concurrent per-item lookups within a stage.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Also write the report to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Client settings file (default: config/Config.toml).
    #[arg(short, long, env = "MARKET_SCAN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ScanArgs {
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_region_id(self.region_id)
            .with_top_n(self.top)
            .with_sample_size(self.sample_size)
            .with_max_buy_price(self.max_buy_price)
            .with_min_daily_volume(self.min_daily_volume)
            .with_fees(self.sales_tax_pct, self.broker_fee_pct)
            .with_min_net_profit(self.min_net_profit)
            .with_rank_by(self.rank_by.into())
            .with_concurrency(self.concurrency)
    }

    #[must_use]
    pub fn format(&self) -> ReportFormat {
        if self.json {
            ReportFormat::Json
        } else {
            ReportFormat::Text
        }
    }

    fn load_settings(&self) -> Result<AppConfig> {
        match &self.config {
            Some(path) => ConfigLoader::load_from(path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => ConfigLoader::load().context("failed to load config"),
        }
    }
}

/// Runs a scan and prints the report.
pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let settings = args.load_settings()?;
    let client = EsiClient::from_settings(&settings.esi).context("failed to create ESI client")?;
    info!("Using ESI at {}", client.base_url());

    let report = scan(client, &args).await?;
    write_output(&report, args.output.as_deref())
}

async fn scan(client: EsiClient, args: &ScanArgs) -> Result<String> {
    let pipeline = ScanPipeline::new(Arc::new(client), args.scan_config())
        .context("invalid scan options")?;

    let outcome = pipeline
        .run()
        .await
        .context("failed to query EVE ESI API")?;

    render(&outcome, args.format()).context("failed to render report")
}

/// Prints the report and optionally writes it to `output_path`.
fn write_output(report: &str, output_path: Option<&Path>) -> Result<()> {
    let content = report.trim_end_matches('\n');
    println!("{content}");

    if let Some(path) = output_path {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }
        std::fs::write(path, format!("{content}\n"))
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
