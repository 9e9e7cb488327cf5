#![allow(clippy::format_push_string)]

//! Text and JSON rendering of a scan outcome.
//!
//! This is the only place values are rounded.

use crate::pipeline::ScanOutcome;
use market_scan_core::{ItemTypeId, Opportunity};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Renders a scan outcome.
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn render(outcome: &ScanOutcome, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(outcome)),
        ReportFormat::Json => render_json(outcome),
    }
}

// =============================================================================
// Text
// =============================================================================

#[must_use]
pub fn render_text(outcome: &ScanOutcome) -> String {
    let config = &outcome.config;
    let mut output = String::new();

    if outcome.opportunities.is_empty() {
        output.push_str("No profitable opportunities found in current sample.\n");
        output.push_str(
            "Pipeline checks: average price cap -> daily volume -> fees/taxes -> net profit.\n",
        );
        output.push_str(&format!(
            "Current filters: min daily volume={}, min net profit={}.\n",
            group_thousands(Decimal::from(config.min_daily_volume), 0),
            group_thousands(config.min_net_profit, 2)
        ));
    } else {
        output.push_str(&format!(
            "Top {} opportunities in region {} (sampled {}, min daily vol {}, tax {:.2}%, broker {:.2}%):\n",
            outcome.opportunities.len(),
            config.region_id,
            config.sample_size,
            group_thousands(Decimal::from(config.min_daily_volume), 0),
            config.sales_tax_pct,
            config.broker_fee_pct
        ));
        for (index, opportunity) in outcome.opportunities.iter().enumerate() {
            output.push_str(&format_row(index + 1, opportunity));
            output.push('\n');
        }
    }

    if !outcome.skipped.is_empty() {
        output.push_str(&format!(
            "{} items skipped after failed lookups.\n",
            outcome.skipped.len()
        ));
        let transient = outcome.skipped.iter().filter(|s| s.transient).count();
        if transient > 0 {
            output.push_str(&format!(
                "{transient} of them failed transiently and may succeed on a rerun.\n"
            ));
        }
    }

    output
}

fn format_row(rank: usize, o: &Opportunity) -> String {
    format!(
        "{rank:>2}. {:<24} buy={:>14} sell={:>14} spread={:>13} roi={:>6}% net={:>13} net_roi={:>6}% daily_vol={:>9}",
        o.name,
        group_thousands(o.best_buy_price, 2),
        group_thousands(o.best_sell_price, 2),
        group_thousands(o.spread, 2),
        round2(o.roi_pct),
        group_thousands(o.net_profit_per_unit, 2),
        round2(o.net_roi_pct),
        group_thousands(Decimal::from(o.daily_volume), 0),
    )
}

fn round2(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Formats `value` with `dp` decimals and comma-separated thousands.
#[must_use]
pub fn group_thousands(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.*}", dp as usize, rounded.abs());
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(plain.len() + digits.len() / 3 + 1);
    if rounded < Decimal::ZERO {
        grouped.push('-');
    }
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

// =============================================================================
// JSON
// =============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    region_id: u32,
    sample_size: usize,
    min_daily_volume: u64,
    #[serde(with = "rust_decimal::serde::float")]
    sales_tax_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    broker_fee_pct: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    min_net_profit: Decimal,
    count: usize,
    skipped: usize,
    opportunities: Vec<JsonOpportunity<'a>>,
}

#[derive(Serialize)]
struct JsonOpportunity<'a> {
    rank: usize,
    type_id: ItemTypeId,
    name: &'a str,
    #[serde(with = "rust_decimal::serde::float")]
    best_buy: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    best_sell: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    spread: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    roi_pct: Decimal,
    daily_volume: u64,
    #[serde(with = "rust_decimal::serde::float")]
    net_profit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    net_roi_pct: Decimal,
}

/// Renders the outcome as a pretty-printed JSON document.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn render_json(outcome: &ScanOutcome) -> serde_json::Result<String> {
    let config = &outcome.config;
    let report = JsonReport {
        region_id: config.region_id,
        sample_size: config.sample_size,
        min_daily_volume: config.min_daily_volume,
        sales_tax_pct: config.sales_tax_pct,
        broker_fee_pct: config.broker_fee_pct,
        min_net_profit: config.min_net_profit,
        count: outcome.opportunities.len(),
        skipped: outcome.skipped.len(),
        opportunities: outcome
            .opportunities
            .iter()
            .enumerate()
            .map(|(index, o)| JsonOpportunity {
                rank: index + 1,
                type_id: o.item_type_id,
                name: &o.name,
                best_buy: o.best_buy_price,
                best_sell: o.best_sell_price,
                spread: o.spread,
                roi_pct: o.roi_pct,
                daily_volume: o.daily_volume,
                net_profit: o.net_profit_per_unit,
                net_roi_pct: o.net_roi_pct,
            })
            .collect(),
    };

    serde_json::to_string_pretty(&report)
}
