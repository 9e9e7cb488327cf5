use market_scan_core::{Opportunity, RankBy, ScanConfig};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tracing::info;

#[derive(Debug, Clone, Copy)]
pub struct RankingCriteria {
    pub max_buy_price: Decimal,
    pub min_daily_volume: u64,
    pub min_net_profit: Decimal,
    pub rank_by: RankBy,
    pub top_n: usize,
}

impl From<&ScanConfig> for RankingCriteria {
    fn from(config: &ScanConfig) -> Self {
        Self {
            max_buy_price: config.max_buy_price,
            min_daily_volume: config.min_daily_volume,
            min_net_profit: config.min_net_profit,
            rank_by: config.rank_by,
            top_n: config.top_n,
        }
    }
}

/// Filters, orders, and truncates priced opportunities.
#[must_use]
pub fn rank(candidates: Vec<Opportunity>, criteria: &RankingCriteria) -> Vec<Opportunity> {
    let evaluated = candidates.len();

    let mut approved: Vec<Opportunity> = candidates
        .into_iter()
        .filter(|o| meets_criteria(o, criteria))
        .collect();

    approved.sort_by(|a, b| compare(a, b, criteria.rank_by));
    approved.truncate(criteria.top_n);

    info!(
        "Ranking complete: {} opportunities reported out of {} priced",
        approved.len(),
        evaluated
    );

    approved
}

fn meets_criteria(opportunity: &Opportunity, criteria: &RankingCriteria) -> bool {
    opportunity.spread > Decimal::ZERO
        && opportunity.best_buy_price <= criteria.max_buy_price
        && opportunity.daily_volume >= criteria.min_daily_volume
        && opportunity.net_profit_per_unit >= criteria.min_net_profit
}

/// Total order: primary key descending, secondary key descending, id ascending.
fn compare(a: &Opportunity, b: &Opportunity, rank_by: RankBy) -> Ordering {
    let by_net = b.net_profit_per_unit.cmp(&a.net_profit_per_unit);
    let by_spread = b.spread.cmp(&a.spread);

    match rank_by {
        RankBy::NetProfit => by_net.then(by_spread),
        RankBy::Spread => by_spread.then(by_net),
    }
    .then_with(|| a.item_type_id.cmp(&b.item_type_id))
}
