use market_scan_core::types::placeholder_name;
use market_scan_core::{Opportunity, OrderBookSnapshot, ScanConfig, VolumeSample};
use rust_decimal::Decimal;

/// Prices one item: spread, ROI, and profit after sales tax and broker fee.
///
/// Returns `None` unless both sides are quoted and the best buy is positive.
/// Nothing is rounded here.
#[must_use]
pub fn estimate(
    sample: &VolumeSample,
    snapshot: &OrderBookSnapshot,
    config: &ScanConfig,
) -> Option<Opportunity> {
    let (best_buy, best_sell) = snapshot.both_sides()?;
    if best_buy <= Decimal::ZERO {
        return None;
    }

    let spread = best_sell - best_buy;
    let roi_pct = spread / best_buy * Decimal::ONE_HUNDRED;
    let net_profit_per_unit =
        spread - best_sell * config.sales_tax_rate() - best_buy * config.broker_fee_rate();
    let net_roi_pct = net_profit_per_unit / best_buy * Decimal::ONE_HUNDRED;

    Some(Opportunity {
        item_type_id: sample.item_type_id,
        name: placeholder_name(sample.item_type_id),
        average_price: sample.average_price,
        daily_volume: sample.daily_volume,
        best_buy_price: best_buy,
        best_sell_price: best_sell,
        spread,
        roi_pct,
        net_profit_per_unit,
        net_roi_pct,
    })
}

/// Prices every analyzed item, keeping input order.
#[must_use]
pub fn estimate_all(
    books: &[(VolumeSample, OrderBookSnapshot)],
    config: &ScanConfig,
) -> Vec<Opportunity> {
    books
        .iter()
        .filter_map(|(sample, snapshot)| estimate(sample, snapshot, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn book(buy: Decimal, sell: Decimal) -> (VolumeSample, OrderBookSnapshot) {
        (
            VolumeSample {
                item_type_id: 5,
                average_price: dec!(15),
                daily_volume: 250,
            },
            OrderBookSnapshot {
                item_type_id: 5,
                best_buy_price: Some(buy),
                best_sell_price: Some(sell),
            },
        )
    }

    #[test]
    fn test_net_profit_after_fees() {
        let config = ScanConfig::default().with_fees(dec!(5), dec!(2));
        let (sample, snapshot) = book(dec!(12), dec!(18));

        let opp = estimate(&sample, &snapshot, &config).unwrap();

        assert_eq!(opp.spread, dec!(6));
        assert_eq!(opp.roi_pct, dec!(50));
        assert_eq!(opp.net_profit_per_unit, dec!(4.86));
        assert_eq!(opp.net_roi_pct, dec!(40.5));
        assert_eq!(opp.daily_volume, 250);
        assert_eq!(opp.name, "Type 5");
    }

    #[test]
    fn test_zero_fees_net_equals_spread() {
        let config = ScanConfig::default().with_fees(dec!(0), dec!(0));
        let (sample, snapshot) = book(dec!(100), dec!(103.5));

        let opp = estimate(&sample, &snapshot, &config).unwrap();

        assert_eq!(opp.net_profit_per_unit, opp.spread);
        assert_eq!(opp.roi_pct, dec!(3.5));
    }

    #[test]
    fn test_crossed_book_has_negative_spread() {
        let config = ScanConfig::default();
        let (sample, snapshot) = book(dec!(20), dec!(18));

        let opp = estimate(&sample, &snapshot, &config).unwrap();

        assert_eq!(opp.spread, dec!(-2));
        assert!(opp.net_profit_per_unit < Decimal::ZERO);
    }

    #[test]
    fn test_missing_side_is_not_priced() {
        let (sample, mut snapshot) = book(dec!(12), dec!(18));
        snapshot.best_sell_price = None;
        assert!(estimate(&sample, &snapshot, &ScanConfig::default()).is_none());
    }

    #[test]
    fn test_zero_buy_is_not_priced() {
        let (sample, snapshot) = book(dec!(0), dec!(18));
        assert!(estimate(&sample, &snapshot, &ScanConfig::default()).is_none());
    }

    #[test]
    fn test_estimate_all_keeps_order() {
        let config = ScanConfig::default();
        let mut first = book(dec!(1), dec!(2));
        first.0.item_type_id = 9;
        let second = book(dec!(3), dec!(4));

        let opps = estimate_all(&[first, second], &config);

        let ids: Vec<u32> = opps.iter().map(|o| o.item_type_id).collect();
        assert_eq!(ids, vec![9, 5]);
    }
}
