//! Records passed between pipeline stages.
//!
//! All prices are `rust_decimal::Decimal` in the market's native currency
//! (ISK for EVE Online). Nothing here is rounded; rounding happens only when
//! a report is rendered.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// EVE item type identifier.
pub type ItemTypeId = u32;

/// Region identifier (The Forge is `10000002`).
pub type RegionId = u32;

/// An item from the price list, before any per-item lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceCandidate {
    pub item_type_id: ItemTypeId,
    pub average_price: Decimal,
}

/// A candidate with its most recent daily traded volume attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSample {
    pub item_type_id: ItemTypeId,
    pub average_price: Decimal,
    pub daily_volume: u64,
}

/// One open order from a region's order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub is_buy_order: bool,
    pub price: Decimal,
}

impl MarketOrder {
    #[must_use]
    pub const fn buy(price: Decimal) -> Self {
        Self {
            is_buy_order: true,
            price,
        }
    }

    #[must_use]
    pub const fn sell(price: Decimal) -> Self {
        Self {
            is_buy_order: false,
            price,
        }
    }
}

/// Top of book for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub item_type_id: ItemTypeId,
    /// Highest buy order price, `None` without buy orders.
    pub best_buy_price: Option<Decimal>,
    /// Lowest sell order price, `None` without sell orders.
    pub best_sell_price: Option<Decimal>,
}

impl OrderBookSnapshot {
    /// Builds a snapshot from raw orders.
    #[must_use]
    pub fn from_orders(item_type_id: ItemTypeId, orders: &[MarketOrder]) -> Self {
        let best_buy_price = orders
            .iter()
            .filter(|o| o.is_buy_order)
            .map(|o| o.price)
            .max();
        let best_sell_price = orders
            .iter()
            .filter(|o| !o.is_buy_order)
            .map(|o| o.price)
            .min();

        Self {
            item_type_id,
            best_buy_price,
            best_sell_price,
        }
    }

    /// Returns `(best_buy, best_sell)` when both sides are present.
    #[must_use]
    pub fn both_sides(&self) -> Option<(Decimal, Decimal)> {
        match (self.best_buy_price, self.best_sell_price) {
            (Some(buy), Some(sell)) => Some((buy, sell)),
            _ => None,
        }
    }
}

/// A fully priced trading opportunity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opportunity {
    pub item_type_id: ItemTypeId,
    /// Display name, `"Type {id}"` until names are resolved.
    pub name: String,
    pub average_price: Decimal,
    pub daily_volume: u64,
    pub best_buy_price: Decimal,
    pub best_sell_price: Decimal,
    /// `best_sell_price - best_buy_price`.
    pub spread: Decimal,
    /// `spread / best_buy_price * 100`.
    pub roi_pct: Decimal,
    /// Spread minus sales tax on the sell side and broker fee on the buy side.
    pub net_profit_per_unit: Decimal,
    /// `net_profit_per_unit / best_buy_price * 100`.
    pub net_roi_pct: Decimal,
}

/// Fallback label for an item whose name could not be resolved.
#[must_use]
pub fn placeholder_name(item_type_id: ItemTypeId) -> String {
    format!("Type {item_type_id}")
}
