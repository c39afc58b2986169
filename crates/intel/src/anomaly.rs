//! Anomaly detection over one store's stock levels and sales.
//!
//! Demand shifts compare the trailing week against the full window. Ledger checks
//! look at on-hand and reserved counters. Dead stock is available stock with no sales.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockwise_core::StockedItemId;

use crate::aggregate::SalesAggregate;
use crate::demand::round_to;
use crate::model::{ItemRef, StockedItem};
use crate::params::TRAILING_WINDOW_DAYS;

/// Slow movers below this full-window rate (units/day) are too noisy to compare.
pub const DEMAND_NOISE_FLOOR: f64 = 0.3;

const SPIKE_RATIO: f64 = 2.0;
const HIGH_SPIKE_RATIO: f64 = 4.0;
const DROP_RATIO: f64 = 0.5;
const HIGH_DROP_RATIO: f64 = 0.2;

const DEAD_STOCK_HIGH: i64 = 50;
const DEAD_STOCK_MEDIUM: i64 = 10;

/// Triage tier. Declaration order is sort order: `High` first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Recent vs long-run demand comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandShiftDetails {
    pub trailing_days: u32,
    pub window_days: u32,
    pub trailing_daily_rate: f64,
    pub window_daily_rate: f64,
    pub ratio: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    NegativeOnHand,
    ReservedExceedsOnHand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMismatchDetails {
    pub reason: MismatchReason,
    pub on_hand: i64,
    pub reserved: i64,
    /// Units by which the ledger is inconsistent.
    pub magnitude: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadStockDetails {
    pub available_stock: i64,
    pub window_days: u32,
}

/// What was detected, with a payload specific to each kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum AnomalyKind {
    DemandSpike(DemandShiftDetails),
    DemandDrop(DemandShiftDetails),
    StockMismatch(StockMismatchDetails),
    DeadStock(DeadStockDetails),
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::DemandSpike(_) => "demand_spike",
            AnomalyKind::DemandDrop(_) => "demand_drop",
            AnomalyKind::StockMismatch(_) => "stock_mismatch",
            AnomalyKind::DeadStock(_) => "dead_stock",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(flatten)]
    pub item: ItemRef,
    pub severity: Severity,
    pub message: String,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

/// Inputs for one scan: both aggregations come from the same sales read.
pub struct AnomalyInput<'a> {
    pub items: &'a [StockedItem],
    pub window: &'a BTreeMap<StockedItemId, SalesAggregate>,
    pub trailing: &'a BTreeMap<StockedItemId, SalesAggregate>,
    pub window_days: u32,
}

/// Run every check. Output is grouped by check (spike/drop, mismatch, dead stock)
/// and, within a check, follows item order; ranking sorts it by severity.
pub fn detect(input: &AnomalyInput<'_>) -> Vec<Anomaly> {
    let mut out = Vec::new();
    out.extend(input.items.iter().filter_map(|item| {
        detect_demand_shift(
            item,
            input.window.get(&item.item_id),
            input.trailing.get(&item.item_id),
            input.window_days,
        )
    }));
    out.extend(input.items.iter().filter_map(detect_stock_mismatch));
    out.extend(input.items.iter().filter_map(|item| {
        detect_dead_stock(item, input.window.get(&item.item_id), input.window_days)
    }));
    out
}

/// Compare the trailing-7-day rate against the full-window rate.
///
/// Both rates are per calendar day so idle days pull the average down.
pub fn detect_demand_shift(
    item: &StockedItem,
    window: Option<&SalesAggregate>,
    trailing: Option<&SalesAggregate>,
    window_days: u32,
) -> Option<Anomaly> {
    if !item.active {
        return None;
    }
    let window_qty = window.map(|a| a.total_quantity).unwrap_or(0);
    let trailing_qty = trailing.map(|a| a.total_quantity).unwrap_or(0);

    let window_rate = window_qty as f64 / f64::from(window_days.max(1));
    if window_rate < DEMAND_NOISE_FLOOR {
        return None;
    }
    let trailing_rate = trailing_qty as f64 / f64::from(TRAILING_WINDOW_DAYS);
    let ratio = trailing_rate / window_rate;

    let details = DemandShiftDetails {
        trailing_days: TRAILING_WINDOW_DAYS,
        window_days,
        trailing_daily_rate: round_to(trailing_rate, 2),
        window_daily_rate: round_to(window_rate, 2),
        ratio: round_to(ratio, 2),
    };

    if ratio > SPIKE_RATIO {
        let severity = if ratio > HIGH_SPIKE_RATIO {
            Severity::High
        } else {
            Severity::Medium
        };
        let message = format!(
            "{} is selling {:.1}x its {}-day average ({:.2}/day vs {:.2}/day)",
            item.name, ratio, window_days, trailing_rate, window_rate
        );
        return Some(Anomaly {
            item: item.item_ref(),
            severity,
            message,
            kind: AnomalyKind::DemandSpike(details),
        });
    }

    if ratio < DROP_RATIO {
        let severity = if ratio < HIGH_DROP_RATIO {
            Severity::High
        } else {
            Severity::Medium
        };
        let message = format!(
            "{} demand fell to {:.0}% of its {}-day average ({:.2}/day vs {:.2}/day)",
            item.name,
            ratio * 100.0,
            window_days,
            trailing_rate,
            window_rate
        );
        return Some(Anomaly {
            item: item.item_ref(),
            severity,
            message,
            kind: AnomalyKind::DemandDrop(details),
        });
    }

    None
}

/// Ledger invariants: on-hand never negative, reserved never above on-hand.
/// The first failing check wins so one defect is reported once.
pub fn detect_stock_mismatch(item: &StockedItem) -> Option<Anomaly> {
    if item.on_hand < 0 {
        return Some(Anomaly {
            item: item.item_ref(),
            severity: Severity::High,
            message: format!("{} has negative on-hand stock ({})", item.name, item.on_hand),
            kind: AnomalyKind::StockMismatch(StockMismatchDetails {
                reason: MismatchReason::NegativeOnHand,
                on_hand: item.on_hand,
                reserved: item.reserved,
                magnitude: item.on_hand.saturating_neg(),
            }),
        });
    }

    if item.reserved > item.on_hand {
        let magnitude = item.reserved - item.on_hand;
        return Some(Anomaly {
            item: item.item_ref(),
            severity: Severity::Medium,
            message: format!(
                "{} has {} units reserved but only {} on hand",
                item.name, item.reserved, item.on_hand
            ),
            kind: AnomalyKind::StockMismatch(StockMismatchDetails {
                reason: MismatchReason::ReservedExceedsOnHand,
                on_hand: item.on_hand,
                reserved: item.reserved,
                magnitude,
            }),
        });
    }

    None
}

/// Active items holding stock with no qualifying sale anywhere in the window.
///
/// Newly listed items are flagged the same as stale ones; there is no
/// listing-age exemption.
pub fn detect_dead_stock(
    item: &StockedItem,
    window: Option<&SalesAggregate>,
    window_days: u32,
) -> Option<Anomaly> {
    let available = item.available();
    if !item.active || available <= 0 {
        return None;
    }
    if window.is_some_and(|a| a.total_quantity > 0) {
        return None;
    }

    let severity = if available > DEAD_STOCK_HIGH {
        Severity::High
    } else if available > DEAD_STOCK_MEDIUM {
        Severity::Medium
    } else {
        Severity::Low
    };

    Some(Anomaly {
        item: item.item_ref(),
        severity,
        message: format!(
            "{} has {} units available and no sales in the last {} days",
            item.name, available, window_days
        ),
        kind: AnomalyKind::DeadStock(DeadStockDetails {
            available_stock: available,
            window_days,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(on_hand: i64, reserved: i64) -> StockedItem {
        StockedItem {
            item_id: StockedItemId::new(),
            name: "Lamp".to_string(),
            variant: None,
            image_url: None,
            on_hand,
            reserved,
            active: true,
        }
    }

    fn agg(item: &StockedItem, qty: i64, window_days: u32) -> SalesAggregate {
        SalesAggregate {
            item_id: item.item_id,
            window_days,
            total_quantity: qty,
            order_count: 1,
            active_days: 1,
            last_sold_at: None,
        }
    }

    fn shift(trailing_qty: i64, window_qty: i64) -> Option<Anomaly> {
        let item = test_item(100, 0);
        let w = agg(&item, window_qty, 30);
        let t = agg(&item, trailing_qty, 7);
        detect_demand_shift(&item, Some(&w), Some(&t), 30)
    }

    #[test]
    fn ratio_of_exactly_four_is_a_medium_spike() {
        // trailing 56/7 = 8/day, window 60/30 = 2/day.
        let a = shift(56, 60).unwrap();
        assert_eq!(a.severity, Severity::Medium);
        match a.kind {
            AnomalyKind::DemandSpike(d) => {
                assert_eq!(d.ratio, 4.0);
                assert_eq!(d.trailing_daily_rate, 8.0);
                assert_eq!(d.window_daily_rate, 2.0);
            }
            other => panic!("expected spike, got {other:?}"),
        }
    }

    #[test]
    fn ratio_above_four_is_a_high_spike() {
        // trailing 63/7 = 9/day vs 2/day.
        let a = shift(63, 60).unwrap();
        assert_eq!(a.severity, Severity::High);
        assert!(matches!(a.kind, AnomalyKind::DemandSpike(_)));
    }

    #[test]
    fn ratio_between_half_and_two_is_quiet() {
        // trailing 14/7 = 2/day vs 2/day.
        assert!(shift(14, 60).is_none());
        // exactly 2x: 28/7 = 4/day.
        assert!(shift(28, 60).is_none());
        // exactly 0.5x: 7/7 = 1/day.
        assert!(shift(7, 60).is_none());
    }

    #[test]
    fn drops_are_tiered() {
        // trailing 5/7 = 0.71/day vs 2/day, ratio 0.36 -> medium.
        let a = shift(5, 60).unwrap();
        assert_eq!(a.severity, Severity::Medium);
        assert!(matches!(a.kind, AnomalyKind::DemandDrop(_)));

        // trailing 0 -> ratio 0 -> high.
        let a = shift(0, 60).unwrap();
        assert_eq!(a.severity, Severity::High);
        assert!(matches!(a.kind, AnomalyKind::DemandDrop(_)));
    }

    #[test]
    fn drop_ratio_of_exactly_a_fifth_is_medium() {
        // trailing 7/7 = 1/day, window 150/30 = 5/day.
        let a = shift(7, 150).unwrap();
        assert_eq!(a.severity, Severity::Medium);
        match a.kind {
            AnomalyKind::DemandDrop(d) => {
                assert_eq!(d.ratio, 0.2);
                assert_eq!(d.trailing_daily_rate, 1.0);
                assert_eq!(d.window_daily_rate, 5.0);
            }
            other => panic!("expected drop, got {other:?}"),
        }

        // Just below: 6/7 = 0.857/day, ratio 0.17.
        assert_eq!(shift(6, 150).unwrap().severity, Severity::High);
    }

    #[test]
    fn slow_movers_below_noise_floor_are_skipped() {
        // 8/30 = 0.27/day < 0.3.
        assert!(shift(8, 8).is_none());
    }

    #[test]
    fn inactive_items_keep_ledger_checks_only() {
        let mut item = test_item(-2, 0);
        item.active = false;
        let w = agg(&item, 60, 30);
        let t = agg(&item, 63, 7);
        assert!(detect_demand_shift(&item, Some(&w), Some(&t), 30).is_none());
        assert!(detect_stock_mismatch(&item).is_some());
    }

    #[test]
    fn negative_on_hand_is_high_and_reported_once() {
        let item = test_item(-5, 10);
        let a = detect_stock_mismatch(&item).unwrap();
        assert_eq!(a.severity, Severity::High);
        match a.kind {
            AnomalyKind::StockMismatch(d) => {
                assert_eq!(d.reason, MismatchReason::NegativeOnHand);
                assert_eq!(d.magnitude, 5);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn over_reservation_is_medium() {
        let item = test_item(3, 8);
        let a = detect_stock_mismatch(&item).unwrap();
        assert_eq!(a.severity, Severity::Medium);
        match a.kind {
            AnomalyKind::StockMismatch(d) => {
                assert_eq!(d.reason, MismatchReason::ReservedExceedsOnHand);
                assert_eq!(d.magnitude, 5);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
        assert!(detect_stock_mismatch(&test_item(8, 8)).is_none());
    }

    #[test]
    fn dead_stock_tiers_follow_available_stock() {
        let tier = |stock: i64| detect_dead_stock(&test_item(stock, 0), None, 30).map(|a| a.severity);
        assert_eq!(tier(51), Some(Severity::High));
        assert_eq!(tier(50), Some(Severity::Medium));
        assert_eq!(tier(11), Some(Severity::Medium));
        assert_eq!(tier(10), Some(Severity::Low));
        assert_eq!(tier(1), Some(Severity::Low));
        assert_eq!(tier(0), None);
    }

    #[test]
    fn dead_stock_skips_sold_inactive_and_unavailable_items() {
        let item = test_item(20, 0);
        assert!(detect_dead_stock(&item, Some(&agg(&item, 1, 30)), 30).is_none());

        let mut inactive = test_item(20, 0);
        inactive.active = false;
        assert!(detect_dead_stock(&inactive, None, 30).is_none());

        assert!(detect_dead_stock(&test_item(5, 5), None, 30).is_none());
    }

    #[test]
    fn kind_serializes_with_type_tag_and_details() {
        let a = detect_stock_mismatch(&test_item(-1, 0)).unwrap();
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "stock_mismatch");
        assert_eq!(json["severity"], "high");
        assert_eq!(json["details"]["reason"], "negative_on_hand");
        assert_eq!(json["name"], "Lamp");
    }
}
