//! Reorder advice.

use serde::{Deserialize, Serialize};

use crate::demand::{DemandEstimate, Runway};

/// Replenishment horizon, independent of the alert threshold so tightening the
/// threshold does not shrink the proposed quantity.
pub const REPLENISH_HORIZON_DAYS: i64 = 14;

const CRITICAL_RUNWAY_DAYS: f64 = 2.0;
const WARNING_RUNWAY_DAYS: f64 = 5.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Critical,
    Warning,
    Info,
}

impl Urgency {
    pub fn for_runway_days(days: f64) -> Self {
        if days <= CRITICAL_RUNWAY_DAYS {
            Urgency::Critical
        } else if days <= WARNING_RUNWAY_DAYS {
            Urgency::Warning
        } else {
            Urgency::Info
        }
    }
}

/// An item that needs replenishing soon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderSuggestion {
    #[serde(flatten)]
    pub estimate: DemandEstimate,
    pub suggested_quantity: i64,
    pub urgency: Urgency,
}

/// `ceil(avg_daily_demand * 14)`, computed on hundredths to stay exact.
pub fn suggested_quantity(avg_daily_demand: f64) -> i64 {
    if !(avg_daily_demand > 0.0) {
        return 0;
    }
    let hundredths = (avg_daily_demand * 100.0).round() as i64;
    let scaled = hundredths.saturating_mul(REPLENISH_HORIZON_DAYS);
    scaled / 100 + i64::from(scaled % 100 != 0)
}

/// Suggestions for every estimate whose runway is within `threshold_days`.
///
/// Items without demand have an unbounded runway and are never suggested.
/// Output keeps the input order; ranking sorts it.
pub fn advise(estimates: &[DemandEstimate], threshold_days: u32) -> Vec<ReorderSuggestion> {
    let threshold = f64::from(threshold_days);
    estimates
        .iter()
        .filter_map(|e| match e.runway {
            Runway::Days(days) if (0.0..=threshold).contains(&days) && e.avg_daily_demand > 0.0 => {
                Some(ReorderSuggestion {
                    estimate: e.clone(),
                    suggested_quantity: suggested_quantity(e.avg_daily_demand),
                    urgency: Urgency::for_runway_days(days),
                })
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SalesAggregate;
    use crate::demand::estimate;
    use crate::model::StockedItem;
    use stockwise_core::StockedItemId;

    fn test_estimate(available: i64, qty: i64, days: u32) -> DemandEstimate {
        let item = StockedItem {
            item_id: StockedItemId::new(),
            name: "Soap".to_string(),
            variant: None,
            image_url: None,
            on_hand: available,
            reserved: 0,
            active: true,
        };
        let agg = SalesAggregate {
            item_id: item.item_id,
            window_days: 30,
            total_quantity: qty,
            order_count: days,
            active_days: days,
            last_sold_at: None,
        };
        estimate(&item, if qty > 0 { Some(&agg) } else { None })
    }

    #[test]
    fn two_week_quantity_rounds_up() {
        assert_eq!(suggested_quantity(10.0), 140);
        assert_eq!(suggested_quantity(0.5), 7);
        assert_eq!(suggested_quantity(0.07), 1);
        assert_eq!(suggested_quantity(3.33), 47);
        assert_eq!(suggested_quantity(0.0), 0);
    }

    #[test]
    fn urgency_boundaries() {
        assert_eq!(Urgency::for_runway_days(0.0), Urgency::Critical);
        assert_eq!(Urgency::for_runway_days(2.0), Urgency::Critical);
        assert_eq!(Urgency::for_runway_days(2.1), Urgency::Warning);
        assert_eq!(Urgency::for_runway_days(5.0), Urgency::Warning);
        assert_eq!(Urgency::for_runway_days(5.1), Urgency::Info);
    }

    #[test]
    fn critical_item_gets_fourteen_days_of_demand() {
        let est = test_estimate(20, 70, 7);
        let out = advise(&[est], 7);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].urgency, Urgency::Critical);
        assert_eq!(out[0].suggested_quantity, 140);
    }

    #[test]
    fn runway_above_threshold_is_skipped() {
        // 10/day with 80 available = 8 days of cover.
        let est = test_estimate(80, 70, 7);
        assert!(advise(&[est.clone()], 7).is_empty());
        assert_eq!(advise(&[est], 8).len(), 1);
    }

    #[test]
    fn zero_demand_is_never_suggested() {
        let est = test_estimate(0, 0, 0);
        assert!(est.runway.is_unbounded());
        assert!(advise(&[est], 60).is_empty());
    }

    #[test]
    fn quantity_does_not_depend_on_threshold() {
        let est = test_estimate(5, 70, 7);
        let tight = advise(&[est.clone()], 1);
        let loose = advise(&[est], 60);
        assert_eq!(tight[0].suggested_quantity, loose[0].suggested_quantity);
    }
}
