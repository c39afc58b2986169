//! Deterministic ordering and summary counts. No I/O.
//!
//! All sorts are stable so equal keys keep the engine's item order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::anomaly::{Anomaly, Severity};
use crate::demand::DemandEstimate;
use crate::reorder::{ReorderSuggestion, Urgency};

/// Ordering of the forecast listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastSort {
    /// Shortest runway first, unbounded last.
    #[default]
    Runway,
    /// Best sellers first.
    Quantity,
}

impl ForecastSort {
    /// Unknown values fall back to the default ordering.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()) {
            Some(s) if s == "quantity" || s == "total_quantity" => ForecastSort::Quantity,
            _ => ForecastSort::Runway,
        }
    }
}

pub fn sort_estimates(estimates: &mut [DemandEstimate], order: ForecastSort) {
    match order {
        ForecastSort::Runway => estimates.sort_by(|a, b| a.runway.cmp_urgency(&b.runway)),
        ForecastSort::Quantity => estimates.sort_by(|a, b| b.total_sold.cmp(&a.total_sold)),
    }
}

pub fn sort_suggestions(suggestions: &mut [ReorderSuggestion]) {
    suggestions.sort_by(|a, b| a.estimate.runway.cmp_urgency(&b.estimate.runway));
}

pub fn sort_anomalies(anomalies: &mut [Anomaly]) {
    anomalies.sort_by_key(|a| a.severity);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub total_items: usize,
    pub items_with_sales: usize,
    pub unbounded: usize,
}

impl ForecastSummary {
    pub fn from_estimates(estimates: &[DemandEstimate]) -> Self {
        Self {
            total_items: estimates.len(),
            items_with_sales: estimates.iter().filter(|e| e.total_sold > 0).count(),
            unbounded: estimates.iter().filter(|e| e.runway.is_unbounded()).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReorderSummary {
    pub total: usize,
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl ReorderSummary {
    pub fn from_suggestions(suggestions: &[ReorderSuggestion]) -> Self {
        let mut s = Self {
            total: suggestions.len(),
            ..Self::default()
        };
        for r in suggestions {
            match r.urgency {
                Urgency::Critical => s.critical += 1,
                Urgency::Warning => s.warning += 1,
                Urgency::Info => s.info += 1,
            }
        }
        s
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnomalySummary {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub by_type: BTreeMap<String, usize>,
}

impl AnomalySummary {
    pub fn from_anomalies(anomalies: &[Anomaly]) -> Self {
        let mut s = Self {
            total: anomalies.len(),
            ..Self::default()
        };
        for a in anomalies {
            match a.severity {
                Severity::High => s.high += 1,
                Severity::Medium => s.medium += 1,
                Severity::Low => s.low += 1,
            }
            *s.by_type.entry(a.kind.as_str().to_string()).or_insert(0) += 1;
        }
        s
    }
}
