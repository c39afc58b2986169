//! Operation parameters.
//!
//! Out-of-range values are clamped to the nearest bound instead of rejected, so
//! dashboard callers passing user-editable values always get an answer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of the trailing window used as the "recent" side of spike/drop detection.
pub const TRAILING_WINDOW_DAYS: u32 = 7;

/// Demand window used when computing reorder suggestions.
pub const REORDER_DEMAND_WINDOW_DAYS: u32 = 30;

fn clamp_days(value: Option<i64>, default: u32, min: u32, max: u32) -> u32 {
    match value {
        Some(v) => v.clamp(min as i64, max as i64) as u32,
        None => default,
    }
}

/// Parse a user-supplied numeric parameter; blank or unparseable input means "use the default".
pub fn parse_days(raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Parameters for the demand forecast listing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub days: u32,
}

impl ForecastParams {
    pub const DEFAULT_DAYS: u32 = 30;
    pub const MIN_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 365;

    pub fn new(days: Option<i64>) -> Self {
        Self {
            days: clamp_days(days, Self::DEFAULT_DAYS, Self::MIN_DAYS, Self::MAX_DAYS),
        }
    }
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parameters for reorder suggestions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderParams {
    pub threshold_days: u32,
    /// Sales window the demand rate is computed over (not caller-tunable).
    pub window_days: u32,
}

impl ReorderParams {
    pub const DEFAULT_THRESHOLD_DAYS: u32 = 7;
    pub const MIN_THRESHOLD_DAYS: u32 = 1;
    pub const MAX_THRESHOLD_DAYS: u32 = 60;

    pub fn new(threshold_days: Option<i64>) -> Self {
        Self {
            threshold_days: clamp_days(
                threshold_days,
                Self::DEFAULT_THRESHOLD_DAYS,
                Self::MIN_THRESHOLD_DAYS,
                Self::MAX_THRESHOLD_DAYS,
            ),
            window_days: REORDER_DEMAND_WINDOW_DAYS,
        }
    }
}

impl Default for ReorderParams {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Parameters for the anomaly scan.
///
/// The minimum of 7 days keeps the full window at least as long as the trailing window.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyParams {
    pub days: u32,
}

impl AnomalyParams {
    pub const DEFAULT_DAYS: u32 = 30;
    pub const MIN_DAYS: u32 = TRAILING_WINDOW_DAYS;
    pub const MAX_DAYS: u32 = 365;

    pub fn new(days: Option<i64>) -> Self {
        Self {
            days: clamp_days(days, Self::DEFAULT_DAYS, Self::MIN_DAYS, Self::MAX_DAYS),
        }
    }
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self::new(None)
    }
}

/// A trailing window `(end - days, end]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SalesWindow {
    pub end: DateTime<Utc>,
    pub days: u32,
}

impl SalesWindow {
    pub fn trailing(end: DateTime<Utc>, days: u32) -> Self {
        Self {
            end,
            days: days.max(1),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.end - Duration::days(i64::from(self.days))
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at > self.start() && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_days_default_and_clamp() {
        assert_eq!(ForecastParams::new(None).days, 30);
        assert_eq!(ForecastParams::new(Some(0)).days, 1);
        assert_eq!(ForecastParams::new(Some(-20)).days, 1);
        assert_eq!(ForecastParams::new(Some(1000)).days, 365);
        assert_eq!(ForecastParams::new(Some(90)).days, 90);
    }

    #[test]
    fn reorder_threshold_clamps_to_1_60() {
        assert_eq!(ReorderParams::new(None).threshold_days, 7);
        assert_eq!(ReorderParams::new(Some(0)).threshold_days, 1);
        assert_eq!(ReorderParams::new(Some(61)).threshold_days, 60);
        assert_eq!(ReorderParams::new(Some(14)).window_days, REORDER_DEMAND_WINDOW_DAYS);
    }

    #[test]
    fn anomaly_days_never_below_trailing_window() {
        assert_eq!(AnomalyParams::new(Some(3)).days, 7);
        assert_eq!(AnomalyParams::new(Some(400)).days, 365);
        assert_eq!(AnomalyParams::new(None).days, 30);
    }

    #[test]
    fn parse_days_is_forgiving() {
        assert_eq!(parse_days(Some("14")), Some(14));
        assert_eq!(parse_days(Some(" 14 ")), Some(14));
        assert_eq!(parse_days(Some("14.7")), Some(14));
        assert_eq!(parse_days(Some("-3")), Some(-3));
        assert_eq!(parse_days(Some("abc")), None);
        assert_eq!(parse_days(Some("")), None);
        assert_eq!(parse_days(Some("NaN")), None);
        assert_eq!(parse_days(None), None);
    }

    #[test]
    fn window_excludes_start_and_includes_end() {
        let end = Utc::now();
        let w = SalesWindow::trailing(end, 7);
        assert!(w.contains(end));
        assert!(!w.contains(end - Duration::days(7)));
        assert!(w.contains(end - Duration::days(7) + Duration::seconds(1)));
        assert!(!w.contains(end + Duration::seconds(1)));
    }
}
