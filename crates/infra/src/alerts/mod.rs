//! Scheduled anomaly alerting (optional subsystem).
//!
//! Runners re-scan configured stores on an interval or on demand and hand non-empty
//! reports to an [`AlertSink`]. Failures are isolated and never reach request handling.

pub mod runner;
pub mod sink;

pub use runner::{AnomalyScanRunner, AnomalyScanRunnerHandle};
pub use sink::{AlertSink, InMemoryAlertSink, TracingAlertSink};
