//! Result-row types produced by the aggregation pipeline.

use chrono::NaiveDate;
use serde::Serialize;

/// Reliability indices for one (feeder, month[, date | week]) group.
///
/// `date` is set only in the daily table and `week` only in the weekly one;
/// both are empty in the monthly table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub feeder: String,
    pub month: String,
    pub date: Option<NaiveDate>,
    pub week: Option<String>,
    /// Outage events in the group.
    pub interruptions: usize,
    /// Unique `Customer No` values in the group, the SAIFI denominator.
    pub distinct_customers: usize,
    pub saifi: f64,
    pub saidi: f64,
    pub caidi: f64,
}

/// The three aggregation tables, computed once per data load and read-only
/// thereafter.
#[derive(Debug, Clone, Default)]
pub struct MetricsTables {
    pub daily: Vec<MetricsRow>,
    pub weekly: Vec<MetricsRow>,
    pub monthly: Vec<MetricsRow>,
}

impl MetricsTables {
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty() && self.weekly.is_empty() && self.monthly.is_empty()
    }
}

/// Five-number summary of elapsed outage time for one fault category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaultSummary {
    pub fault_category: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// System-wide reliability indices for one month, across all feeders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow {
    pub month: String,
    pub interruptions: usize,
    pub distinct_customers: usize,
    pub saifi: f64,
    pub saidi: f64,
}
