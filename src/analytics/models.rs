//! Output types for the dashboard analytics snapshot

use serde::{Deserialize, Serialize};

/// Reporting period selected on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Today,
    Week,
    Month,
}

impl Period {
    /// Number of chart buckets for this period: hours for a day,
    /// days otherwise.
    pub fn bucket_count(&self) -> usize {
        match self {
            Period::Today => 24,
            Period::Week => 7,
            Period::Month => 30,
        }
    }

    /// Length of the trailing day window, today inclusive.
    pub fn window_days(&self) -> i64 {
        match self {
            Period::Today => 1,
            Period::Week => 7,
            Period::Month => 30,
        }
    }
}

/// Chart series for one period. The three vectors always have the
/// same length: 24 for today, 7 for week, 30 for month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub visits_data: Vec<u64>,
    pub submissions_data: Vec<u64>,
}

/// Freshly computed analytics for one period request.
///
/// Derived, never persisted: a pure function of the two record lists,
/// the period, and the caller-supplied "now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_visits: u64,
    pub visits_today: u64,
    pub visits_this_week: u64,
    pub visits_this_month: u64,

    pub total_submissions: u64,
    pub submissions_today: u64,
    pub submissions_this_week: u64,
    pub submissions_this_month: u64,

    /// Service tags ranked by submission count, descending; equal
    /// counts keep the order in which each tag was first seen.
    pub popular_services: Vec<(String, u64)>,

    pub chart_data: ChartData,
}
