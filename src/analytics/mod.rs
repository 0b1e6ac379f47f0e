//! Dashboard analytics.
//!
//! The admin dashboard shows summary counters, a ranked list of
//! requested services, and hourly/daily chart series for a selected
//! period. All of it comes from [`compute_snapshot`], a pure function
//! over the fully fetched visit and submission lists plus an explicit
//! "now" instant, so the numbers are deterministic and testable
//! without touching the wall clock.

pub mod aggregator;
pub mod models;

pub use aggregator::compute_snapshot;
pub use models::{AnalyticsSnapshot, ChartData, Period};
