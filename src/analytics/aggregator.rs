//! Snapshot computation for the admin dashboard
//!
//! Everything here is synchronous and allocation-fresh: the record
//! lists are fetched up front by the store, and each call returns a
//! new [`AnalyticsSnapshot`] without touching shared state. "Today"
//! is midnight-to-midnight in the zone of the supplied `now`; week
//! and month are trailing windows of 7 and 30 calendar days ending
//! today, not calendar-aligned ranges.

use chrono::{DateTime, FixedOffset, NaiveDate, Timelike, Utc};
use std::collections::HashMap;

use crate::analytics::models::{AnalyticsSnapshot, ChartData, Period};
use crate::models::{SubmissionRecord, VisitRecord};

/// Compute the dashboard snapshot for one period.
///
/// Records with an unparseable timestamp (`timestamp: None`) count
/// toward the totals but are skipped by every window and bucket
/// calculation. Future-dated records are likewise dropped from the
/// chart series only.
pub fn compute_snapshot(
    visits: &[VisitRecord],
    submissions: &[SubmissionRecord],
    period: Period,
    now: DateTime<FixedOffset>,
) -> AnalyticsSnapshot {
    let today = now.date_naive();

    let visit_days: Vec<Option<DateTime<FixedOffset>>> = visits
        .iter()
        .map(|v| v.timestamp.map(|ts| to_local(ts, &now)))
        .collect();
    let submission_days: Vec<Option<DateTime<FixedOffset>>> = submissions
        .iter()
        .map(|s| s.timestamp.map(|ts| to_local(ts, &now)))
        .collect();

    let visits_today = count_in_window(&visit_days, today, 1);
    let visits_this_week = count_in_window(&visit_days, today, 7);
    let visits_this_month = count_in_window(&visit_days, today, 30);

    let submissions_today = count_in_window(&submission_days, today, 1);
    let submissions_this_week = count_in_window(&submission_days, today, 7);
    let submissions_this_month = count_in_window(&submission_days, today, 30);

    let chart_data = ChartData {
        labels: bucket_labels(period, today),
        visits_data: bucket_series(&visit_days, period, today),
        submissions_data: bucket_series(&submission_days, period, today),
    };

    AnalyticsSnapshot {
        total_visits: visits.len() as u64,
        visits_today,
        visits_this_week,
        visits_this_month,
        total_submissions: submissions.len() as u64,
        submissions_today,
        submissions_this_week,
        submissions_this_month,
        popular_services: rank_services(submissions),
        chart_data,
    }
}

fn to_local(ts: DateTime<Utc>, now: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    ts.with_timezone(now.offset())
}

/// Count records whose calendar day falls in the trailing window of
/// `days` days ending `today` inclusive.
fn count_in_window(locals: &[Option<DateTime<FixedOffset>>], today: NaiveDate, days: i64) -> u64 {
    locals
        .iter()
        .flatten()
        .filter(|dt| {
            let diff = (today - dt.date_naive()).num_days();
            diff >= 0 && diff < days
        })
        .count() as u64
}

/// Labels for the chart buckets, oldest bucket first.
fn bucket_labels(period: Period, today: NaiveDate) -> Vec<String> {
    match period {
        // Hour-of-day labels: "12 AM", "1 AM", ... "11 PM".
        Period::Today => (0..24)
            .map(|h| {
                let hour12 = (h + 11) % 12 + 1;
                let suffix = if h < 12 { "AM" } else { "PM" };
                format!("{hour12} {suffix}")
            })
            .collect(),
        Period::Week => day_labels(today, 7, "%a %-d"),
        Period::Month => day_labels(today, 30, "%b %-d"),
    }
}

fn day_labels(today: NaiveDate, count: i64, fmt: &str) -> Vec<String> {
    (0..count)
        .map(|i| {
            let date = today - chrono::Days::new((count - 1 - i) as u64);
            date.format(fmt).to_string()
        })
        .collect()
}

/// Bucket records into the chart series, oldest bucket first.
///
/// Today buckets by hour of day (records from other days are
/// skipped); week and month bucket by day offset from today. Offsets
/// outside the window, including future-dated records, fall out of
/// the series without affecting any total.
fn bucket_series(
    locals: &[Option<DateTime<FixedOffset>>],
    period: Period,
    today: NaiveDate,
) -> Vec<u64> {
    let len = period.bucket_count();
    let mut series = vec![0u64; len];

    for dt in locals.iter().flatten() {
        let index = match period {
            Period::Today => {
                if dt.date_naive() != today {
                    continue;
                }
                dt.hour() as usize
            }
            Period::Week | Period::Month => {
                let diff = (today - dt.date_naive()).num_days();
                if diff < 0 || diff >= len as i64 {
                    continue;
                }
                len - 1 - diff as usize
            }
        };
        series[index] += 1;
    }

    series
}

/// Rank service tags by submission count, descending.
///
/// Ties keep the order in which each tag was first seen while
/// scanning the (timestamp-descending) submissions, which the stable
/// sort preserves. Counts always sum to the number of submissions:
/// missing tags are already folded into `Unknown`.
fn rank_services(submissions: &[SubmissionRecord]) -> Vec<(String, u64)> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut ranked: Vec<(String, u64)> = Vec::new();

    for sub in submissions {
        let tag = sub.service.as_str();
        match order.get(tag) {
            Some(&i) => ranked[i].1 += 1,
            None => {
                order.insert(tag, ranked.len());
                ranked.push((tag.to_string(), 1));
            }
        }
    }

    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceTag;
    use chrono::TimeZone;

    fn pkt() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600).unwrap()
    }

    fn at(now: &DateTime<FixedOffset>, hours_ago: i64) -> Option<DateTime<Utc>> {
        Some((*now - chrono::Duration::hours(hours_ago)).with_timezone(&Utc))
    }

    fn visit(timestamp: Option<DateTime<Utc>>) -> VisitRecord {
        VisitRecord {
            id: "v1".to_string(),
            timestamp,
            path: "/".to_string(),
            user_agent: "test".to_string(),
            referrer: String::new(),
            session_id: "s1".to_string(),
        }
    }

    fn submission(timestamp: Option<DateTime<Utc>>, service: ServiceTag) -> SubmissionRecord {
        SubmissionRecord {
            id: "s1".to_string(),
            timestamp,
            name: "Asad".to_string(),
            phone: "0300-0000000".to_string(),
            company_name: None,
            designation: None,
            email: None,
            service,
            message: None,
        }
    }

    #[test]
    fn empty_inputs_yield_zeroed_snapshot() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        for (period, len) in [(Period::Today, 24), (Period::Week, 7), (Period::Month, 30)] {
            let snap = compute_snapshot(&[], &[], period, now);
            assert_eq!(snap.total_visits, 0);
            assert_eq!(snap.total_submissions, 0);
            assert!(snap.popular_services.is_empty());
            assert_eq!(snap.chart_data.labels.len(), len);
            assert_eq!(snap.chart_data.visits_data, vec![0; len]);
            assert_eq!(snap.chart_data.submissions_data, vec![0; len]);
        }
    }

    #[test]
    fn record_at_now_lands_in_most_recent_bucket() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 23, 30, 0).unwrap();
        let subs = vec![submission(at(&now, 0), ServiceTag::Chiller)];

        let today = compute_snapshot(&[], &subs, Period::Today, now);
        assert_eq!(today.chart_data.submissions_data[23], 1);

        let week = compute_snapshot(&[], &subs, Period::Week, now);
        assert_eq!(week.chart_data.submissions_data[6], 1);

        let month = compute_snapshot(&[], &subs, Period::Month, now);
        assert_eq!(month.chart_data.submissions_data[29], 1);
    }

    #[test]
    fn thirty_one_day_old_record_kept_in_totals_only() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let subs = vec![submission(at(&now, 31 * 24), ServiceTag::Chiller)];

        let snap = compute_snapshot(&[], &subs, Period::Month, now);
        assert_eq!(snap.total_submissions, 1);
        assert_eq!(snap.submissions_this_month, 0);
        assert_eq!(snap.chart_data.submissions_data.iter().sum::<u64>(), 0);
    }

    #[test]
    fn future_dated_record_dropped_from_series() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let visits = vec![visit(at(&now, -48))];

        let snap = compute_snapshot(&visits, &[], Period::Week, now);
        assert_eq!(snap.total_visits, 1);
        assert_eq!(snap.chart_data.visits_data.iter().sum::<u64>(), 0);
    }

    #[test]
    fn malformed_timestamp_counts_toward_totals_only() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let visits = vec![visit(None), visit(at(&now, 1))];

        let snap = compute_snapshot(&visits, &[], Period::Today, now);
        assert_eq!(snap.total_visits, 2);
        assert_eq!(snap.visits_today, 1);
        assert_eq!(snap.chart_data.visits_data.iter().sum::<u64>(), 1);
    }

    #[test]
    fn windows_are_trailing_and_day_based() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 1, 0, 0).unwrap();
        let visits = vec![
            visit(at(&now, 0)),       // today
            visit(at(&now, 3)),       // yesterday (01:00 local, 3h back)
            visit(at(&now, 6 * 24)),  // 6 days ago, inside week window
            visit(at(&now, 7 * 24)),  // 7 days ago, outside week window
            visit(at(&now, 29 * 24)), // inside month window
            visit(at(&now, 30 * 24)), // outside month window
        ];

        let snap = compute_snapshot(&visits, &[], Period::Week, now);
        assert_eq!(snap.total_visits, 6);
        assert_eq!(snap.visits_today, 1);
        assert_eq!(snap.visits_this_week, 3);
        assert_eq!(snap.visits_this_month, 5);
    }

    #[test]
    fn window_membership_uses_reporting_zone() {
        // 20:30 UTC on June 14 is already June 15 in UTC+5.
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 2, 0, 0).unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 6, 14, 20, 30, 0).unwrap();

        let snap = compute_snapshot(&[visit(Some(ts))], &[], Period::Today, now);
        assert_eq!(snap.visits_today, 1);
        assert_eq!(snap.chart_data.visits_data[1], 1); // 01:30 local
    }

    #[test]
    fn popular_services_rank_descending_with_stable_ties() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let subs = vec![
            submission(at(&now, 1), ServiceTag::Generator),
            submission(at(&now, 2), ServiceTag::Chiller),
            submission(at(&now, 3), ServiceTag::Marquee),
            submission(at(&now, 4), ServiceTag::Chiller),
            submission(at(&now, 5), ServiceTag::Chiller),
        ];

        let snap = compute_snapshot(&[], &subs, Period::Week, now);
        assert_eq!(
            snap.popular_services,
            vec![
                ("chiller".to_string(), 3),
                ("generator".to_string(), 1),
                ("marquee".to_string(), 1),
            ]
        );
        let sum: u64 = snap.popular_services.iter().map(|(_, c)| c).sum();
        assert_eq!(sum, snap.total_submissions);
    }

    #[test]
    fn unknown_service_gets_sentinel_bucket() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let subs = vec![submission(at(&now, 1), ServiceTag::Unknown)];

        let snap = compute_snapshot(&[], &subs, Period::Week, now);
        assert_eq!(snap.popular_services, vec![("Unknown".to_string(), 1)]);
    }

    #[test]
    fn hour_labels_cover_the_clock() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let snap = compute_snapshot(&[], &[], Period::Today, now);
        let labels = &snap.chart_data.labels;
        assert_eq!(labels[0], "12 AM");
        assert_eq!(labels[1], "1 AM");
        assert_eq!(labels[12], "12 PM");
        assert_eq!(labels[23], "11 PM");
    }

    #[test]
    fn day_labels_end_at_today() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let week = compute_snapshot(&[], &[], Period::Week, now);
        assert_eq!(week.chart_data.labels[6], "Sun 15");
        assert_eq!(week.chart_data.labels[0], "Mon 9");

        let month = compute_snapshot(&[], &[], Period::Month, now);
        assert_eq!(month.chart_data.labels[29], "Jun 15");
        assert_eq!(month.chart_data.labels[0], "May 17");
    }

    #[test]
    fn snapshot_is_deterministic() {
        let now = pkt().with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let visits = vec![visit(at(&now, 2)), visit(at(&now, 50))];
        let subs = vec![submission(at(&now, 5), ServiceTag::Marquee)];

        let first = compute_snapshot(&visits, &subs, Period::Month, now);
        let second = compute_snapshot(&visits, &subs, Period::Month, now);
        assert_eq!(first, second);
    }
}
