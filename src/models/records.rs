use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service a contact-form submission is asking about.
///
/// Matches the fixed option list on the public form. Anything else
/// (older rows, hand-edited data) collapses to `Unknown` so ranking
/// and display never fail on a stray value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceTag {
    Chiller,
    Generator,
    Marquee,
    #[serde(other)]
    Unknown,
}

impl ServiceTag {
    /// Parse a stored tag; empty or unrecognized values map to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "chiller" => ServiceTag::Chiller,
            "generator" => ServiceTag::Generator,
            "marquee" => ServiceTag::Marquee,
            _ => ServiceTag::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceTag::Chiller => "chiller",
            ServiceTag::Generator => "generator",
            ServiceTag::Marquee => "marquee",
            ServiceTag::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a stored timestamp leniently.
///
/// Rows are written as RFC 3339, but older imports carry bare
/// datetimes or unix epochs (seconds or milliseconds). A row that
/// matches none of these yields `None` and is excluded from window
/// and bucket math while still counting toward totals.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }

    if let Ok(epoch) = raw.parse::<i64>() {
        // Heuristic: values this large can only be milliseconds.
        let (secs, millis) = if epoch.abs() >= 100_000_000_000 {
            (epoch.div_euclid(1000), epoch.rem_euclid(1000) as u32)
        } else {
            (epoch, 0)
        };
        return DateTime::from_timestamp(secs, millis * 1_000_000);
    }

    None
}

/// One recorded page visit from the public site beacon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: String,
    /// `None` when the stored timestamp could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub path: String,
    pub user_agent: String,
    pub referrer: String,
    pub session_id: String,
}

/// One contact-form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: String,
    /// `None` when the stored timestamp could not be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    pub name: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub designation: Option<String>,
    pub email: Option<String>,
    pub service: ServiceTag,
    pub message: Option<String>,
}

/// Beacon payload for recording a visit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVisit {
    pub path: String,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Contact-form payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubmission {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub service: ServiceTag,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_tag_parses_known_values() {
        assert_eq!(ServiceTag::parse("chiller"), ServiceTag::Chiller);
        assert_eq!(ServiceTag::parse("  Generator "), ServiceTag::Generator);
        assert_eq!(ServiceTag::parse("marquee"), ServiceTag::Marquee);
    }

    #[test]
    fn service_tag_maps_missing_to_unknown() {
        assert_eq!(ServiceTag::parse(""), ServiceTag::Unknown);
        assert_eq!(ServiceTag::parse("cooling-tower"), ServiceTag::Unknown);
    }

    #[test]
    fn timestamp_parses_rfc3339() {
        let ts = parse_timestamp("2025-06-01T10:30:00+05:00").unwrap();
        assert_eq!(ts.timestamp(), 1748755800);
    }

    #[test]
    fn timestamp_parses_epoch_seconds_and_millis() {
        assert_eq!(
            parse_timestamp("1748755800").unwrap().timestamp(),
            1748755800
        );
        assert_eq!(
            parse_timestamp("1748755800123").unwrap().timestamp(),
            1748755800
        );
    }

    #[test]
    fn timestamp_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("N/A").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
