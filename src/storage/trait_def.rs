use crate::models::{NewSubmission, NewVisit, SubmissionRecord, VisitRecord};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The record store could not be read. Surfaced to the caller so
    /// the dashboard can show "failed to load" instead of bad totals.
    #[error("record store fetch failed")]
    Fetch(#[source] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The record store behind the site: two append-only collections of
/// visits and submissions, fetched in full for analytics.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Initialize the store (create tables, indexes).
    async fn init(&self) -> Result<()>;

    /// Append a visit row; the store assigns id and timestamp.
    async fn insert_visit(
        &self,
        visit: &NewVisit,
        user_agent: &str,
        session_id: &str,
    ) -> StoreResult<VisitRecord>;

    /// Append a submission row; the store assigns id and timestamp.
    async fn insert_submission(&self, submission: &NewSubmission)
        -> StoreResult<SubmissionRecord>;

    /// All visits, newest first. Ordering is advisory only; the
    /// aggregator windows and buckets by timestamp itself.
    async fn fetch_visits(&self) -> StoreResult<Vec<VisitRecord>>;

    /// All submissions, newest first.
    async fn fetch_submissions(&self) -> StoreResult<Vec<SubmissionRecord>>;

    /// Timestamp of the most recent visit in a session, for
    /// session-granularity dedup.
    async fn last_visit_in_session(&self, session_id: &str) -> StoreResult<Option<DateTime<Utc>>>;
}
