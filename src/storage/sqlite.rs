use crate::models::{parse_timestamp, NewSubmission, NewVisit, ServiceTag, SubmissionRecord, VisitRecord};
use crate::storage::{generate_id, RecordStore, StoreError, StoreResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

fn visit_from_row(row: &sqlx::sqlite::SqliteRow) -> VisitRecord {
    let raw: String = row.get("timestamp");
    VisitRecord {
        id: row.get("id"),
        timestamp: parse_timestamp(&raw),
        path: row.get("path"),
        user_agent: row.get("user_agent"),
        referrer: row.get("referrer"),
        session_id: row.get("session_id"),
    }
}

fn submission_from_row(row: &sqlx::sqlite::SqliteRow) -> SubmissionRecord {
    let raw: String = row.get("timestamp");
    let service: String = row.get("service");
    SubmissionRecord {
        id: row.get("id"),
        timestamp: parse_timestamp(&raw),
        name: row.get("name"),
        phone: row.get("phone"),
        company_name: row.get("company_name"),
        designation: row.get("designation"),
        email: row.get("email"),
        service: ServiceTag::parse(&service),
        message: row.get("message"),
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS visits (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                path TEXT NOT NULL,
                user_agent TEXT NOT NULL,
                referrer TEXT NOT NULL,
                session_id TEXT NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_visits_session ON visits(session_id, timestamp)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS submissions (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                name TEXT NOT NULL,
                phone TEXT NOT NULL,
                company_name TEXT,
                designation TEXT,
                email TEXT,
                service TEXT NOT NULL,
                message TEXT
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn insert_visit(
        &self,
        visit: &NewVisit,
        user_agent: &str,
        session_id: &str,
    ) -> StoreResult<VisitRecord> {
        let record = VisitRecord {
            id: generate_id(),
            timestamp: Some(Utc::now()),
            path: visit.path.clone(),
            user_agent: user_agent.to_string(),
            referrer: visit.referrer.clone().unwrap_or_default(),
            session_id: session_id.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO visits (id, timestamp, path, user_agent, referrer, session_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default())
        .bind(&record.path)
        .bind(&record.user_agent)
        .bind(&record.referrer)
        .bind(&record.session_id)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(record)
    }

    async fn insert_submission(
        &self,
        submission: &NewSubmission,
    ) -> StoreResult<SubmissionRecord> {
        let record = SubmissionRecord {
            id: generate_id(),
            timestamp: Some(Utc::now()),
            name: submission.name.clone(),
            phone: submission.phone.clone(),
            company_name: submission.company_name.clone(),
            designation: submission.designation.clone(),
            email: submission.email.clone(),
            service: submission.service,
            message: submission.message.clone(),
        };

        sqlx::query(
            r#"
            INSERT INTO submissions
                (id, timestamp, name, phone, company_name, designation, email, service, message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.timestamp.map(|t| t.to_rfc3339()).unwrap_or_default())
        .bind(&record.name)
        .bind(&record.phone)
        .bind(&record.company_name)
        .bind(&record.designation)
        .bind(&record.email)
        .bind(record.service.as_str())
        .bind(&record.message)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::Other(e.into()))?;

        Ok(record)
    }

    async fn fetch_visits(&self) -> StoreResult<Vec<VisitRecord>> {
        let rows = sqlx::query(
            "SELECT id, timestamp, path, user_agent, referrer, session_id FROM visits ORDER BY timestamp DESC",
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(StoreError::Fetch)?;

        Ok(rows.iter().map(visit_from_row).collect())
    }

    async fn fetch_submissions(&self) -> StoreResult<Vec<SubmissionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, name, phone, company_name, designation, email, service, message
            FROM submissions ORDER BY timestamp DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await
        .map_err(StoreError::Fetch)?;

        Ok(rows.iter().map(submission_from_row).collect())
    }

    async fn last_visit_in_session(&self, session_id: &str) -> StoreResult<Option<DateTime<Utc>>> {
        let row = sqlx::query(
            "SELECT timestamp FROM visits WHERE session_id = ? ORDER BY timestamp DESC LIMIT 1",
        )
        .bind(session_id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(StoreError::Fetch)?;

        Ok(row.and_then(|r| {
            let raw: String = r.get("timestamp");
            parse_timestamp(&raw)
        }))
    }
}
