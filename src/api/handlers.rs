use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analytics::{compute_snapshot, AnalyticsSnapshot, Period};
use crate::auth::{AuthService, IssuedToken};
use crate::config::{AnalyticsConfig, VisitGranularity};
use crate::models::{NewSubmission, NewVisit, SubmissionRecord, VisitRecord};
use crate::storage::{generate_id, RecordStore};

pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub auth: Arc<AuthService>,
    pub analytics: AnalyticsConfig,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitAck {
    pub session_id: String,
    /// False when session-granularity dedup suppressed the row.
    pub recorded: bool,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQueryParams {
    #[serde(default = "default_period")]
    pub period: Period,
}

fn default_period() -> Period {
    Period::Month
}

/// Record a visit beacon from the public site.
///
/// With session granularity, a beacon whose session already has a
/// visit inside the idle window is acknowledged without a new row.
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<NewVisit>,
) -> Result<(StatusCode, Json<VisitAck>), (StatusCode, Json<ErrorResponse>)> {
    let user_agent = headers
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (session_id, known_session) = match payload.session_id.as_deref() {
        Some(id) if !id.is_empty() => (id.to_string(), true),
        _ => (generate_id(), false),
    };

    if known_session && state.analytics.visit_granularity == VisitGranularity::Session {
        let idle_window = Duration::minutes(state.analytics.session_idle_minutes);
        match state.store.last_visit_in_session(&session_id).await {
            Ok(Some(last)) if Utc::now() - last < idle_window => {
                return Ok((
                    StatusCode::OK,
                    Json(VisitAck {
                        session_id,
                        recorded: false,
                    }),
                ));
            }
            Ok(_) => {}
            Err(e) => {
                // Dedup lookup failing should not lose the visit.
                tracing::warn!("Session lookup failed, recording anyway: {}", e);
            }
        }
    }

    match state
        .store
        .insert_visit(&payload, &user_agent, &session_id)
        .await
    {
        Ok(_) => Ok((
            StatusCode::CREATED,
            Json(VisitAck {
                session_id,
                recorded: true,
            }),
        )),
        Err(e) => {
            tracing::error!("Failed to record visit: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to record visit".to_string(),
                }),
            ))
        }
    }
}

/// Accept a contact-form submission.
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewSubmission>,
) -> Result<(StatusCode, Json<SubmissionRecord>), (StatusCode, Json<ErrorResponse>)> {
    if payload.name.trim().is_empty() || payload.phone.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Name and phone are required".to_string(),
            }),
        ));
    }

    match state.store.insert_submission(&payload).await {
        Ok(record) => {
            tracing::info!(
                "New submission from '{}' for service '{}'",
                record.name,
                record.service
            );
            Ok((StatusCode::CREATED, Json(record)))
        }
        Err(e) => {
            tracing::error!("Failed to store submission: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store submission".to_string(),
                }),
            ))
        }
    }
}

/// Exchange the admin password for a session token.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<IssuedToken>, (StatusCode, Json<ErrorResponse>)> {
    match state.auth.login(&payload.password) {
        Some(issued) => Ok(Json(issued)),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid password".to_string(),
            }),
        )),
    }
}

/// Full submission list for the dashboard table, newest first.
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubmissionRecord>>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.fetch_submissions().await {
        Ok(submissions) => Ok(Json(submissions)),
        Err(e) => {
            tracing::error!("Failed to fetch submissions: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load submissions".to_string(),
                }),
            ))
        }
    }
}

/// Analytics snapshot for the requested period.
///
/// Both collections are fetched in full, then aggregated with the
/// configured reporting zone. A fetch failure from either collection
/// surfaces as an error rather than partial totals.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQueryParams>,
) -> Result<Json<AnalyticsSnapshot>, (StatusCode, Json<ErrorResponse>)> {
    let fetched: Result<(Vec<VisitRecord>, Vec<SubmissionRecord>), _> = async {
        let visits = state.store.fetch_visits().await?;
        let submissions = state.store.fetch_submissions().await?;
        Ok::<_, crate::storage::StoreError>((visits, submissions))
    }
    .await;

    let (visits, submissions) = match fetched {
        Ok(lists) => lists,
        Err(e) => {
            tracing::error!("Failed to fetch analytics records: {}", e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load analytics".to_string(),
                }),
            ));
        }
    };

    let now = Utc::now().with_timezone(&state.analytics.reporting_offset());
    let snapshot = compute_snapshot(&visits, &submissions, params.period, now);
    Ok(Json(snapshot))
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
