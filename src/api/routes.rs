use axum::{
    http::Uri,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::{auth_middleware, AuthService};
use crate::config::{AnalyticsConfig, FrontendConfig};
use crate::storage::RecordStore;

use super::handlers::{
    create_submission, get_analytics, health_check, list_submissions, login, record_visit,
    AppState,
};
use super::static_files::serve_static;

pub fn create_router(
    store: Arc<dyn RecordStore>,
    auth_service: Arc<AuthService>,
    analytics: AnalyticsConfig,
    frontend: FrontendConfig,
) -> Router {
    let state = Arc::new(AppState {
        store,
        auth: Arc::clone(&auth_service),
        analytics,
    });

    let admin_routes = Router::new()
        .route("/api/submissions", get(list_submissions))
        .route("/api/analytics", get(get_analytics))
        .route_layer(middleware::from_fn(move |headers, req, next| {
            let auth = Arc::clone(&auth_service);
            auth_middleware(auth, headers, req, next)
        }))
        .with_state(Arc::clone(&state));

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/api/visits", post(record_visit))
        .route("/api/submissions", post(create_submission))
        .route("/api/auth/login", post(login))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let static_dir = frontend.static_dir;
    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(move |uri: Uri| {
            let dir = static_dir.clone();
            async move { serve_static(uri, dir).await }
        })
}
