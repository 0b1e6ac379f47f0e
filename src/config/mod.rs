use anyhow::Context;
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub analytics: AnalyticsConfig,
    pub frontend: FrontendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Base64 SHA-256 digest of the admin password. When unset, admin
    /// login is refused outright.
    pub admin_password_hash: Option<String>,
    /// HS256 signing secret for session tokens.
    pub token_secret: String,
    pub token_ttl_secs: u64,
}

/// How a beacon hit maps to a stored visit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitGranularity {
    /// At most one visit per session id per idle window (default).
    Session,
    /// Every beacon becomes a row.
    Pageload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Reporting time zone as a fixed UTC offset in hours. The
    /// business reports in Pakistan time, so the default is +5.
    pub utc_offset_hours: i32,
    pub visit_granularity: VisitGranularity,
    pub session_idle_minutes: i64,
}

impl AnalyticsConfig {
    pub fn reporting_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Directory of built frontend files overriding the embedded
    /// assets. If None, only embedded assets are served.
    pub static_dir: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());
        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./chillsite.db".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let admin_password_hash = std::env::var("ADMIN_PASSWORD_HASH").ok();
        if admin_password_hash.is_none() {
            tracing::warn!("ADMIN_PASSWORD_HASH not set - admin login is disabled");
        }

        let token_secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                tracing::warn!(
                    "SESSION_SECRET not set - using a random per-boot secret; \
                     admin sessions will not survive restarts"
                );
                crate::storage::generate_id()
            }
        };

        let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(3600);

        let utc_offset_hours = std::env::var("ANALYTICS_UTC_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(5);

        let visit_granularity = match std::env::var("VISIT_GRANULARITY")
            .unwrap_or_else(|_| "session".to_string())
            .to_lowercase()
            .as_str()
        {
            "pageload" => VisitGranularity::Pageload,
            "session" => VisitGranularity::Session,
            other => {
                tracing::warn!(
                    "Unknown VISIT_GRANULARITY '{other}', falling back to 'session'. \
                     Supported values: session, pageload"
                );
                VisitGranularity::Session
            }
        };

        let session_idle_minutes = std::env::var("SESSION_IDLE_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(30);

        let static_dir = std::env::var("FRONTEND_STATIC_DIR").ok();

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
            },
            server: ServerConfig { host, port },
            auth: AuthConfig {
                admin_password_hash,
                token_secret,
                token_ttl_secs,
            },
            analytics: AnalyticsConfig {
                utc_offset_hours,
                visit_granularity,
                session_idle_minutes,
            },
            frontend: FrontendConfig { static_dir },
        })
    }
}
