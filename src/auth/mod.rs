use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::prelude::*;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;

/// Claims carried by an admin session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issued session token plus its expiry, returned to the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// Black-box credential check for the admin dashboard: verifies the
/// admin password against a stored digest and issues short-lived
/// bearer tokens for the protected routes.
pub struct AuthService {
    password_hash: Option<Vec<u8>>,
    token_secret: String,
    token_ttl_secs: u64,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let password_hash = config
            .admin_password_hash
            .as_deref()
            .and_then(|h| BASE64_STANDARD.decode(h).ok());

        Self {
            password_hash,
            token_secret: config.token_secret,
            token_ttl_secs: config.token_ttl_secs,
        }
    }

    /// Base64 SHA-256 digest of a password, for ADMIN_PASSWORD_HASH.
    pub fn hash_password(password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        BASE64_STANDARD.encode(digest)
    }

    fn verify_password(&self, password: &str) -> bool {
        let Some(expected) = self.password_hash.as_deref() else {
            return false;
        };
        let digest = Sha256::digest(password.as_bytes());
        digest.as_slice().ct_eq(expected).into()
    }

    /// Check the admin password and issue a session token.
    pub fn login(&self, password: &str) -> Option<IssuedToken> {
        if !self.verify_password(password) {
            return None;
        }

        let now = Utc::now().timestamp();
        let exp = now + self.token_ttl_secs as i64;
        let claims = SessionClaims {
            sub: "admin".to_string(),
            iat: now,
            exp,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.token_secret.as_bytes()),
        )
        .ok()?;

        Some(IssuedToken {
            token,
            expires_at: exp,
        })
    }

    /// Validate a bearer token; expired or tampered tokens fail.
    pub fn validate_token(&self, token: &str) -> bool {
        let validation = Validation::new(Algorithm::HS256);
        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.token_secret.as_bytes()),
            &validation,
        )
        .is_ok()
    }
}

/// Middleware guarding the admin API routes.
pub async fn auth_middleware(
    auth_service: Arc<AuthService>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .unwrap_or("");

    if auth_service.validate_token(token) {
        next.run(request).await
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid or missing session token").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(password: &str) -> AuthService {
        AuthService::new(AuthConfig {
            admin_password_hash: Some(AuthService::hash_password(password)),
            token_secret: "test-secret".to_string(),
            token_ttl_secs: 60,
        })
    }

    #[test]
    fn login_accepts_correct_password() {
        let auth = service("hunter2");
        let issued = auth.login("hunter2").expect("login should succeed");
        assert!(auth.validate_token(&issued.token));
    }

    #[test]
    fn login_rejects_wrong_password() {
        let auth = service("hunter2");
        assert!(auth.login("letmein").is_none());
    }

    #[test]
    fn login_refused_without_configured_hash() {
        let auth = AuthService::new(AuthConfig {
            admin_password_hash: None,
            token_secret: "test-secret".to_string(),
            token_ttl_secs: 60,
        });
        assert!(auth.login("anything").is_none());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service("hunter2");
        let issued = auth.login("hunter2").unwrap();
        let mut forged = issued.token.clone();
        forged.push('x');
        assert!(!auth.validate_token(&forged));
        assert!(!auth.validate_token(""));
    }
}
