use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use asistencia_core::AppError;

use crate::dto::ErrorResponse;
use crate::state::AppState;

/// Settings for issuing and validating access tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: String,
    pub token_expire_minutes: u64,
}

impl AuthConfig {
    /// Read configuration from environment variables.
    ///
    /// - `ASISTENCIA_SECRET_KEY` (optional, defaults to a development key)
    /// - `ASISTENCIA_TOKEN_EXPIRE_MINUTES` (optional, defaults to 24h)
    pub fn from_env() -> Self {
        let secret_key =
            std::env::var("ASISTENCIA_SECRET_KEY").unwrap_or_else(|_| "changeme".to_string());
        let token_expire_minutes = std::env::var("ASISTENCIA_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .unwrap_or(60 * 24);

        Self {
            secret_key,
            token_expire_minutes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: i64,
    exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::Generic(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hashed: &str) -> bool {
    bcrypt::verify(password, hashed).unwrap_or(false)
}

/// Issue a signed HS256 access token for a user id.
pub fn create_access_token(user_id: i64, config: &AuthConfig) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .checked_add(Duration::from_secs(config.token_expire_minutes * 60))
        .unwrap_or_else(SystemTime::now);
    let exp = expiration
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs() as usize;

    let claims = TokenClaims { sub: user_id, exp };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_key.as_bytes()),
    )
    .map_err(|e| AppError::Generic(format!("Token signing failed: {e}")))
}

/// Validate a token's signature and expiry, returning the user id it was
/// issued for.
pub fn decode_token(token: &str, config: &AuthConfig) -> Result<i64, AppError> {
    let data = jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret_key.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

    Ok(data.claims.sub)
}

/// Middleware that validates `Authorization: Bearer <token>` on protected routes.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    let authenticated = match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .is_some_and(|token| decode_token(token, &state.auth).is_ok()),
        None => false,
    };

    if !authenticated {
        let body = ErrorResponse {
            error: "unauthorized".to_string(),
            message: "Missing or invalid Authorization header. Expected: Bearer <token>"
                .to_string(),
        };
        return (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
    }

    next.run(request).await
}
