use auth::Authenticator;
use auth::JwtError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use thiserror::Error;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::MessageResponse;
use crate::inbound::http::router::AppState;

/// Extension type to store authenticated user ID in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Why the gate turned a request away.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("no token provided")]
    NoToken,

    #[error("invalid or expired token: {0}")]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthRejection::NoToken => (
                StatusCode::UNAUTHORIZED,
                "Access denied: no token provided",
            ),
            AuthRejection::InvalidToken(_) => (StatusCode::FORBIDDEN, "Invalid or expired token"),
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}

/// Middleware that validates JWT tokens and adds user info to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let user = authorize(req.headers(), &state.authenticator).map_err(|e| {
        tracing::warn!(reason = %e, "Request rejected by authorization gate");
        e
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Resolve the caller of a request from its `Authorization` header.
///
/// # Errors
/// * `NoToken` - No usable bearer token in the request
/// * `InvalidToken` - Token is malformed, badly signed, expired, or names no user id
pub fn authorize(
    headers: &HeaderMap,
    authenticator: &Authenticator,
) -> Result<AuthenticatedUser, AuthRejection> {
    let token = bearer_token(headers).ok_or(AuthRejection::NoToken)?;

    let claims = authenticator.validate_token(token)?;

    let user_id = UserId::from_string(&claims.sub)
        .map_err(|e| JwtError::Malformed(format!("subject is not a user id: {}", e)))?;

    Ok(AuthenticatedUser { user_id })
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
