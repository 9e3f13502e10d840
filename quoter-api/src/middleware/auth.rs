use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quoter_shared::User;

use crate::{error::AppError, state::{AppState, AuthConfig}};

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

/// The account behind a verified token, available to handlers behind
/// `require_auth` as an `Extension<CurrentUser>`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub fn issue_token(auth: &AuthConfig, user: &User) -> Result<String, AppError> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn decode_token(auth: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::AuthenticationError("Token expired".to_string()),
        _ => AppError::AuthenticationError("Invalid token".to_string()),
    })
}

/// Token from the Authorization header. The `Bearer ` prefix is optional.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

async fn resolve_user(state: &AppState, token: &str) -> Result<User, AppError> {
    let claims = decode_token(&state.auth, token)?;

    state
        .users
        .get_user(claims.sub)
        .await
        .map_err(|e| AppError::InternalServerError(format!("User lookup failed: {}", e)))?
        .ok_or_else(|| AppError::AuthenticationError("User not found".to_string()))
}

/// User id for routes where signing in is optional. Any token problem
/// leaves the request anonymous.
pub async fn optional_user_id(state: &AppState, headers: &HeaderMap) -> Option<Uuid> {
    let token = bearer_token(headers)?;
    match resolve_user(state, token).await {
        Ok(user) => Some(user.id),
        Err(e) => {
            tracing::debug!("Ignoring unusable token on anonymous route: {:?}", e);
            None
        }
    }
}

// ============================================================================
// Authentication Middleware
// ============================================================================

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::AuthenticationError("No token provided".to_string()))?
        .to_string();

    let user = resolve_user(&state, &token).await?;
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
