use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use quoter_core::identity::PasswordHasher;
use quoter_core::CoreError;
use quoter_shared::{Masked, NewUser, User};

use crate::{
    error::AppError,
    middleware::auth::{issue_token, require_auth, CurrentUser},
    state::AppState,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<Masked<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<Masked<String>>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: User,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route(
            "/auth/me",
            get(me).route_layer(middleware::from_fn_with_state(state, require_auth)),
        )
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn present_secret(value: Option<Masked<String>>) -> Option<Masked<String>> {
    value.filter(|v| !v.expose().is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(req) = payload.map_err(|_| AppError::ValidationError("No data provided".to_string()))?;

    let (Some(username), Some(email), Some(password)) = (
        present(req.username),
        present(req.email),
        present_secret(req.password),
    ) else {
        return Err(AppError::ValidationError("Missing required fields".to_string()));
    };

    let lookup = |e: quoter_core::BoxError| AppError::failed("Registration failed", e);
    if state.users.find_by_username(&username).await.map_err(lookup)?.is_some() {
        return Err(AppError::ValidationError("Username already exists".to_string()));
    }
    if state.users.find_by_email(&email).await.map_err(lookup)?.is_some() {
        return Err(AppError::ValidationError("Email already exists".to_string()));
    }

    let hasher = PasswordHasher::new(state.auth.bcrypt_cost);
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(password.expose()))
        .await
        .map_err(|e| AppError::failed("Registration failed", e))?
        .map_err(|e| AppError::failed("Registration failed", e))?;

    let user = state
        .users
        .create_user(NewUser { username, email, password_hash })
        .await
        .map_err(|e| AppError::failed("Registration failed", e))?;

    tracing::info!("Registered user {} ({})", user.username, user.id);
    let token = issue_token(&state.auth, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse { success: true, token, user }),
    ))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(req) = payload.map_err(|_| AppError::ValidationError("No data provided".to_string()))?;

    let (Some(username), Some(password)) = (present(req.username), present_secret(req.password)) else {
        return Err(AppError::ValidationError("Missing credentials".to_string()));
    };

    let invalid = || AppError::AuthenticationError("Invalid credentials".to_string());

    let user = state
        .users
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::failed("Login failed", e))?
        .ok_or_else(invalid)?;

    let hasher = PasswordHasher::new(state.auth.bcrypt_cost);
    let stored = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || hasher.verify(password.expose(), &stored))
        .await
        .map_err(|e| AppError::failed("Login failed", e))?;

    match verified {
        Ok(true) => {}
        // Unreadable stored hashes fail the same way as a wrong password
        Ok(false) | Err(CoreError::IdentityError(_)) => return Err(invalid()),
        Err(e) => return Err(AppError::failed("Login failed", e)),
    }

    let token = issue_token(&state.auth, &user)?;
    Ok(Json(AuthResponse { success: true, token, user }))
}

/// GET /auth/me
async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<MeResponse> {
    Json(MeResponse { success: true, user })
}
