use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RegistrationResult};
use crate::routes::extract::AuthSession;
use crate::services::auth_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

fn registration_status(result: RegistrationResult) -> StatusCode {
    match result {
        RegistrationResult::Success => StatusCode::CREATED,
        RegistrationResult::EmailAlreadyExists | RegistrationResult::UsernameAlreadyExists => StatusCode::CONFLICT,
        _ => StatusCode::BAD_REQUEST,
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    info!("POST /api/auth/register - Registering {}", input.username);
    let username = input.username.clone();
    let result = auth_service::register(state.accounts.as_ref(), state.password_hasher.as_ref(), input)
        .await
        .map_err(|e| {
            error!("Failed to register {}: {}", username, e);
            e
        })?;

    if result != RegistrationResult::Success {
        warn!("Registration for {} rejected: {:?}", username, result);
    }
    Ok((registration_status(result), Json(result.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("POST /api/auth/login - Login for {}", input.username);
    let account = auth_service::login(state.accounts.as_ref(), state.password_hasher.as_ref(), &input)
        .await
        .map_err(|e| {
            warn!("Login for {} failed: {}", input.username, e);
            e
        })?;

    let issued = state.sessions.issue(account.id)?;
    Ok(Json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        account,
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    AuthSession(session): AuthSession,
) -> StatusCode {
    info!("POST /api/auth/logout - Ending session {}", session.session_id);
    state.sessions.revoke(session.session_id);
    StatusCode::NO_CONTENT
}
