use async_trait::async_trait;
use axum::extract::FromRequestParts;
use http::header::AUTHORIZATION;
use http::request::Parts;
use tracing::warn;

use crate::errors::AppError;
use crate::models::Account;
use crate::services::session_service::Session;
use crate::state::AppState;

/// A caller holding a live `Authorization: Bearer <jwt>` session.
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthSession(state.sessions.authenticate(token)?))
    }
}

/// The logged-in account, freshly loaded from the store.
pub struct CurrentAccount {
    pub account: Account,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;

        match state.accounts.find_by_id(session.account_id).await? {
            Some(account) => Ok(CurrentAccount { account }),
            None => {
                warn!("Session {} refers to a deleted account", session.session_id);
                state.sessions.revoke(session.session_id);
                Err(AppError::Unauthorized)
            }
        }
    }
}
