use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Account;
use crate::routes::extract::CurrentAccount;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_account).delete(delete_account))
}

pub async fn get_account(current: CurrentAccount) -> Json<Account> {
    info!("GET /api/accounts/me - Account {}", current.account.id);
    Json(current.account)
}

pub async fn delete_account(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<StatusCode, AppError> {
    let account_id = current.account.id;
    info!("DELETE /api/accounts/me - Closing account {}", account_id);

    let deleted = state.accounts.delete(account_id).await.map_err(|e| {
        error!("Failed to delete account {}: {}", account_id, e);
        AppError::from(e)
    })?;
    if !deleted {
        return Err(AppError::NotFound(format!("account {}", account_id)));
    }

    state.sessions.revoke_account(account_id);
    Ok(StatusCode::NO_CONTENT)
}
