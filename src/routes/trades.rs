use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{Account, TradeRequest};
use crate::routes::extract::CurrentAccount;
use crate::services::trade_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buy", post(buy))
        .route("/sell", post(sell))
}

pub async fn buy(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(input): Json<TradeRequest>,
) -> Result<Json<Account>, AppError> {
    info!(
        "POST /api/trades/buy - Account {} buying {} {}",
        current.account.id, input.shares, input.symbol
    );
    let account = trade_service::buy_stock(
        state.accounts.as_ref(),
        state.price_provider.as_ref(),
        &current.account,
        &input.symbol,
        input.shares,
    )
    .await
    .map_err(|e| {
        error!("Buy of {} {} failed: {}", input.shares, input.symbol, e);
        e
    })?;
    Ok(Json(account))
}

pub async fn sell(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(input): Json<TradeRequest>,
) -> Result<Json<Account>, AppError> {
    info!(
        "POST /api/trades/sell - Account {} selling {} {}",
        current.account.id, input.shares, input.symbol
    );
    let account = trade_service::sell_stock(
        state.accounts.as_ref(),
        state.price_provider.as_ref(),
        &current.account,
        &input.symbol,
        input.shares,
    )
    .await
    .map_err(|e| {
        error!("Sell of {} {} failed: {}", input.shares, input.symbol, e);
        e
    })?;
    Ok(Json(account))
}
