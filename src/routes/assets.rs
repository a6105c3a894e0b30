use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{AssetHolding, AssetSummary, HoldingsQuery, SymbolSearchResult};
use crate::routes::extract::CurrentAccount;
use crate::services::asset_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_holdings))
        .route("/by-value", get(list_holdings_by_value))
        .route("/summary", get(summary))
        .route("/search/:symbol", get(search_symbol))
}

pub async fn list_holdings(
    current: CurrentAccount,
    Query(query): Query<HoldingsQuery>,
) -> Json<Vec<AssetHolding>> {
    info!("GET /api/assets - Holdings for account {}", current.account.id);
    Json(asset_service::holdings(&current.account, query.limit))
}

pub async fn list_holdings_by_value(
    State(state): State<AppState>,
    current: CurrentAccount,
    Query(query): Query<HoldingsQuery>,
) -> Result<Json<Vec<AssetHolding>>, AppError> {
    info!("GET /api/assets/by-value - Holdings for account {}", current.account.id);
    let holdings = asset_service::holdings_by_value(state.price_provider.as_ref(), &current.account, query.limit)
        .await
        .map_err(|e| {
            error!("Failed to price holdings for account {}: {}", current.account.id, e);
            e
        })?;
    Ok(Json(holdings))
}

pub async fn summary(current: CurrentAccount) -> Json<AssetSummary> {
    info!("GET /api/assets/summary - Summary for account {}", current.account.id);
    Json(asset_service::summary(&current.account))
}

pub async fn search_symbol(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(symbol): Path<String>,
) -> Result<Json<SymbolSearchResult>, AppError> {
    info!("GET /api/assets/search/{} - Searching", symbol);
    let result = asset_service::search_symbol(state.price_provider.as_ref(), &current.account, &symbol)
        .await
        .map_err(|e| {
            error!("Search for {} failed: {}", symbol, e);
            e
        })?;
    Ok(Json(result))
}
