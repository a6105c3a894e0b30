use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::{MajorIndex, MajorIndexType, StockQuote};
use crate::services::market_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/indexes", get(major_indexes))
        .route("/indexes/:index", get(major_index))
        .route("/quote/:symbol", get(quote))
}

pub async fn major_indexes(State(state): State<AppState>) -> Json<Vec<MajorIndex>> {
    info!("GET /api/market/indexes - Fetching major indexes");
    Json(market_service::major_indexes(state.price_provider.as_ref()).await)
}

pub async fn major_index(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<MajorIndex>, AppError> {
    info!("GET /api/market/indexes/{} - Fetching index", index);
    let index_type: MajorIndexType = index.parse().map_err(AppError::Validation)?;
    Ok(Json(market_service::major_index(state.price_provider.as_ref(), index_type).await))
}

pub async fn quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<StockQuote>, AppError> {
    info!("GET /api/market/quote/{} - Fetching quote", symbol);
    let quote = market_service::quote(state.price_provider.as_ref(), &symbol)
        .await
        .map_err(|e| {
            error!("Quote for {} failed: {}", symbol, e);
            e
        })?;
    Ok(Json(quote))
}
