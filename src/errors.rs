use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(sqlx::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("User {username} does not exist")]
    UserNotFound { username: String },
    #[error("Password is incorrect for user {username}")]
    InvalidPassword { username: String },
    #[error("Account {username} is registered on another PC: {pc_name}")]
    DifferentPcName {
        username: String,
        machine_name: String,
        pc_name: String,
    },
    #[error("Symbol {symbol} does not exist")]
    InvalidSymbol { symbol: String },
    #[error("Account has insufficient shares of {symbol}: owns {owned}, requested {requested}")]
    InsufficientShares {
        symbol: String,
        owned: i64,
        requested: i64,
    },
    #[error("Result balance has to be more than 0: balance {balance:.2}, required {required:.2}")]
    InsufficientBalance { balance: f64, required: f64 },
    #[error("The transaction failed")]
    TransactionFailed,
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("External error: {0}")]
    External(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::UserNotFound { .. } | AppError::InvalidSymbol { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::Unauthorized | AppError::InvalidPassword { .. } => StatusCode::UNAUTHORIZED,
            AppError::DifferentPcName { .. } => StatusCode::FORBIDDEN,
            AppError::InsufficientShares { .. } | AppError::InsufficientBalance { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::External(_) => StatusCode::BAD_GATEWAY,
            AppError::Db(_) | AppError::TransactionFailed | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Db(_) => "database_error",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::UserNotFound { .. } => "user_not_found",
            AppError::InvalidPassword { .. } => "invalid_password",
            AppError::DifferentPcName { .. } => "different_pc_name",
            AppError::InvalidSymbol { .. } => "invalid_symbol",
            AppError::InsufficientShares { .. } => "insufficient_shares",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::TransactionFailed => "transaction_failed",
            AppError::RateLimited => "rate_limited",
            AppError::External(_) => "external_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    // Server-side failures are logged, not echoed to the client.
    fn public_message(&self) -> String {
        match self {
            AppError::Db(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::UserNotFound { .. } => "Username does not exist".to_string(),
            AppError::InvalidPassword { .. } => "Password is incorrect".to_string(),
            AppError::DifferentPcName { pc_name, .. } => {
                format!("Login failed. This account is registered on another PC: {}", pc_name)
            }
            AppError::InsufficientShares { owned, .. } => {
                format!("Account has insufficient shares. You only have {} shares.", owned)
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let mut body = json!({
            "error": self.code(),
            "message": self.public_message(),
        });

        match &self {
            AppError::InsufficientShares { symbol, owned, requested } => {
                body["symbol"] = json!(symbol);
                body["owned"] = json!(owned);
                body["requested"] = json!(requested);
            }
            AppError::InsufficientBalance { balance, required } => {
                body["balance"] = json!(balance);
                body["required"] = json!(required);
            }
            AppError::InvalidSymbol { symbol } => {
                body["symbol"] = json!(symbol);
            }
            _ => {}
        }

        if matches!(self, AppError::RateLimited) {
            let mut headers = HeaderMap::new();
            headers.insert("Retry-After", HeaderValue::from_static("60"));
            return (status, headers, Json(body)).into_response();
        }

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        AppError::Db(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Db(e) => AppError::Db(e),
            StoreError::Duplicate(field) => AppError::Validation(format!("{} already exists", field)),
        }
    }
}

impl From<PriceProviderError> for AppError {
    fn from(value: PriceProviderError) -> Self {
        match value {
            PriceProviderError::NotFound(symbol) => AppError::InvalidSymbol { symbol },
            PriceProviderError::RateLimited => AppError::RateLimited,
            other => AppError::External(other.to_string()),
        }
    }
}
