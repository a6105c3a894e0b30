pub mod asset_service;
pub mod auth_service;
pub mod failure_cache;
pub mod market_service;
pub mod password_hasher;
pub mod rate_limiter;
pub mod session_service;
pub mod trade_service;

use crate::errors::AppError;

const MAX_SYMBOL_LEN: usize = 10;

fn is_ticker_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '^' | '-')
}

/// Trims and upper-cases a ticker, then checks it is a plausible symbol.
///
/// Symbols end up in provider URL paths, so only `A-Z`, `0-9`, `.`, `^` and
/// `-` are accepted, the first character may not be `.` or `-`, and the
/// length is capped at ten characters.
pub(crate) fn normalize_symbol(raw: &str) -> Result<String, AppError> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AppError::Validation("Stock symbol is not set".into()));
    }

    let valid_start = symbol
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '^');
    if symbol.len() > MAX_SYMBOL_LEN || !valid_start || !symbol.chars().all(is_ticker_char) {
        return Err(AppError::Validation(format!("Invalid stock symbol: {}", raw.trim())));
    }
    Ok(symbol)
}
