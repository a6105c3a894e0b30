//! Router-level tests against the in-memory store and a fixed-price feed.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use stock_trader_backend::app::create_app;
use stock_trader_backend::external::failure_aware::FailureAwareProvider;
use stock_trader_backend::external::simulated::SimulatedProvider;
use stock_trader_backend::services::failure_cache::FailureCache;
use stock_trader_backend::errors::AppError;
use stock_trader_backend::services::password_hasher::PasswordHasher;
use stock_trader_backend::services::session_service::SessionManager;
use stock_trader_backend::state::AppState;
use stock_trader_backend::store::InMemoryAccountRepository;

const SECRET: &str = "integration-secret-integration-secret";

// Argon2 is slow in debug builds; its own unit tests cover it.
struct ReversingHasher;

impl PasswordHasher for ReversingHasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(password.chars().rev().collect())
    }

    fn verify(&self, password_hash: &str, password: &str) -> bool {
        password_hash.chars().eq(password.chars().rev())
    }
}

fn test_app() -> Router {
    let failures = FailureCache::new();
    let feed = SimulatedProvider::fixed([("MSFT", 100.0), ("AAPL", 25.0)]);
    let state = AppState {
        accounts: Arc::new(InMemoryAccountRepository::new()),
        price_provider: Arc::new(FailureAwareProvider::new(Box::new(feed), failures.clone())),
        password_hasher: Arc::new(ReversingHasher),
        sessions: SessionManager::new(SECRET, chrono::Duration::hours(1)),
        symbol_failures: failures,
    };
    create_app(state)
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_and_login(app: &Router, username: &str, balance: f64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": format!("{}@example.com", username),
            "username": username,
            "password": "testRegister123",
            "confirm_password": "testRegister123",
            "starting_balance": balance,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["result"], "Success");

    let (status, body) = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": username, "password": "testRegister123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["account"]["account_holder"].get("password_hash").is_none());
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_buy_sell_summary() {
    let app = test_app();
    let token = register_and_login(&app, "trader", 1_000.0).await;

    let (status, account) = send(
        &app,
        Method::POST,
        "/api/trades/buy",
        Some(&token),
        Some(json!({ "symbol": "msft", "shares": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", account);
    assert_eq!(account["balance"], 500.0);
    assert_eq!(account["asset_transactions"].as_array().unwrap().len(), 1);

    send(
        &app,
        Method::POST,
        "/api/trades/buy",
        Some(&token),
        Some(json!({ "symbol": "AAPL", "shares": 8 })),
    )
    .await;

    let (status, account) = send(
        &app,
        Method::POST,
        "/api/trades/sell",
        Some(&token),
        Some(json!({ "symbol": "MSFT", "shares": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["balance"], 500.0);
    assert_eq!(account["asset_transactions"].as_array().unwrap().len(), 3);

    let (status, summary) = send(&app, Method::GET, "/api/assets/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["balance"], 500.0);
    let top = summary["top_assets"].as_array().unwrap();
    assert_eq!(top[0]["symbol"], "AAPL");
    assert_eq!(top[0]["shares"], 8);
    assert_eq!(top[1]["symbol"], "MSFT");
    assert_eq!(top[1]["shares"], 3);

    let (_, by_value) = send(&app, Method::GET, "/api/assets/by-value?limit=1", Some(&token), None).await;
    let by_value = by_value.as_array().unwrap();
    assert_eq!(by_value.len(), 1);
    assert_eq!(by_value[0]["symbol"], "MSFT");
    assert_eq!(by_value[0]["value"], 300.0);

    let (status, found) = send(&app, Method::GET, "/api/assets/search/msft", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found["shares_owned"], 3);
    assert_eq!(found["price_per_share"], 100.0);
}

#[tokio::test]
async fn test_trade_errors_are_reported() {
    let app = test_app();
    let token = register_and_login(&app, "trader", 100.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trades/buy",
        Some(&token),
        Some(json!({ "symbol": "MSFT", "shares": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_balance");
    assert_eq!(body["required"], 200.0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trades/sell",
        Some(&token),
        Some(json!({ "symbol": "AAPL", "shares": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient_shares");
    assert_eq!(body["owned"], 0);
    assert_eq!(body["requested"], 1);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trades/buy",
        Some(&token),
        Some(json!({ "symbol": "ZZZZ", "shares": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "invalid_symbol");
}

#[tokio::test]
async fn test_register_rejections() {
    let app = test_app();
    register_and_login(&app, "trader", 100.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "other@example.com",
            "username": "trader",
            "password": "pw",
            "confirm_password": "pw",
            "starting_balance": 10.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["result"], "UsernameAlreadyExists");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "email": "new@example.com",
            "username": "newbie",
            "password": "pw",
            "confirm_password": "different",
            "starting_balance": 10.0,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["result"], "PasswordDoNotMatch");
}

#[tokio::test]
async fn test_login_failures() {
    let app = test_app();
    register_and_login(&app, "trader", 100.0).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "nobody", "password": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user_not_found");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "trader", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_password");
}

#[tokio::test]
async fn test_logout_and_account_deletion_end_sessions() {
    let app = test_app();
    let token = register_and_login(&app, "trader", 100.0).await;

    let (status, me) = send(&app, Method::GET, "/api/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["account_holder"]["username"], "trader");

    let (status, _) = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "username": "trader", "password": "testRegister123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(&app, Method::DELETE, "/api/accounts/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::GET, "/api/assets/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_market_routes() {
    let app = test_app();

    let (status, indexes) = send(&app, Method::GET, "/api/market/indexes", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(indexes.as_array().unwrap().len(), 3);

    let (status, index) = send(&app, Method::GET, "/api/market/indexes/nasdaq", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index["index_type"], "Nasdaq");

    let (status, _) = send(&app, Method::GET, "/api/market/indexes/ftse", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, quote) = send(&app, Method::GET, "/api/market/quote/aapl", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(quote["symbol"], "AAPL");
    assert_eq!(quote["price"], 25.0);

    let (status, body) = send(&app, Method::GET, "/api/market/quote/..%2F..%2Fv4%2Fx", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/api/assets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app, Method::GET, "/api/assets", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
