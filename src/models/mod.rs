mod user;
mod account;
mod asset_transaction;
mod major_index;
mod holding;
mod auth;
mod trade;

pub use user::User;
pub use account::Account;
pub use asset_transaction::{Asset, AssetTransaction};
pub use major_index::{MajorIndex, MajorIndexType};
pub use holding::{AssetHolding, AssetSummary, HoldingsQuery, StockQuote, SymbolSearchResult};
pub use auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, RegistrationResult};
pub use trade::TradeRequest;
