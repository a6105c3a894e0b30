pub mod account_queries;
pub mod asset_transaction_queries;
pub mod user_queries;
