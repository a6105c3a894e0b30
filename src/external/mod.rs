pub mod failure_aware;
pub mod financial_modeling;
pub mod price_provider;
pub mod simulated;
