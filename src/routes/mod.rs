pub mod accounts;
pub mod assets;
pub mod auth;
pub mod extract;
pub mod health;
pub mod market;
pub mod trades;
