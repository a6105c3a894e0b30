use std::sync::Arc;

use crate::external::price_provider::PriceProvider;
use crate::services::failure_cache::FailureCache;
use crate::services::password_hasher::PasswordHasher;
use crate::services::session_service::SessionManager;
use crate::store::AccountRepository;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub price_provider: Arc<dyn PriceProvider>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub sessions: SessionManager,
    /// Shared with the failure-aware provider; swept by the cleanup task.
    pub symbol_failures: FailureCache,
}
