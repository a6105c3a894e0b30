use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use tracing::debug;

/// Entries kept before new failures stop being recorded.
const MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct FailureInfo {
    pub failed_at: DateTime<Utc>,
    pub failure_type: FailureType,
    pub ttl: Duration,
}

impl FailureInfo {
    fn expires_at(&self) -> DateTime<Utc> {
        self.failed_at + self.ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Provider does not know the symbol.
    NotFound,
    /// Provider quota exhausted.
    RateLimited,
}

impl FailureType {
    fn ttl(self) -> Duration {
        match self {
            FailureType::NotFound => Duration::hours(6),
            FailureType::RateLimited => Duration::minutes(1),
        }
    }
}

/// Symbols whose last lookup failed, so repeated searches for a typo do not
/// burn provider quota.
#[derive(Clone, Default)]
pub struct FailureCache {
    cache: Arc<DashMap<String, FailureInfo>>,
}

impl FailureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live failure for `symbol`, dropping it if the TTL has passed.
    pub fn is_failed(&self, symbol: &str) -> Option<FailureInfo> {
        let info = self.cache.get(symbol).map(|entry| entry.value().clone())?;
        if Utc::now() < info.expires_at() {
            Some(info)
        } else {
            self.cache.remove(symbol);
            None
        }
    }

    pub fn record_failure(&self, symbol: &str, failure_type: FailureType) {
        self.record_failure_at(symbol, failure_type, Utc::now());
    }

    fn record_failure_at(&self, symbol: &str, failure_type: FailureType, failed_at: DateTime<Utc>) {
        if self.cache.len() >= MAX_ENTRIES && !self.cache.contains_key(symbol) {
            self.cleanup_expired();
            if self.cache.len() >= MAX_ENTRIES {
                debug!("Failure cache full, not recording {}", symbol);
                return;
            }
        }
        let info = FailureInfo {
            failed_at,
            failure_type,
            ttl: failure_type.ttl(),
        };
        self.cache.insert(symbol.to_string(), info);
    }

    pub fn clear(&self, symbol: &str) {
        self.cache.remove(symbol);
    }

    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.cache.retain(|_, info| now < info.expires_at());
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
