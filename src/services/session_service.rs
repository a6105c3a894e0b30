use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    sid: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub session_id: Uuid,
    pub account_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub session: Session,
    pub expires_at: DateTime<Utc>,
}

/// Who is logged in. Tokens are signed JWTs, and each one names a server-side
/// session so logout takes effect before the token expires.
#[derive(Clone)]
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    sessions: Arc<DashMap<Uuid, SessionEntry>>,
}

impl SessionManager {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            sessions: Arc::new(DashMap::new()),
        }
    }

    pub fn issue(&self, account_id: Uuid) -> Result<IssuedToken, AppError> {
        let session_id = Uuid::new_v4();
        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;

        let claims = Claims {
            sub: account_id.to_string(),
            sid: session_id.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("token signing failed: {}", e)))?;

        self.sessions.insert(session_id, SessionEntry { account_id, expires_at });
        debug!("Issued session {} for account {}", session_id, account_id);

        Ok(IssuedToken {
            token,
            session: Session { session_id, account_id },
            expires_at,
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                warn!("Rejected token: {}", e);
                AppError::Unauthorized
            })?;

        let session_id = Uuid::parse_str(&data.claims.sid).map_err(|_| AppError::Unauthorized)?;
        let account_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized)?;

        let entry = self
            .sessions
            .get(&session_id)
            .map(|e| e.value().clone())
            .ok_or(AppError::Unauthorized)?;
        if entry.account_id != account_id || entry.expires_at <= Utc::now() {
            return Err(AppError::Unauthorized);
        }

        Ok(Session { session_id, account_id })
    }

    pub fn revoke(&self, session_id: Uuid) -> bool {
        self.sessions.remove(&session_id).is_some()
    }

    pub fn revoke_account(&self, account_id: Uuid) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.account_id != account_id);
        before - self.sessions.len()
    }

    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.expires_at > now);
        before - self.sessions.len()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
