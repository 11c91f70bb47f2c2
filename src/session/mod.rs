//! Server-side session storage.
//!
//! A session is a set of `(session id, key) -> JSON payload` entries, each
//! with an absolute expiry of `now + ttl` set on every write. Expired entries
//! read as absent and are swept by [`spawn_purge_task`].

pub mod memory;
pub mod sqlite;

use crate::config::{SessionBackend, SessionConfig};
use crate::db::SqlitePool;
use crate::error::TxirimiriError;
use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

pub use memory::MemorySessionHandle;
pub use sqlite::SqliteSessionStore;

/// Session key under which the signed-in CloudKit user is kept.
pub const USER_SESSION_KEY: &str = "user";

/// Opaque browser session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accepts only well-formed ids; anything else is treated as no session.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw.trim())
            .ok()
            .map(|u| Self(u.simple().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of the CloudKit user signed in from this browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_record_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Clone)]
enum Backend {
    Sqlite(SqliteSessionStore),
    Memory(MemorySessionHandle),
}

#[derive(Clone)]
pub struct SessionStore {
    backend: Backend,
    ttl: Duration,
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

impl SessionStore {
    /// SQLite-backed store; the `session_entries` table must already exist.
    pub fn sqlite(pool: SqlitePool, ttl: Duration) -> Self {
        Self {
            backend: Backend::Sqlite(SqliteSessionStore::new(pool)),
            ttl,
        }
    }

    /// In-process store owned by a dedicated actor; lost on restart.
    pub async fn memory(ttl: Duration) -> Result<Self, TxirimiriError> {
        Ok(Self {
            backend: Backend::Memory(memory::spawn().await?),
            ttl,
        })
    }

    pub async fn from_config(
        cfg: &SessionConfig,
        pool: SqlitePool,
    ) -> Result<Self, TxirimiriError> {
        match cfg.backend {
            SessionBackend::Sqlite => Ok(Self::sqlite(pool, cfg.ttl())),
            SessionBackend::Memory => Self::memory(cfg.ttl()).await,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        id: &SessionId,
        key: &str,
    ) -> Result<Option<T>, TxirimiriError> {
        let now = now_unix();
        let raw = match &self.backend {
            Backend::Sqlite(s) => s.load(id, key, now).await?,
            Backend::Memory(m) => m.load(id, key, now).await?,
        };
        let Some(raw) = raw else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable session entry");
                Ok(None)
            }
        }
    }

    pub async fn put<T: Serialize>(
        &self,
        id: &SessionId,
        key: &str,
        value: &T,
    ) -> Result<(), TxirimiriError> {
        let payload = serde_json::to_string(value)?;
        let ttl_secs = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let expires_at = now_unix().saturating_add(ttl_secs);
        match &self.backend {
            Backend::Sqlite(s) => s.store(id, key, payload, expires_at).await,
            Backend::Memory(m) => m.store(id, key, payload, expires_at),
        }
    }

    pub async fn remove(&self, id: &SessionId, key: &str) -> Result<(), TxirimiriError> {
        match &self.backend {
            Backend::Sqlite(s) => s.remove(id, key).await,
            Backend::Memory(m) => m.remove(id, key),
        }
    }

    /// Drop every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, TxirimiriError> {
        let now = now_unix();
        match &self.backend {
            Backend::Sqlite(s) => s.purge(now).await,
            Backend::Memory(m) => m.purge(now).await,
        }
    }
}

/// Periodically sweep expired session entries for the life of the process.
pub fn spawn_purge_task(store: SessionStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "purged expired session entries"),
                Err(e) => warn!(error = %e, "session purge failed"),
            }
        }
    })
}
