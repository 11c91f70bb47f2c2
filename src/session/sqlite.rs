use crate::db::SqlitePool;
use crate::error::TxirimiriError;
use crate::session::SessionId;

/// Session entries kept in the `session_entries` table next to the catalog.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn load(
        &self,
        id: &SessionId,
        key: &str,
        now: i64,
    ) -> Result<Option<String>, TxirimiriError> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT payload, expires_at FROM session_entries WHERE session_id = ? AND key = ?",
        )
        .bind(id.as_str())
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((payload, expires_at)) if expires_at > now => Ok(Some(payload)),
            Some(_) => {
                self.remove(id, key).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Upsert by (session_id, key), replacing payload and expiry.
    pub async fn store(
        &self,
        id: &SessionId,
        key: &str,
        payload: String,
        expires_at: i64,
    ) -> Result<(), TxirimiriError> {
        sqlx::query(
            r#"
            INSERT INTO session_entries (session_id, key, payload, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_id, key) DO UPDATE SET
                payload=excluded.payload,
                expires_at=excluded.expires_at
            "#,
        )
        .bind(id.as_str())
        .bind(key)
        .bind(payload)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, id: &SessionId, key: &str) -> Result<(), TxirimiriError> {
        sqlx::query("DELETE FROM session_entries WHERE session_id = ? AND key = ?")
            .bind(id.as_str())
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn purge(&self, now: i64) -> Result<u64, TxirimiriError> {
        let res = sqlx::query("DELETE FROM session_entries WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
