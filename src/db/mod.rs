//! Database persistence for saved calculations and user settings.
//!
//! Stores:
//! - Calculation history (inputs + results as a JSON payload)
//! - A small key-value table used for the settings entry

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::debug;

use crate::models::{CalculationResult, HistoryRecord, TradeInput};

/// Database connection pool.
pub struct Database {
    pool: SqlitePool,
}

/// History row as stored.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredHistory {
    pub id: String,
    pub created_at: String,
    pub notes: Option<String>,
    pub payload: String,
}

#[derive(Deserialize)]
struct HistoryPayload {
    input: TradeInput,
    result: CalculationResult,
}

impl StoredHistory {
    /// Decode the row into a history record.
    pub fn into_record(self) -> Result<HistoryRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .with_context(|| format!("Bad timestamp on history record {}", self.id))?
            .with_timezone(&Utc);
        let payload: HistoryPayload = serde_json::from_str(&self.payload)
            .with_context(|| format!("Bad payload on history record {}", self.id))?;

        Ok(HistoryRecord {
            id: self.id,
            created_at,
            notes: self.notes,
            input: payload.input,
            result: payload.result,
        })
    }
}

impl Database {
    /// Create a new database connection.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Private in-memory database; a single connection keeps the data alive.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run all database migrations.
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                notes TEXT,
                payload TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_history_created ON history(created_at)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ==================== History ====================

    /// Append a calculation to the history.
    pub async fn append_history(&self, record: &HistoryRecord) -> Result<()> {
        if !record.result.is_finite() {
            bail!("Refusing to save a calculation with non-finite results");
        }

        let payload = serde_json::to_string(&serde_json::json!({
            "input": &record.input,
            "result": &record.result,
        }))
        .context("Failed to encode history payload")?;

        sqlx::query("INSERT INTO history (id, created_at, notes, payload) VALUES (?, ?, ?, ?)")
            .bind(&record.id)
            .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
            .bind(record.notes.as_deref())
            .bind(payload)
            .execute(&self.pool)
            .await
            .context("Failed to save history record")?;

        debug!(id = %record.id, "History record saved");
        Ok(())
    }

    /// All saved calculations, newest first.
    pub async fn list_history(&self) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query_as::<_, StoredHistory>(
            "SELECT id, created_at, notes, payload FROM history ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch history")?;

        rows.into_iter().map(StoredHistory::into_record).collect()
    }

    /// Look up one record by its full id or a unique id prefix.
    pub async fn get_history(&self, id: &str) -> Result<Option<HistoryRecord>> {
        if id.is_empty() {
            return Ok(None);
        }

        // Literal prefix comparison; no wildcard interpretation of the input.
        let rows = sqlx::query_as::<_, StoredHistory>(
            "SELECT id, created_at, notes, payload FROM history WHERE substr(id, 1, length(?)) = ? LIMIT 2",
        )
        .bind(id)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch history record")?;

        if let Some(exact) = rows.iter().find(|r| r.id == id) {
            return exact.clone().into_record().map(Some);
        }
        match rows.len() {
            0 => Ok(None),
            1 => rows.into_iter().next().map(StoredHistory::into_record).transpose(),
            _ => bail!("Id prefix '{}' matches more than one record", id),
        }
    }

    /// Delete one record. Returns false if no record had that id.
    pub async fn delete_history(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM history WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete history record")?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every record. Returns how many were removed.
    pub async fn clear_history(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM history")
            .execute(&self.pool)
            .await
            .context("Failed to clear history")?;

        Ok(result.rows_affected())
    }

    // ==================== Key-Value ====================

    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(v,)| v))
    }

    pub async fn set_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = datetime('now')
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete_value(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
