use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One opaque record of the `kv_store` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

/// Fixed-width RFC 3339 so that `updated_at` compares lexicographically.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl KvEntry {
    pub async fn find(pool: &sqlx::SqlitePool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, KvEntry>("SELECT key, value, updated_at FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    pub async fn upsert(
        pool: &sqlx::SqlitePool,
        key: &str,
        value: &str,
        at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(timestamp(at))
        .execute(pool)
        .await?;

        Ok(())
    }

    pub async fn delete(pool: &sqlx::SqlitePool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes every record under `prefix` last written before `cutoff`.
    pub async fn delete_older_than(
        pool: &sqlx::SqlitePool,
        prefix: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key LIKE ? AND updated_at < ?")
            .bind(format!("{prefix}%"))
            .bind(timestamp(cutoff))
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Removes every record under `prefix`, regardless of age.
    pub async fn delete_with_prefix(pool: &sqlx::SqlitePool, prefix: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key LIKE ?")
            .bind(format!("{prefix}%"))
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn count_with_prefix(pool: &sqlx::SqlitePool, prefix: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM kv_store WHERE key LIKE ?")
            .bind(format!("{prefix}%"))
            .fetch_one(pool)
            .await
    }
}
