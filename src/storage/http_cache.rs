use super::schema::Database;
use super::types::{CacheEntry, StoreError};

type EntryRow = (String, String, i64, Option<String>, Vec<u8>);

fn into_entry((cache_name, url, status, content_type, body): EntryRow) -> CacheEntry {
    CacheEntry {
        cache_name,
        url,
        status: u16::try_from(status).unwrap_or(0),
        content_type,
        body,
    }
}

impl Database {
    // ========================================================================
    // Offline Cache Partitions
    // ========================================================================

    /// Create the named partition if it does not exist yet.
    pub async fn cache_open(&self, name: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO http_caches (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Store one response, replacing any earlier copy of the same URL.
    pub async fn cache_put(&self, entry: &CacheEntry) -> Result<(), StoreError> {
        self.cache_put_all(std::slice::from_ref(entry)).await
    }

    /// Store several responses in one transaction: either all land or none do.
    pub async fn cache_put_all(&self, entries: &[CacheEntry]) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query("INSERT OR IGNORE INTO http_caches (name) VALUES (?)")
                .bind(&entry.cache_name)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO http_cache_entries (cache_name, url, status, content_type, body, stored_at)
                VALUES (?, ?, ?, ?, ?, datetime('now'))
                ON CONFLICT(cache_name, url) DO UPDATE SET
                    status = excluded.status,
                    content_type = excluded.content_type,
                    body = excluded.body,
                    stored_at = excluded.stored_at
            "#,
            )
            .bind(&entry.cache_name)
            .bind(&entry.url)
            .bind(i64::from(entry.status))
            .bind(&entry.content_type)
            .bind(&entry.body)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Find a stored response for `url`, searching `names` in order.
    pub async fn cache_match(
        &self,
        url: &str,
        names: &[&str],
    ) -> Result<Option<CacheEntry>, StoreError> {
        for name in names {
            let row: Option<EntryRow> = sqlx::query_as(
                r#"
                SELECT cache_name, url, status, content_type, body
                FROM http_cache_entries
                WHERE cache_name = ? AND url = ?
            "#,
            )
            .bind(name)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(row) = row {
                return Ok(Some(into_entry(row)));
            }
        }
        Ok(None)
    }

    /// Names of every partition, oldest first.
    pub async fn cache_names(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM http_caches ORDER BY created_at, rowid")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    /// Delete a partition and everything stored in it. Returns whether it existed.
    pub async fn cache_delete(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM http_caches WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
