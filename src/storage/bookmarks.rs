use super::schema::Database;
use super::types::StoreError;
use crate::news::Article;

/// Key namespace for saved articles in `local_store`.
pub const ARTICLE_KEY_PREFIX: &str = "article_";

fn article_key(id: &str) -> String {
    format!("{ARTICLE_KEY_PREFIX}{id}")
}

/// LIKE pattern matching every key under `prefix`, with `%`, `_` and `\`
/// escaped so they match literally.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Database {
    // ========================================================================
    // Local Article Store
    // ========================================================================

    /// Persist an article under `article_<id>`, assigning the URL-derived id
    /// first when the record has none. An existing record with the same id
    /// is overwritten.
    ///
    /// Returns the id the article was stored under.
    pub async fn save_article(&self, article: &mut Article) -> Result<String, StoreError> {
        let id = article.ensure_id().to_string();
        let value = serde_json::to_string(&*article)?;

        sqlx::query(
            r#"
            INSERT INTO local_store (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(article_key(&id))
        .bind(&value)
        .execute(&self.pool)
        .await?;

        tracing::debug!(id = %id, "Saved article");
        Ok(id)
    }

    /// Look up a saved article.
    ///
    /// A stored value that no longer decodes is logged and treated as absent.
    pub async fn get_article(&self, id: &str) -> Result<Option<Article>, StoreError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM local_store WHERE key = ?")
            .bind(article_key(id))
            .fetch_optional(&self.pool)
            .await?;

        let Some((value,)) = row else {
            return Ok(None);
        };

        match serde_json::from_str::<Article>(&value) {
            Ok(article) => Ok(Some(article)),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Stored article is malformed, ignoring");
                Ok(None)
            }
        }
    }

    /// Every saved article, oldest insert first. Malformed records are skipped.
    pub async fn list_articles(&self) -> Result<Vec<Article>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT key, value FROM local_store
            WHERE key LIKE ? ESCAPE '\'
            ORDER BY rowid
        "#,
        )
        .bind(prefix_pattern(ARTICLE_KEY_PREFIX))
        .fetch_all(&self.pool)
        .await?;

        let articles = rows
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_str::<Article>(&value) {
                Ok(article) => Some(article),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Skipping malformed stored article");
                    None
                }
            })
            .collect();

        Ok(articles)
    }

    /// Remove every saved article. Returns how many were removed; calling it
    /// on an empty store is a no-op.
    pub async fn clear_articles(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM local_store WHERE key LIKE ? ESCAPE '\\'")
            .bind(prefix_pattern(ARTICLE_KEY_PREFIX))
            .execute(&self.pool)
            .await?;

        tracing::info!(removed = result.rows_affected(), "Cleared saved articles");
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::article_id;
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    #[test]
    fn test_prefix_pattern_escapes_wildcards() {
        assert_eq!(prefix_pattern("article_"), "article\\_%");
        assert_eq!(prefix_pattern("a%b\\"), "a\\%b\\\\%");
    }

    #[tokio::test]
    async fn test_save_assigns_missing_id() {
        let db = test_db().await;
        let mut article = Article::new("Title", "https://example.com/a");
        article.id.clear();

        let id = db.save_article(&mut article).await.unwrap();
        assert_eq!(id, article_id("https://example.com/a"));
        assert_eq!(article.id, id);
    }

    #[tokio::test]
    async fn test_save_overwrites_same_id() {
        let db = test_db().await;
        let mut first = Article::new("First", "https://example.com/a");
        let mut second = Article::new("Second", "https://example.com/a");
        db.save_article(&mut first).await.unwrap();
        db.save_article(&mut second).await.unwrap();

        let stored = db.get_article(&first.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Second");
        assert_eq!(db.list_articles().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = test_db().await;
        assert_eq!(db.get_article("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_value_reads_as_missing() {
        let db = test_db().await;
        sqlx::query("INSERT INTO local_store (key, value) VALUES ('article_bad', '{not json')")
            .execute(&db.pool)
            .await
            .unwrap();

        assert_eq!(db.get_article("bad").await.unwrap(), None);
        assert!(db.list_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_ignores_other_namespaces() {
        let db = test_db().await;
        // '_' must match literally: "articleX..." is not in the namespace
        sqlx::query(
            "INSERT INTO local_store (key, value) VALUES ('articleXone', '{}'), ('theme', 'dark')",
        )
        .execute(&db.pool)
        .await
        .unwrap();
        let mut article = Article::new("Kept", "https://example.com/kept");
        db.save_article(&mut article).await.unwrap();

        let listed = db.list_articles().await.unwrap();
        assert_eq!(listed, vec![article]);

        assert_eq!(db.clear_articles().await.unwrap(), 1);
        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM local_store")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(remaining.0, 2);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let db = test_db().await;
        assert_eq!(db.clear_articles().await.unwrap(), 0);
        assert_eq!(db.clear_articles().await.unwrap(), 0);
    }
}
