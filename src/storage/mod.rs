mod bookmarks;
mod http_cache;
mod preferences;
mod schema;
mod types;

pub use bookmarks::ARTICLE_KEY_PREFIX;
pub use schema::Database;
pub use types::{CacheEntry, DatabaseError, StoreError};
