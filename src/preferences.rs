//! User preferences: config.toml defaults with DB overrides layered on top.
//!
//! Writes go to the DB, never to the config file. The loaded manager is
//! handed to the UI explicitly; nothing reads preferences from global state.
use std::collections::HashMap;

use anyhow::Result;

use crate::config::Config;
use crate::storage::Database;
use crate::theme::ThemeVariant;

pub const THEME_KEY: &str = "theme";
pub const CATEGORY_KEY: &str = "feed.category";

const STORED_KEYS: [&str; 2] = [THEME_KEY, CATEGORY_KEY];

pub struct PreferenceManager {
    prefs: HashMap<String, String>,
}

impl PreferenceManager {
    /// Config values first, then any stored value for the same key.
    pub async fn load(config: &Config, db: &Database) -> Result<Self> {
        let mut prefs = Self::flatten_config(config);
        for key in STORED_KEYS {
            if let Some(value) = db.get_preference(key).await? {
                prefs.insert(key.to_string(), value);
            }
        }
        Ok(Self { prefs })
    }

    /// Config only, for when the DB cannot be read.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefs: Self::flatten_config(config),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Persist a preference and update the in-memory copy.
    pub async fn set(&mut self, db: &Database, key: &str, value: &str) -> Result<()> {
        db.set_preference(key, value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Unknown names fall back to Dark.
    pub fn theme_variant(&self) -> ThemeVariant {
        self.get(THEME_KEY)
            .and_then(ThemeVariant::from_str_name)
            .unwrap_or(ThemeVariant::Dark)
    }

    /// Category the headline feed opens on.
    pub fn category(&self) -> &str {
        self.get(CATEGORY_KEY).unwrap_or("general")
    }

    fn flatten_config(config: &Config) -> HashMap<String, String> {
        HashMap::from([
            (THEME_KEY.to_string(), config.theme.clone()),
            (CATEGORY_KEY.to_string(), config.category.clone()),
        ])
    }
}
