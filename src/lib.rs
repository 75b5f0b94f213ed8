//! Terminal news reader.
//!
//! Browses top headlines by category, searches the news provider, and keeps
//! bookmarked articles in a local SQLite store. `dailynews --serve` runs a
//! small HTTP proxy that holds the provider API key; the reader can talk to
//! it through an offline cache that serves stored responses when the
//! network is unavailable.

pub mod app;
pub mod cache;
pub mod config;
pub mod feed;
pub mod news;
pub mod preferences;
pub mod proxy;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
