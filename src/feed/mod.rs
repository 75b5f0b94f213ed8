//! Paginated feed state.
//!
//! [`FeedController`] holds the accumulated articles for one source
//! (a headline category or a search query) and decides which page to load
//! next. It performs no I/O: the UI spawns the fetch for each
//! [`PageRequest`] and feeds the result back through
//! [`FeedController::apply`], which drops responses that are no longer
//! current.

mod controller;

pub use controller::{Applied, FeedController, FeedSource, FeedStatus, PageRequest};
