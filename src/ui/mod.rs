//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch
//! - `helpers` - Background task spawning
//! - `cards` - Article card list and pagination footer
//! - `reader` - Article detail view
//! - `status` - Status bar widget

mod cards;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod reader;
mod render;
mod status;

pub use loop_runner::{run, Action};
