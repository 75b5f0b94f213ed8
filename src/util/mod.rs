//! Utility functions shared by the reader, the proxy and the offline cache.
//!
//! - **Text processing**: Unicode-aware width, truncation, control-char stripping
//! - **Time**: calendar and relative date labels
//! - **HTTP**: size-limited body reads
//! - **URL validation**: checks before opening links in a browser

mod http;
mod text;
mod time;
mod url_validator;

pub use http::{read_limited_bytes, BodyError, MAX_BODY_SIZE};
pub use text::{display_width, strip_char_count_suffix, strip_control_chars, truncate_to_width};
pub use time::{format_date, relative_time};
pub use url_validator::{validate_url_for_open, UrlValidationError};

/// Maximum accepted search query length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
