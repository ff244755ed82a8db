//! Utility modules.

/// Expiry date parsing for domain listings.
pub mod datetime;

/// Log sanitization so API keys and large bodies never reach the logs verbatim.
pub mod log_sanitizer;
