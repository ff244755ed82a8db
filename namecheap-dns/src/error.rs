use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ApiErrorEntry;

/// Unified error type for the host-record model and the Namecheap API client.
///
/// All variants are serializable for structured error reporting.
///
/// # Error families
///
/// - Structure errors ([`XmlParse`](Self::XmlParse), [`IncorrectElement`](Self::IncorrectElement),
///   [`MissingElement`](Self::MissingElement), [`MissingAttribute`](Self::MissingAttribute),
///   [`InvalidData`](Self::InvalidData)) mean the response did not have the expected shape.
/// - [`Api`](Self::Api) carries the error list returned by the service itself.
/// - Transport errors ([`Network`](Self::Network), [`Timeout`](Self::Timeout),
///   [`HttpStatus`](Self::HttpStatus)) are never retried by this crate.
/// - [`CallSlotTimeout`](Self::CallSlotTimeout) is raised by the rate limiter.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum NamecheapError {
    /// The response body is not well-formed XML.
    #[error("XML parse error: {detail}")]
    XmlParse {
        /// Parser message.
        detail: String,
    },

    /// An element had a different name than the one expected at that position.
    #[error("Expected element '{expected}' but found '{found}'")]
    IncorrectElement {
        /// Element name that was required.
        expected: String,
        /// Element name that was present.
        found: String,
    },

    /// A required child element was absent.
    #[error("{}", missing_element_message(parent.as_deref(), element))]
    MissingElement {
        /// Name of the element that should have contained the child.
        parent: Option<String>,
        /// Name of the missing child.
        element: String,
    },

    /// A required attribute was absent.
    #[error("Element '{element}' is missing the '{attribute}' attribute")]
    MissingAttribute {
        /// Element that should have carried the attribute.
        element: String,
        /// Name of the missing attribute.
        attribute: String,
    },

    /// A value was present but could not be interpreted.
    #[error("Invalid data: {detail}")]
    InvalidData {
        /// What was wrong.
        detail: String,
    },

    /// The record type string is not one of the supported kinds.
    #[error("Unsupported record type: {record_type}")]
    UnsupportedRecordType {
        /// The unsupported record type string.
        record_type: String,
    },

    /// The service answered with a non-OK status.
    #[error("{}", api_errors_message(errors))]
    Api {
        /// Every `<Error>` entry from the response, in document order.
        errors: Vec<ApiErrorEntry>,
    },

    /// A network-level error occurred (DNS resolution failure, connection refused, etc.).
    #[error("Network error: {detail}")]
    Network {
        /// Error details.
        detail: String,
    },

    /// The HTTP request timed out.
    #[error("Request timeout: {detail}")]
    Timeout {
        /// Error details.
        detail: String,
    },

    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// No call slot became free within the configured wait.
    #[error("Timed out after {waited_ms}ms waiting for a call slot for '{command}'")]
    CallSlotTimeout {
        /// API command that was waiting.
        command: String,
        /// Milliseconds spent waiting.
        waited_ms: u64,
    },

    /// The context configuration failed validation.
    #[error("Invalid configuration: {}", errors.join("; "))]
    InvalidConfig {
        /// One message per failed rule.
        errors: Vec<String>,
    },
}

fn missing_element_message(parent: Option<&str>, element: &str) -> String {
    match parent {
        Some(parent) => format!("Element '{parent}' is missing the child element '{element}'"),
        None => format!("Missing element '{element}'"),
    }
}

fn api_errors_message(errors: &[ApiErrorEntry]) -> String {
    let mut message = String::from("API Errors:");
    for entry in errors {
        let _ = write!(message, "\n  [{}] {}", entry.number, entry.message);
    }
    message
}

impl NamecheapError {
    /// The service rejected the request, or its answer lacked the expected payload.
    ///
    /// Save operations report these through their error list instead of failing.
    #[must_use]
    pub fn is_api_level(&self) -> bool {
        matches!(
            self,
            Self::Api { .. }
                | Self::IncorrectElement { .. }
                | Self::MissingElement { .. }
                | Self::MissingAttribute { .. }
                | Self::InvalidData { .. }
        )
    }

    /// Whether this is expected behaviour (bad input, service-side rejection), used for log levels.
    ///
    /// `true` should be logged at `warn`, `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            Self::Api { .. }
                | Self::UnsupportedRecordType { .. }
                | Self::InvalidConfig { .. }
                | Self::CallSlotTimeout { .. }
        )
    }
}

/// Convenience type alias for `Result<T, NamecheapError>`.
pub type Result<T> = std::result::Result<T, NamecheapError>;
