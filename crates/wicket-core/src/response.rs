//! # Response Module
//!
//! Outcome of a single `handle` call.
//!
//! - A served response carries the body and where it came from
//! - A denial carries the rejected key and renders as `"denied: <key>"`
//! - Denials are successful outcomes, not errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the textual denial response.
pub const DENIED_PREFIX: &str = "denied: ";

/// Where a served body came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// Answered from the memo table.
    Cache,
    /// Computed by the delegate on this call.
    Delegate,
}

/// The outcome of mediating one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Response {
    /// The request was admitted and answered.
    Served {
        /// The response body.
        body: String,
        /// Cache hit or fresh delegate result.
        source: ResponseSource,
    },
    /// The admission policy rejected the request.
    Denied {
        /// The rejected key.
        key: String,
    },
}

impl Response {
    /// Create a served response.
    #[must_use]
    pub fn served(body: impl Into<String>, source: ResponseSource) -> Self {
        Self::Served {
            body: body.into(),
            source,
        }
    }

    /// Create a denial for `key`.
    #[must_use]
    pub fn denied(key: impl Into<String>) -> Self {
        Self::Denied { key: key.into() }
    }

    /// Check if the request was denied.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Check if the body came from the memo table.
    #[must_use]
    pub fn is_cache_hit(&self) -> bool {
        matches!(
            self,
            Self::Served {
                source: ResponseSource::Cache,
                ..
            }
        )
    }

    /// The served body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Served { body, .. } => Some(body.as_str()),
            Self::Denied { .. } => None,
        }
    }

    /// Render the textual contract: the body, or `"denied: <key>"`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Consume the response, returning its textual form.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Served { body, .. } => body,
            Self::Denied { key } => format!("{DENIED_PREFIX}{key}"),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Served { body, .. } => f.write_str(body),
            Self::Denied { key } => write!(f, "{DENIED_PREFIX}{key}"),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
