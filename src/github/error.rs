//! Hosting-API error types.
//!
//! Failures are categorized as transient or permanent. The bot never retries
//! API calls inline (a failed PR simply drops out of tracking until the next
//! event or sweep revisits it), but the category makes the logs actionable:
//! a permanent failure on every sweep points at configuration or permissions,
//! a transient one at the network or the API.

use std::fmt;
use thiserror::Error;

/// The kind of hosting-API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Server errors, rate limits, network timeouts.
    Transient,

    /// Most 4xx: missing resources, auth failures, bad requests.
    Permanent,
}

/// A hosting-API error with its category.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    /// Transient or permanent.
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if one could be extracted.
    pub status_code: Option<u16>,

    /// Human-readable description.
    pub message: String,

    /// The underlying octocrab error, if any.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = err.to_string();

        let kind = match status_code {
            Some(429) => GitHubErrorKind::Transient,
            Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
            Some(_) => GitHubErrorKind::Permanent,
            None => {
                if is_network_error(&message) {
                    GitHubErrorKind::Transient
                } else {
                    GitHubErrorKind::Permanent
                }
            }
        };

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    /// Creates a permanent error without an underlying octocrab error.
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if the error is a 404.
    ///
    /// Used to distinguish "repository carries no configuration document"
    /// from an actual fetch failure.
    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// octocrab's `Error` doesn't expose a stable accessor for the status code
/// across all variants, so this falls back to scanning the message for
/// well-established patterns. Returning `None` is safe: it only makes the
/// categorization conservative.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let err_str = err.to_string();
    for code in [404u16, 409, 422, 403, 401, 429, 500, 502, 503] {
        if err_str.contains(&code.to_string()) {
            return Some(code);
        }
    }
    None
}

/// Checks if an error message indicates a network-level failure.
fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("timed out")
        || message_lower.contains("connection")
        || message_lower.contains("network")
        || message_lower.contains("dns")
}
