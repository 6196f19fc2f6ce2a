// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the CSP generator
//!
//! The taxonomy distinguishes the failure kinds the HTTP API and CLI
//! surface to users: invalid input, navigation timeout, name resolution
//! and protocol failures. Per-resource URL parse failures are not errors;
//! they are skipped during origin resolution.

use thiserror::Error;

/// Result type alias for cspgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the CSP generator
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied URL does not parse even after protocol normalization
    #[error("Invalid URL '{input}': {reason}")]
    InvalidInput { input: String, reason: String },

    /// All navigation wait tiers exceeded their deadlines
    #[error("Navigation to {url} timed out: {detail}")]
    NavigationTimeout { url: String, detail: String },

    /// The host could not be resolved
    #[error("Domain not found: {host}")]
    NameResolution { host: String },

    /// Transport or protocol-level failure while loading the page
    #[error("Protocol error for {url}: {reason}")]
    Protocol { url: String, reason: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid-input error
    pub fn invalid_input(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a navigation timeout error
    pub fn navigation_timeout(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::NavigationTimeout {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Protocol {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Classify a transport error from a navigation attempt into the taxonomy.
    ///
    /// DNS failures surface from reqwest as connect errors whose source chain
    /// mentions name resolution; those map to `NameResolution`. Timeouts keep
    /// their own kind so the caller can escalate to the next wait tier.
    pub fn from_navigation(url: &url::Url, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Error::navigation_timeout(url.as_str(), err.to_string());
        }

        if err.is_connect() {
            let chain = error_chain(&err);
            if chain.contains("dns")
                || chain.contains("name or service not known")
                || chain.contains("failed to lookup")
                || chain.contains("nodename nor servname")
            {
                return Error::NameResolution {
                    host: url.host_str().unwrap_or_default().to_string(),
                };
            }
            return Error::protocol(url.as_str(), err.to_string());
        }

        Error::Http(err)
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::NavigationTimeout { .. } => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Short user-facing label, mirrored by the HTTP API
    pub fn label(&self) -> &'static str {
        match self {
            Error::InvalidInput { .. } | Error::Url(_) => "Invalid URL",
            Error::NavigationTimeout { .. } => "Request Timeout",
            Error::NameResolution { .. } => "Domain Not Found",
            Error::Protocol { .. } => "Protocol Error",
            _ => "Failed to generate CSP",
        }
    }

    /// Human-readable detail string for the user-facing label
    pub fn detail(&self) -> String {
        match self {
            Error::InvalidInput { .. } | Error::Url(_) => {
                "Please enter a valid URL (e.g., https://example.com or example.com)".to_string()
            }
            Error::NavigationTimeout { .. } => {
                "The page took too long to load. The site may be slow or unreachable.".to_string()
            }
            Error::NameResolution { host } => {
                format!(
                    "The domain '{}' could not be resolved. Please check the URL.",
                    host
                )
            }
            Error::Protocol { reason, .. } => {
                format!(
                    "The site could not be reached ({}). Try again or check if the site is accessible.",
                    reason
                )
            }
            other => other.to_string(),
        }
    }
}

/// Flatten an error's source chain into one lowercase string for matching
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_label() {
        let err = Error::invalid_input("not a url", "relative URL without a base");
        assert_eq!(err.label(), "Invalid URL");
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_timeout_detection() {
        let err =
            Error::navigation_timeout("https://example.com", "networkidle deadline exceeded");
        assert!(err.is_timeout());
        assert_eq!(err.label(), "Request Timeout");
    }

    #[test]
    fn test_name_resolution_detail() {
        let err = Error::NameResolution {
            host: "no-such-host.invalid".to_string(),
        };
        assert_eq!(err.label(), "Domain Not Found");
        assert!(err.detail().contains("no-such-host.invalid"));
    }
}
