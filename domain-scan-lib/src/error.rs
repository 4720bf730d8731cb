//! Error handling for domain scanning operations.
//!
//! Only configuration errors are fatal. Probe errors are recovered inside the
//! pipeline and end up as "no signature" or in a result's error field.

use std::time::Duration;
use thiserror::Error;

/// Main error type for domain scanning operations.
#[derive(Debug, Clone, Error)]
pub enum DomainScanError {
    /// Invalid run configuration (bad length, worker count, config file values)
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Unknown alphabet selector for the candidate generator
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Filter expression rejected by the regex guard or the regex compiler
    #[error("Regex pattern rejected '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    /// DNS lookup failure for one candidate
    #[error("DNS error for '{domain}': {message}")]
    DnsError { domain: String, message: String },

    /// TLS dial or handshake failure for one candidate
    #[error("TLS error for '{domain}': {message}")]
    TlsError { domain: String, message: String },

    /// WHOIS transport failure for one candidate
    #[error("WHOIS error for '{domain}': {message}")]
    WhoisError { domain: String, message: String },

    /// The remote service refused to answer because of rate limiting
    #[error("Rate limited by {service}: {message}")]
    RateLimited { service: String, message: String },

    /// An operation ran past its deadline
    #[error("Timeout after {duration:?} during: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// File I/O errors when loading configuration
    #[error("File error at '{path}': {message}")]
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Phrases that mark a WHOIS answer or transport error as rate limiting.
pub(crate) const RATE_LIMIT_PHRASES: &[&str] = &[
    "connection refused",
    "access control",
    "limit exceeded",
    "rate limit",
    "too many requests",
];

/// Whether a WHOIS response body or error text signals rate limiting.
pub(crate) fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_PHRASES.iter().any(|p| lower.contains(p))
}

impl DomainScanError {
    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new invalid pattern error.
    pub fn invalid_pattern<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid regex error.
    pub fn invalid_regex<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Create a new DNS error.
    pub fn dns<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::DnsError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new TLS error.
    pub fn tls<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::TlsError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new rate-limit error.
    pub fn rate_limited<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::RateLimited {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors that must abort a run before any probing starts.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigError { .. } | Self::InvalidPattern { .. } | Self::InvalidRegex { .. }
        )
    }

    /// Check if this error is a rate-limit condition.
    ///
    /// WHOIS servers often signal throttling only through the wording of a
    /// transport error ("connection refused", "access control"), so the
    /// message text is inspected as well as the variant.
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Self::RateLimited { .. } => true,
            Self::WhoisError { message, .. } => mentions_rate_limit(message),
            _ => false,
        }
    }
}

impl From<std::io::Error> for DomainScanError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<regex::Error> for DomainScanError {
    fn from(err: regex::Error) -> Self {
        Self::InvalidRegex {
            pattern: String::new(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DomainScanError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detection_from_whois_message() {
        let err = DomainScanError::whois("abc.li", "dial tcp: Connection Refused");
        assert!(err.is_rate_limit());

        let err = DomainScanError::whois("abc.li", "Too Many Requests, slow down");
        assert!(err.is_rate_limit());

        let err = DomainScanError::whois("abc.li", "no such host");
        assert!(!err.is_rate_limit());

        assert!(DomainScanError::rate_limited("whois", "quota").is_rate_limit());
        assert!(!DomainScanError::dns("abc.li", "rate limit").is_rate_limit());
    }

    #[test]
    fn test_config_error_classification() {
        assert!(DomainScanError::config("bad").is_config_error());
        assert!(DomainScanError::invalid_pattern("x", "unknown").is_config_error());
        assert!(DomainScanError::invalid_regex("(a+)+", "dangerous").is_config_error());
        assert!(!DomainScanError::tls("a.li", "handshake").is_config_error());
    }

    #[test]
    fn test_display_messages() {
        let err = DomainScanError::whois("ab.li", "timed out");
        assert_eq!(err.to_string(), "WHOIS error for 'ab.li': timed out");

        let err = DomainScanError::timeout("TLS dial", Duration::from_secs(5));
        assert_eq!(err.to_string(), "Timeout after 5s during: TLS dial");
    }
}
