//! Validation and bounded matching for the optional candidate filter.
//!
//! A filter runs once per generated candidate, so a pathological expression
//! would stall the whole scan. Patterns are screened before compilation and
//! every match is held to a wall-clock budget; overrunning it counts as a
//! non-match.

use crate::error::DomainScanError;
use regex::{Regex, RegexBuilder};
use std::time::{Duration, Instant};
use tracing::warn;

/// Longest filter expression accepted, in characters.
pub const MAX_PATTERN_LENGTH: usize = 200;

/// Upper bound on the combined number of `+` and `*` in a filter.
pub const MAX_QUANTIFIERS: usize = 5;

/// Per-match wall-clock budget.
pub const MATCH_TIMEOUT: Duration = Duration::from_millis(100);

/// Nested-quantifier shapes known to backtrack catastrophically.
const DANGEROUS_PATTERNS: &[&str] = &[
    "(.*)*",
    "(.+)+",
    "(a+)+",
    "(a*)*",
    "(.{0,})*",
    "(\\w+)*\\w*",
];

/// Compiled filter expression with a bounded match cost.
#[derive(Debug, Clone)]
pub struct RegexGuard {
    regex: Regex,
    timeout: Duration,
}

/// Check a filter expression against the length, deny-list and
/// quantifier-count limits.
pub fn validate_regex_complexity(pattern: &str) -> Result<(), DomainScanError> {
    if pattern.chars().count() > MAX_PATTERN_LENGTH {
        return Err(DomainScanError::invalid_regex(
            pattern,
            format!("pattern too long (max {} characters)", MAX_PATTERN_LENGTH),
        ));
    }

    for dangerous in DANGEROUS_PATTERNS {
        if pattern.contains(dangerous) {
            return Err(DomainScanError::invalid_regex(
                pattern,
                format!("potentially dangerous nested quantifier: {}", dangerous),
            ));
        }
    }

    let quantifiers = pattern.matches(['+', '*']).count();
    if quantifiers > MAX_QUANTIFIERS {
        return Err(DomainScanError::invalid_regex(
            pattern,
            format!("too many quantifiers (max {})", MAX_QUANTIFIERS),
        ));
    }

    Ok(())
}

impl RegexGuard {
    /// Validate and compile a filter expression.
    pub fn compile(pattern: &str) -> Result<Self, DomainScanError> {
        validate_regex_complexity(pattern)?;

        let regex = RegexBuilder::new(pattern)
            .size_limit(1024 * 1024)
            .dfa_size_limit(1024 * 1024)
            .build()
            .map_err(|e| DomainScanError::invalid_regex(pattern, e.to_string()))?;

        Ok(Self {
            regex,
            timeout: MATCH_TIMEOUT,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match `input`, treating a match that overran the budget as a miss.
    pub fn is_match(&self, input: &str) -> bool {
        let started = Instant::now();
        let matched = self.regex.is_match(input);
        let elapsed = started.elapsed();

        if elapsed > self.timeout {
            warn!(
                pattern = self.regex.as_str(),
                input,
                ?elapsed,
                "regex match exceeded its time budget, dropping candidate"
            );
            return false;
        }
        matched
    }

    #[cfg(test)]
    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
