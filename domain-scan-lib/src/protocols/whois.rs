//! WHOIS evidence for registration.
//!
//! WHOIS answers are free text that differs per registry, so the probe
//! matches the lowercased response against four ordered indicator lists.
//! The first list that hits decides what the response means:
//!
//! 1. available ("no match for", "not found", ...)
//! 2. reserved ("status: reserved", "status: blocked", ...)
//! 3. registered ("registrar:", "creation date:", "status: connect", ...)
//! 4. special status ("status: redemptionperiod", "status: pendingdelete", ...)
//!
//! Transport failures and rate-limit answers are retried with exponential
//! backoff. A query that is still rate limited after the last attempt is
//! reported as such so the classifier can flag it instead of guessing.

use crate::error::{mentions_rate_limit, DomainScanError};
use crate::types::{RetryPolicy, Signature};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Something that returns raw WHOIS text for a domain.
#[async_trait]
pub trait WhoisSource: Send + Sync {
    async fn query(&self, domain: &str) -> Result<String, DomainScanError>;
}

/// WHOIS source that shells out to the system `whois` command.
#[derive(Debug, Clone)]
pub struct CommandWhoisSource {
    /// Timeout for a single query
    timeout: Duration,
}

impl CommandWhoisSource {
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for CommandWhoisSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisSource for CommandWhoisSource {
    async fn query(&self, domain: &str) -> Result<String, DomainScanError> {
        let command = Command::new("whois")
            .arg(domain)
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, command)
            .await
            .map_err(|_| DomainScanError::timeout("WHOIS query", self.timeout))?
            .map_err(|e| {
                DomainScanError::whois(
                    domain,
                    format!(
                        "Failed to execute whois command: {}. Make sure 'whois' is installed.",
                        e
                    ),
                )
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        // Many whois clients exit non-zero on "no match" but still print the
        // registry answer; only an empty answer is a failure.
        if !output.status.success() && stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("whois exited with {}", output.status),
                text => text.to_string(),
            };
            return Err(DomainScanError::whois(domain, message));
        }

        Ok(stdout)
    }
}

/// What a single successful WHOIS answer says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisFinding {
    Available,
    Reserved,
    Registered,
    /// Registry-specific state, e.g. "REDEMPTIONPERIOD"
    Special(String),
    /// Nothing recognisable in the answer
    Silent,
}

/// Outcome of the WHOIS probe after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisEvidence {
    /// Probe disabled for this run
    NotChecked,
    Answered(WhoisFinding),
    /// Last attempt was rate limited
    RateLimited,
    /// Every attempt failed for reasons other than rate limiting
    Unreachable(String),
}

impl WhoisEvidence {
    /// Signature this evidence contributes, if any.
    pub fn signature(&self) -> Option<Signature> {
        match self {
            WhoisEvidence::Answered(WhoisFinding::Reserved) => Some(Signature::Reserved),
            WhoisEvidence::Answered(WhoisFinding::Registered) => Some(Signature::Whois),
            _ => None,
        }
    }

    pub fn special_reason(&self) -> Option<&str> {
        match self {
            WhoisEvidence::Answered(WhoisFinding::Special(reason)) => Some(reason),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, WhoisEvidence::RateLimited)
    }
}

/// Ordered, read-only indicator lists. Built once per run.
#[derive(Debug, Clone)]
pub struct WhoisIndicators {
    available: Vec<&'static str>,
    reserved: Vec<&'static str>,
    registered: Vec<&'static str>,
    special: Vec<&'static str>,
}

impl Default for WhoisIndicators {
    fn default() -> Self {
        Self::new()
    }
}

impl WhoisIndicators {
    pub fn new() -> Self {
        Self {
            available: vec![
                "no match for",
                "not found",
                "no data found",
                "no entries found",
                "domain not found",
                "no object found",
                "no matching record",
                "status: free",
                "status: available",
                "available for registration",
                "this domain is available",
                "domain is available",
                "domain available",
            ],
            reserved: vec![
                "status: reserved",
                "status: restricted",
                "status: blocked",
                "status: prohibited",
                "status: not available for registration",
                "status: not available for general registration",
                "domain reserved",
                "this domain is reserved",
                "reserved domain",
            ],
            registered: vec![
                "registrar:",
                "registrant:",
                "creation date:",
                "created:",
                "updated date:",
                "updated:",
                "expiration date:",
                "expires:",
                "name server:",
                "nserver:",
                "nameserver:",
                "status: active",
                "status: client",
                "status: ok",
                "status: locked",
                "status: connect",
                "status:connect",
                "domain name:",
                "domain:",
                // DENIC
                "nsentry:",
                "changed:",
            ],
            // Longer spellings first so the reason is as specific as possible.
            special: vec![
                "status: redemptionperiod",
                "status: redemption period",
                "status: redemption",
                "redemptionperiod",
                "redemption period",
                "status: pendingdelete",
                "status: pending delete",
                "status: hold",
                "status: inactive",
                "status: suspended",
                "status: quarantined",
                "status: pending",
                "status: transfer",
                "status: grace",
                "status: autorenewperiod",
                "status: auto renew period",
                "status: expired",
                "status: expire",
                // Client holds already match "status: client" above.
                "status: serverhold",
                "status: server hold",
            ],
        }
    }

    /// Classify one raw WHOIS answer. Matching is case-insensitive.
    pub fn evaluate(&self, response: &str) -> WhoisFinding {
        let text = response.to_lowercase();
        let hit = |list: &[&'static str]| list.iter().copied().find(|i| text.contains(i));

        if hit(&self.available).is_some() {
            return WhoisFinding::Available;
        }
        if hit(&self.reserved).is_some() {
            return WhoisFinding::Reserved;
        }
        if hit(&self.registered).is_some() {
            return WhoisFinding::Registered;
        }
        if let Some(indicator) = hit(&self.special) {
            return WhoisFinding::Special(special_reason(indicator));
        }
        WhoisFinding::Silent
    }
}

/// "status: redemptionperiod" -> "REDEMPTIONPERIOD"
fn special_reason(indicator: &str) -> String {
    indicator
        .strip_prefix("status: ")
        .unwrap_or(indicator)
        .to_uppercase()
}

/// WHOIS probe with bounded retries.
#[derive(Clone)]
pub struct WhoisProbe {
    source: Arc<dyn WhoisSource>,
    policy: RetryPolicy,
}

impl WhoisProbe {
    pub fn new(source: Arc<dyn WhoisSource>, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Query until an answer arrives or the attempts run out.
    pub async fn probe(&self, domain: &str, indicators: &WhoisIndicators) -> WhoisEvidence {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = String::new();
        let mut rate_limited = false;

        for attempt in 0..attempts {
            match self.source.query(domain).await {
                Ok(text) if mentions_rate_limit(&text) => {
                    rate_limited = true;
                    last_error = "rate limit response".to_string();
                }
                Ok(text) => return WhoisEvidence::Answered(indicators.evaluate(&text)),
                Err(e) => {
                    rate_limited = e.is_rate_limit();
                    last_error = e.to_string();
                }
            }

            debug!(
                domain,
                attempt = attempt + 1,
                attempts,
                rate_limited,
                error = %last_error,
                "WHOIS attempt failed"
            );

            if attempt + 1 < attempts {
                tokio::time::sleep(self.policy.delay_after(attempt, rate_limited)).await;
            }
        }

        if rate_limited {
            WhoisEvidence::RateLimited
        } else {
            WhoisEvidence::Unreachable(last_error)
        }
    }
}
