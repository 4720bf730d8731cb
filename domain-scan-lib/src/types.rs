//! Core data types for domain scanning.
//!
//! This module defines the evidence tokens produced by probes, the verdict a
//! candidate ends up with, the per-candidate result record, and the read-only
//! run configuration shared by every component of a scan.

use crate::error::DomainScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Evidence token produced by one probe about one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signature {
    DnsNs,
    DnsA,
    DnsMx,
    DnsTxt,
    DnsCname,
    Whois,
    Reserved,
    Ssl,
}

impl Signature {
    /// Wire name used in result records and output lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Signature::DnsNs => "DNS_NS",
            Signature::DnsA => "DNS_A",
            Signature::DnsMx => "DNS_MX",
            Signature::DnsTxt => "DNS_TXT",
            Signature::DnsCname => "DNS_CNAME",
            Signature::Whois => "WHOIS",
            Signature::Reserved => "RESERVED",
            Signature::Ssl => "SSL",
        }
    }

    /// True for the five DNS record signatures.
    pub fn is_dns(&self) -> bool {
        matches!(
            self,
            Signature::DnsNs
                | Signature::DnsA
                | Signature::DnsMx
                | Signature::DnsTxt
                | Signature::DnsCname
        )
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final trinary classification of a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Available,
    Registered,
    /// Ambiguous or registry-specific WHOIS status that needs manual review
    SpecialStatus(String),
}

impl Verdict {
    pub fn is_available(&self) -> bool {
        matches!(self, Verdict::Available)
    }

    /// Reason string for special-status verdicts.
    pub fn special_reason(&self) -> Option<&str> {
        match self {
            Verdict::SpecialStatus(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Available => write!(f, "AVAILABLE"),
            Verdict::Registered => write!(f, "REGISTERED"),
            Verdict::SpecialStatus(reason) => write!(f, "SPECIAL ({})", reason),
        }
    }
}

/// Outcome of scanning one candidate. Produced once, consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Fully qualified candidate, e.g. "abc.li"
    pub domain: String,

    pub verdict: Verdict,

    /// Evidence that produced the verdict, in probe order
    pub signatures: Vec<Signature>,

    /// Unexpected failure while handling this candidate. Probe failures are
    /// absorbed as missing evidence and never land here.
    pub error: Option<String>,
}

impl ScanResult {
    pub fn is_available(&self) -> bool {
        self.verdict.is_available()
    }

    /// Signature names joined for display, e.g. "DNS_NS, WHOIS".
    pub fn signature_list(&self) -> String {
        self.signatures
            .iter()
            .map(Signature::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Flatten into the record shape consumed by result sinks.
    pub fn to_record(&self) -> ResultRecord {
        ResultRecord {
            domain: self.domain.clone(),
            available: self.is_available(),
            error: self.error.clone(),
            signatures: self
                .signatures
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            special_status: self.verdict.special_reason().map(str::to_string),
        }
    }
}

/// Serializable view of a [`ScanResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub domain: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub signatures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_status: Option<String>,
}

impl ResultRecord {
    /// Single-line JSON encoding, one record per line of output.
    pub fn to_json_line(&self) -> Result<String, DomainScanError> {
        serde_json::to_string(self)
            .map_err(|e| DomainScanError::internal(format!("JSON encoding failed: {}", e)))
    }
}

/// A domain flagged for manual review during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialStatusRecord {
    pub domain: String,
    /// Status reason, e.g. "REDEMPTIONPERIOD" or "WHOIS_RATE_LIMITED"
    pub status: String,
    pub detail: String,
}

/// How the candidate filter is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegexMode {
    /// Match against the candidate including its suffix
    #[default]
    Full,
    /// Match against the candidate body only
    Prefix,
}

impl FromStr for RegexMode {
    type Err = DomainScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(RegexMode::Full),
            "prefix" => Ok(RegexMode::Prefix),
            other => Err(DomainScanError::config(format!(
                "Invalid regex mode '{}'. Use 'full' or 'prefix'",
                other
            ))),
        }
    }
}

impl fmt::Display for RegexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexMode::Full => write!(f, "full"),
            RegexMode::Prefix => write!(f, "prefix"),
        }
    }
}

/// Alphabet a candidate body is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharsetPattern {
    /// 0-9
    Digits,
    /// a-z
    #[default]
    Letters,
    /// a-z then 0-9
    Alphanumeric,
}

impl CharsetPattern {
    pub fn alphabet(&self) -> &'static [u8] {
        match self {
            CharsetPattern::Digits => b"0123456789",
            CharsetPattern::Letters => b"abcdefghijklmnopqrstuvwxyz",
            CharsetPattern::Alphanumeric => b"abcdefghijklmnopqrstuvwxyz0123456789",
        }
    }

    pub fn alphabet_size(&self) -> u64 {
        self.alphabet().len() as u64
    }

    /// Short selector used in file names ("d", "D", "a").
    pub fn selector(&self) -> &'static str {
        match self {
            CharsetPattern::Digits => "d",
            CharsetPattern::Letters => "D",
            CharsetPattern::Alphanumeric => "a",
        }
    }
}

impl FromStr for CharsetPattern {
    type Err = DomainScanError;

    /// Accepts the short selectors `d`, `D`, `a` and the long names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "d" | "digits" => Ok(CharsetPattern::Digits),
            "D" | "letters" => Ok(CharsetPattern::Letters),
            "a" | "alphanumeric" => Ok(CharsetPattern::Alphanumeric),
            other => Err(DomainScanError::invalid_pattern(
                other,
                "use d (digits), D (letters) or a (alphanumeric)",
            )),
        }
    }
}

impl fmt::Display for CharsetPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Parameters of the candidate source.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Body length in symbols, 1..=63
    pub length: usize,
    /// Suffix appended to every body; always starts with '.'
    pub suffix: String,
    pub pattern: CharsetPattern,
    pub regex_filter: Option<String>,
    pub regex_mode: RegexMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: 3,
            suffix: ".li".to_string(),
            pattern: CharsetPattern::Letters,
            regex_filter: None,
            regex_mode: RegexMode::Full,
        }
    }
}

impl GeneratorConfig {
    pub fn new(length: usize, suffix: &str, pattern: CharsetPattern) -> Self {
        Self {
            length,
            suffix: normalize_suffix(suffix),
            pattern,
            ..Default::default()
        }
    }

    pub fn with_regex(mut self, filter: &str, mode: RegexMode) -> Self {
        self.regex_filter = if filter.is_empty() {
            None
        } else {
            Some(filter.to_string())
        };
        self.regex_mode = mode;
        self
    }
}

/// Ensure a suffix starts with a dot ("li" -> ".li").
pub fn normalize_suffix(suffix: &str) -> String {
    let trimmed = suffix.trim();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed.to_string()
    } else {
        format!(".{}", trimmed)
    }
}

/// Which probes run for each candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeMethods {
    pub dns: bool,
    pub whois: bool,
    pub ssl: bool,
}

impl Default for ProbeMethods {
    fn default() -> Self {
        Self {
            dns: true,
            whois: true,
            ssl: true,
        }
    }
}

/// Bounded exponential backoff for WHOIS queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first, 1..=5
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub const MAX_ATTEMPTS: u32 = 5;

    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.clamp(1, Self::MAX_ATTEMPTS),
            base_delay,
            ..Default::default()
        }
    }

    /// Wait before the attempt following `attempt` (0-based).
    ///
    /// Doubles per attempt; a rate-limited attempt waits twice as long as a
    /// plain transport failure. Never exceeds `max_delay`.
    pub fn delay_after(&self, attempt: u32, rate_limited: bool) -> Duration {
        let factor = 1u32 << attempt.min(16);
        let factor = if rate_limited {
            factor.saturating_mul(2)
        } else {
            factor
        };
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Read-only snapshot of how a run behaves. Built once, never mutated by the
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub methods: ProbeMethods,

    /// Pause each worker takes after finishing a candidate
    pub delay: Duration,

    /// Number of concurrent workers, 1..=100
    pub workers: usize,

    /// Capacity of the candidate and result queues
    pub queue_capacity: usize,

    /// Bound on TLS dial plus handshake
    pub tls_timeout: Duration,

    /// Bound on a single WHOIS query
    pub whois_timeout: Duration,

    pub whois_retry: RetryPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            methods: ProbeMethods::default(),
            delay: Duration::from_millis(1000),
            workers: 10,
            queue_capacity: 1000,
            tls_timeout: Duration::from_secs(5),
            whois_timeout: Duration::from_secs(10),
            whois_retry: RetryPolicy::default(),
        }
    }
}

impl ScanConfig {
    /// Set the worker count, capped to 1..=100.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, 100);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_methods(mut self, methods: ProbeMethods) -> Self {
        self.methods = methods;
        self
    }

    pub fn with_whois_retry(mut self, policy: RetryPolicy) -> Self {
        self.whois_retry = policy;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_tls_timeout(mut self, timeout: Duration) -> Self {
        self.tls_timeout = timeout;
        self
    }

    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_selectors() {
        assert_eq!("d".parse::<CharsetPattern>().unwrap(), CharsetPattern::Digits);
        assert_eq!("D".parse::<CharsetPattern>().unwrap(), CharsetPattern::Letters);
        assert_eq!(
            "alphanumeric".parse::<CharsetPattern>().unwrap(),
            CharsetPattern::Alphanumeric
        );
        assert!("x".parse::<CharsetPattern>().is_err());

        assert_eq!(CharsetPattern::Digits.alphabet_size(), 10);
        assert_eq!(CharsetPattern::Letters.alphabet_size(), 26);
        assert_eq!(CharsetPattern::Alphanumeric.alphabet_size(), 36);
    }

    #[test]
    fn test_regex_mode_parse() {
        assert_eq!("full".parse::<RegexMode>().unwrap(), RegexMode::Full);
        assert_eq!("PREFIX".parse::<RegexMode>().unwrap(), RegexMode::Prefix);
        assert!("suffix".parse::<RegexMode>().is_err());
    }

    #[test]
    fn test_normalize_suffix() {
        assert_eq!(normalize_suffix("li"), ".li");
        assert_eq!(normalize_suffix(".ai"), ".ai");
        assert_eq!(normalize_suffix(" de "), ".de");
        assert_eq!(normalize_suffix(""), "");
    }

    #[test]
    fn test_retry_policy_backoff() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        assert_eq!(policy.delay_after(0, false), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1, false), Duration::from_secs(4));
        assert_eq!(policy.delay_after(2, false), Duration::from_secs(8));
        assert_eq!(policy.delay_after(0, true), Duration::from_secs(4));
        assert_eq!(policy.delay_after(10, true), Duration::from_secs(60));

        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
        assert_eq!(RetryPolicy::new(9, Duration::ZERO).max_attempts, 5);
    }

    #[test]
    fn test_result_record_shape() {
        let result = ScanResult {
            domain: "ab.li".to_string(),
            verdict: Verdict::SpecialStatus("REDEMPTIONPERIOD".to_string()),
            signatures: vec![Signature::DnsNs],
            error: None,
        };
        let record = result.to_record();
        assert!(!record.available);
        assert_eq!(record.signatures, vec!["DNS_NS".to_string()]);
        assert_eq!(record.special_status.as_deref(), Some("REDEMPTIONPERIOD"));

        let json = record.to_json_line().unwrap();
        assert!(json.contains("\"special_status\":\"REDEMPTIONPERIOD\""));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_scan_config_builders() {
        let config = ScanConfig::default()
            .with_workers(0)
            .with_delay(Duration::ZERO)
            .with_queue_capacity(0);
        assert_eq!(config.workers, 1);
        assert_eq!(config.delay, Duration::ZERO);
        assert_eq!(config.queue_capacity, 1);
        assert_eq!(ScanConfig::default().with_workers(500).workers, 100);
    }
}
