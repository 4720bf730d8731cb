//! Candidate domain name generation.
//!
//! Enumerates every body of a fixed length over a selected alphabet, appends
//! the suffix, and drops whatever the optional filter rejects. The sequence
//! is lazy, finite and single-pass.
//!
//! # Enumeration
//!
//! Each integer in `[0, alphabetSize^length)` is turned into a body by
//! repeated division, most significant symbol first. Memory use does not
//! grow with length and there is no recursion.
//!
//! # Examples
//!
//! ```
//! use domain_scan_lib::{generate_candidates, CharsetPattern, GeneratorConfig, RegexMode};
//!
//! let config = GeneratorConfig::new(2, ".ai", CharsetPattern::Letters)
//!     .with_regex("^a", RegexMode::Prefix);
//! let names: Vec<String> = generate_candidates(&config).unwrap().collect();
//! assert_eq!(names.len(), 26);
//! assert_eq!(names[0], "aa.ai");
//! assert_eq!(names[25], "az.ai");
//! ```

use crate::error::DomainScanError;
use crate::regex_guard::RegexGuard;
use crate::types::{CharsetPattern, GeneratorConfig, RegexMode};
use std::iter::FusedIterator;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Longest body accepted; a DNS label holds at most 63 octets.
pub const MAX_LENGTH: usize = 63;

/// Default capacity of the buffer between producer and workers.
pub const DEFAULT_BUFFER: usize = 1000;

/// Lazy, single-pass candidate sequence.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    alphabet: &'static [u8],
    length: usize,
    suffix: String,
    filter: Option<RegexGuard>,
    mode: RegexMode,
    counter: u64,
    total: u64,
}

/// Raw keyspace size `alphabetSize^length`, before filtering.
pub fn estimate_candidate_count(
    length: usize,
    pattern: CharsetPattern,
) -> Result<u64, DomainScanError> {
    validate_length(length)?;
    let exponent = u32::try_from(length)
        .map_err(|_| DomainScanError::config(format!("length {} is too large", length)))?;
    pattern.alphabet_size().checked_pow(exponent).ok_or_else(|| {
        DomainScanError::config(format!(
            "keyspace of {}^{} candidates is too large to enumerate",
            pattern.alphabet_size(),
            length
        ))
    })
}

fn validate_length(length: usize) -> Result<(), DomainScanError> {
    if length == 0 || length > MAX_LENGTH {
        return Err(DomainScanError::config(format!(
            "domain length must be between 1 and {}, got {}",
            MAX_LENGTH, length
        )));
    }
    Ok(())
}

/// Build the candidate sequence for a configuration.
///
/// All validation happens here, so a bad alphabet, length or filter aborts
/// before a single candidate is produced.
pub fn generate_candidates(
    config: &GeneratorConfig,
) -> Result<CandidateGenerator, DomainScanError> {
    CandidateGenerator::new(config)
}

impl CandidateGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, DomainScanError> {
        let total = estimate_candidate_count(config.length, config.pattern)?;

        let filter = match config.regex_filter.as_deref() {
            Some(pattern) if !pattern.is_empty() => Some(RegexGuard::compile(pattern)?),
            _ => None,
        };

        Ok(Self {
            alphabet: config.pattern.alphabet(),
            length: config.length,
            suffix: config.suffix.clone(),
            filter,
            mode: config.regex_mode,
            counter: 0,
            total,
        })
    }

    /// Keyspace size before filtering.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Counter values consumed so far, matched or not.
    pub fn position(&self) -> u64 {
        self.counter
    }

    /// Render counter value `n` as a fixed-length body.
    fn body_at(&self, mut n: u64) -> String {
        let radix = self.alphabet.len() as u64;
        let mut symbols = vec![0u8; self.length];
        for slot in symbols.iter_mut().rev() {
            *slot = self.alphabet[(n % radix) as usize];
            n /= radix;
        }
        symbols.into_iter().map(char::from).collect()
    }

    fn accepts(&self, body: &str, domain: &str) -> bool {
        match &self.filter {
            None => true,
            Some(guard) => match self.mode {
                RegexMode::Full => guard.is_match(domain),
                RegexMode::Prefix => guard.is_match(body),
            },
        }
    }
}

impl Iterator for CandidateGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while self.counter < self.total {
            let body = self.body_at(self.counter);
            self.counter += 1;

            let domain = format!("{}{}", body, self.suffix);
            if self.accepts(&body, &domain) {
                return Some(domain);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.total - self.counter).ok();
        (0, remaining)
    }
}

impl FusedIterator for CandidateGenerator {}

/// Run a generator on the blocking pool, feeding a bounded channel.
///
/// The channel closes when the sequence is exhausted. The handle resolves to
/// the number of candidates actually emitted, which is the run's final
/// candidate count.
pub fn spawn_candidate_producer(
    generator: CandidateGenerator,
    capacity: usize,
) -> (mpsc::Receiver<String>, JoinHandle<u64>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::task::spawn_blocking(move || {
        let mut emitted = 0u64;
        for candidate in generator {
            if tx.blocking_send(candidate).is_err() {
                debug!(emitted, "candidate receiver dropped, stopping generation");
                break;
            }
            emitted += 1;
        }
        debug!(emitted, "candidate generation finished");
        emitted
    });

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn letters(length: usize, suffix: &str) -> GeneratorConfig {
        GeneratorConfig::new(length, suffix, CharsetPattern::Letters)
    }

    // ── Enumeration ─────────────────────────────────────────────────

    #[test]
    fn test_emits_full_keyspace_unique_and_sized() {
        for (pattern, size) in [
            (CharsetPattern::Digits, 10usize),
            (CharsetPattern::Letters, 26),
            (CharsetPattern::Alphanumeric, 36),
        ] {
            let config = GeneratorConfig::new(2, ".li", pattern);
            let names: Vec<String> = generate_candidates(&config).unwrap().collect();

            assert_eq!(names.len(), size * size);
            assert!(names.iter().all(|n| n.len() == 2 + ".li".len()));
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
        }
    }

    #[test]
    fn test_most_significant_symbol_first() {
        let names: Vec<String> = generate_candidates(&GeneratorConfig::new(
            2,
            ".de",
            CharsetPattern::Digits,
        ))
        .unwrap()
        .collect();
        assert_eq!(names[0], "00.de");
        assert_eq!(names[1], "01.de");
        assert_eq!(names[10], "10.de");
        assert_eq!(names[99], "99.de");
    }

    #[test]
    fn test_alphanumeric_order_letters_then_digits() {
        let names: Vec<String> = generate_candidates(&GeneratorConfig::new(
            1,
            ".io",
            CharsetPattern::Alphanumeric,
        ))
        .unwrap()
        .collect();
        assert_eq!(names.first().map(String::as_str), Some("a.io"));
        assert_eq!(names[25], "z.io");
        assert_eq!(names[26], "0.io");
        assert_eq!(names.last().map(String::as_str), Some("9.io"));
    }

    #[test]
    fn test_exhausted_sequence_stays_exhausted() {
        let mut gen = generate_candidates(&letters(1, ".li")).unwrap();
        assert_eq!(gen.by_ref().count(), 26);
        assert_eq!(gen.next(), None);
        assert_eq!(gen.position(), 26);
    }

    #[test]
    fn test_long_length_does_not_allocate_keyspace() {
        // 26^10 candidates; only the first few are pulled.
        let mut gen = generate_candidates(&letters(10, ".com")).unwrap();
        assert_eq!(gen.total(), 26u64.pow(10));
        assert_eq!(gen.next().as_deref(), Some("aaaaaaaaaa.com"));
        assert_eq!(gen.next().as_deref(), Some("aaaaaaaaab.com"));
    }

    // ── Filtering ───────────────────────────────────────────────────

    #[test]
    fn test_prefix_filter_scenario() {
        let config = letters(2, ".ai").with_regex("^a", RegexMode::Prefix);
        let names: Vec<String> = generate_candidates(&config).unwrap().collect();
        assert_eq!(names.len(), 26);
        assert_eq!(names.first().map(String::as_str), Some("aa.ai"));
        assert_eq!(names.last().map(String::as_str), Some("az.ai"));
        assert!(names.iter().all(|n| n.starts_with('a')));
    }

    #[test]
    fn test_full_mode_sees_suffix() {
        // The suffix is only visible in full mode.
        let full = letters(1, ".li").with_regex("\\.li$", RegexMode::Full);
        assert_eq!(generate_candidates(&full).unwrap().count(), 26);

        let prefix = letters(1, ".li").with_regex("\\.li$", RegexMode::Prefix);
        assert_eq!(generate_candidates(&prefix).unwrap().count(), 0);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let config = GeneratorConfig::new(2, ".li", CharsetPattern::Alphanumeric)
            .with_regex("^[a-z][0-9]", RegexMode::Full);
        let once: Vec<String> = generate_candidates(&config).unwrap().collect();

        let guard = RegexGuard::compile("^[a-z][0-9]").unwrap();
        let twice: Vec<String> = once.iter().filter(|d| guard.is_match(d)).cloned().collect();
        assert_eq!(once, twice);
        assert_eq!(once.len(), 26 * 10);
    }

    #[test]
    fn test_empty_filter_means_no_filter() {
        let config = letters(1, ".li").with_regex("", RegexMode::Full);
        assert!(config.regex_filter.is_none());
        assert_eq!(generate_candidates(&config).unwrap().count(), 26);
    }

    // ── Configuration errors ────────────────────────────────────────

    #[test]
    fn test_dangerous_filter_fails_before_generation() {
        let config = letters(2, ".li").with_regex("(a+)+", RegexMode::Full);
        let err = generate_candidates(&config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_invalid_lengths() {
        assert!(generate_candidates(&letters(0, ".li")).is_err());
        assert!(generate_candidates(&letters(MAX_LENGTH + 1, ".li")).is_err());
        // 36^13 overflows u64
        assert!(estimate_candidate_count(13, CharsetPattern::Alphanumeric).is_err());
    }

    #[test]
    fn test_estimate_candidate_count() {
        assert_eq!(estimate_candidate_count(3, CharsetPattern::Letters).unwrap(), 17_576);
        assert_eq!(estimate_candidate_count(4, CharsetPattern::Digits).unwrap(), 10_000);
        assert_eq!(estimate_candidate_count(2, CharsetPattern::Alphanumeric).unwrap(), 1296);
    }

    // ── Producer ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_producer_streams_through_small_buffer() {
        let gen = generate_candidates(&letters(2, ".li")).unwrap();
        let (mut rx, handle) = spawn_candidate_producer(gen, 4);

        let mut received = Vec::new();
        while let Some(candidate) = rx.recv().await {
            received.push(candidate);
        }

        assert_eq!(received.len(), 676);
        assert_eq!(handle.await.unwrap(), 676);
    }

    #[tokio::test]
    async fn test_producer_stops_when_receiver_dropped() {
        let gen = generate_candidates(&letters(4, ".li")).unwrap();
        let (mut rx, handle) = spawn_candidate_producer(gen, 8);

        assert!(rx.recv().await.is_some());
        drop(rx);

        let emitted = handle.await.unwrap();
        assert!(emitted < 26u64.pow(4));
    }
}
