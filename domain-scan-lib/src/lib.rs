//! # Domain Scan Library
//!
//! Enumerates candidate domain names over a fixed-length alphabet and
//! classifies each one as available, registered or special status, using
//! three independent and unreliable signals: DNS records, WHOIS text and
//! TLS certificate presence.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_scan_lib::{
//!     generate_candidates, CharsetPattern, DomainScanner, GeneratorConfig, ScanConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let candidates = generate_candidates(&GeneratorConfig::new(3, ".li", CharsetPattern::Letters))?;
//!     let scanner = DomainScanner::new(ScanConfig::default())?;
//!
//!     let report = scanner
//!         .scan(candidates, |result: &domain_scan_lib::ScanResult, _: &domain_scan_lib::Progress| {
//!             println!("{} {}", result.domain, result.verdict);
//!         })
//!         .await?;
//!
//!     println!("{} available", report.available.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lazy generation**: mixed-radix enumeration with an optional, guarded regex filter
//! - **Multi-signal probing**: DNS, WHOIS (with rate-limit aware retries) and TLS
//! - **Worker pool**: fixed-size pool with bounded queues and a per-worker throttle
//! - **Special status tracking**: ambiguous WHOIS states are surfaced for review

// Re-export main public API types and functions
pub use checker::DomainScanner;
pub use classifier::Classifier;
pub use concurrent::{
    run_scan, Aggregator, FailedCandidate, NullSink, Progress, ResultSink, ScanReport,
};
pub use config::{
    load_env_config, ConfigManager, DomainSection, EnvConfig, FileConfig, MethodsSection,
    OutputSection, ScannerSection,
};
pub use context::RunContext;
pub use error::DomainScanError;
pub use generate::{
    estimate_candidate_count, generate_candidates, spawn_candidate_producer, CandidateGenerator,
};
pub use protocols::{
    DnsRecordKind, DnsSource, ProbeSources, TlsSource, WhoisEvidence, WhoisFinding,
    WhoisIndicators, WhoisSource,
};
pub use regex_guard::{validate_regex_complexity, RegexGuard};
pub use special_status::{SpecialStatusLog, WHOIS_RATE_LIMITED, WHOIS_UNREACHABLE};
pub use types::{
    normalize_suffix, CharsetPattern, GeneratorConfig, ProbeMethods, RegexMode, ResultRecord,
    RetryPolicy, ScanConfig, ScanResult, Signature, SpecialStatusRecord, Verdict,
};
pub use utils::{domain_body, domain_shape, group_by_shape, render_file_template};

// Public modules
pub mod generate;
pub mod protocols;

// Internal modules - these are not part of the public API
mod checker;
mod classifier;
mod concurrent;
mod config;
mod context;
mod error;
mod regex_guard;
mod special_status;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainScanError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
