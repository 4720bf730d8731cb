//! Signal probes used to classify candidates.
//!
//! Each probe wraps a source trait so the network can be swapped for an
//! in-memory fake. A probe never fails: source errors become "no evidence".

/// DNS record probe (NS, A, MX, TXT, CNAME)
pub mod dns;

/// TLS certificate presence probe
pub mod tls;

/// WHOIS text probe with rate-limit aware retries
pub mod whois;

use crate::error::DomainScanError;
use crate::types::ScanConfig;
use std::sync::Arc;

pub use dns::{DnsProbe, DnsRecordKind, DnsSource, SystemDnsSource};
pub use tls::{RustlsTlsSource, TlsProbe, TlsSource};
pub use whois::{
    CommandWhoisSource, WhoisEvidence, WhoisFinding, WhoisIndicators, WhoisProbe, WhoisSource,
};

/// The three collaborators a scanner queries.
#[derive(Clone)]
pub struct ProbeSources {
    pub dns: Arc<dyn DnsSource>,
    pub tls: Arc<dyn TlsSource>,
    pub whois: Arc<dyn WhoisSource>,
}

impl ProbeSources {
    /// Sources backed by the system resolver, rustls and the `whois` binary.
    pub fn system(config: &ScanConfig) -> Result<Self, DomainScanError> {
        Ok(Self {
            dns: Arc::new(SystemDnsSource::new()),
            tls: Arc::new(RustlsTlsSource::new(config.tls_timeout)?),
            whois: Arc::new(CommandWhoisSource::with_timeout(config.whois_timeout)),
        })
    }
}
