//! Main domain scanner implementation.
//!
//! `DomainScanner` runs the enabled probes for one candidate, hands the
//! evidence to the classifier and packages the outcome as a `ScanResult`.
//! Scanning a whole generated sequence goes through [`DomainScanner::scan`],
//! which drives the worker pool in [`crate::concurrent`].

use crate::classifier::Classifier;
use crate::concurrent::{run_scan, ResultSink, ScanReport};
use crate::context::RunContext;
use crate::error::DomainScanError;
use crate::generate::CandidateGenerator;
use crate::protocols::{DnsProbe, ProbeSources, TlsProbe, WhoisEvidence, WhoisProbe};
use crate::types::{ScanConfig, ScanResult};
use std::sync::Arc;
use tracing::debug;

/// Coordinates DNS, WHOIS and TLS probing for candidates.
///
/// Cloning is cheap; every clone shares the same run context.
///
/// # Example
///
/// ```rust,no_run
/// use domain_scan_lib::{DomainScanner, ScanConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let scanner = DomainScanner::new(ScanConfig::default())?;
///     let result = scanner.check_domain("abc.li").await;
///     println!("{}: {}", result.domain, result.verdict);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainScanner {
    context: Arc<RunContext>,
    dns: DnsProbe,
    whois: WhoisProbe,
    tls: TlsProbe,
    classifier: Classifier,
}

impl DomainScanner {
    /// Scanner backed by the system resolver, rustls and the `whois` binary.
    pub fn new(config: ScanConfig) -> Result<Self, DomainScanError> {
        let sources = ProbeSources::system(&config)?;
        Self::with_sources(config, sources)
    }

    /// Scanner with caller-supplied probe sources.
    pub fn with_sources(config: ScanConfig, sources: ProbeSources) -> Result<Self, DomainScanError> {
        let context = Arc::new(RunContext::new(config)?);
        let retry = context.config().whois_retry;

        Ok(Self {
            dns: DnsProbe::new(sources.dns),
            whois: WhoisProbe::new(sources.whois, retry),
            tls: TlsProbe::new(sources.tls),
            classifier: Classifier::new(Arc::clone(context.special_status())),
            context,
        })
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn config(&self) -> &ScanConfig {
        self.context.config()
    }

    /// Probe and classify one candidate.
    ///
    /// Probe failures never surface as `Err` or on the result; a probe that
    /// fails simply contributes no signature.
    pub async fn check_domain(&self, domain: &str) -> ScanResult {
        let methods = self.config().methods;
        let mut signatures = Vec::new();

        if methods.dns {
            signatures.extend(self.dns.signatures(domain).await);
        }

        let whois = if methods.whois {
            self.whois.probe(domain, self.context.indicators()).await
        } else {
            WhoisEvidence::NotChecked
        };
        signatures.extend(whois.signature());

        if methods.ssl {
            signatures.extend(self.tls.signature(domain).await);
        }

        let verdict = self.classifier.classify(domain, &signatures, &whois);

        debug!(domain, %verdict, signatures = ?signatures, "candidate classified");

        ScanResult {
            domain: domain.to_string(),
            verdict,
            signatures,
            error: None,
        }
    }

    /// Scan every candidate the generator yields.
    ///
    /// `sink` sees each result as it completes, in completion order.
    pub async fn scan<S: ResultSink>(
        &self,
        generator: CandidateGenerator,
        sink: S,
    ) -> Result<ScanReport, DomainScanError> {
        run_scan(self, generator, sink).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::{DnsRecordKind, DnsSource, TlsSource, WhoisSource};
    use crate::types::{ProbeMethods, RetryPolicy, Signature, Verdict};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoDns;

    #[async_trait]
    impl DnsSource for NoDns {
        async fn lookup(&self, domain: &str, _: DnsRecordKind) -> Result<Vec<String>, DomainScanError> {
            Err(DomainScanError::dns(domain, "NXDOMAIN"))
        }
    }

    struct OnlyA;

    #[async_trait]
    impl DnsSource for OnlyA {
        async fn lookup(&self, _: &str, kind: DnsRecordKind) -> Result<Vec<String>, DomainScanError> {
            Ok(match kind {
                DnsRecordKind::A => vec!["192.0.2.7".to_string()],
                _ => vec![],
            })
        }
    }

    struct NoTls;

    #[async_trait]
    impl TlsSource for NoTls {
        async fn peer_certificate_count(&self, domain: &str) -> Result<usize, DomainScanError> {
            Err(DomainScanError::tls(domain, "connection refused"))
        }
    }

    struct FixedWhois(Result<String, DomainScanError>);

    #[async_trait]
    impl WhoisSource for FixedWhois {
        async fn query(&self, _: &str) -> Result<String, DomainScanError> {
            self.0.clone()
        }
    }

    fn scanner(dns: Arc<dyn DnsSource>, whois: Result<String, DomainScanError>) -> DomainScanner {
        let config = ScanConfig::default()
            .with_delay(Duration::ZERO)
            .with_whois_retry(RetryPolicy::new(3, Duration::ZERO));
        DomainScanner::with_sources(
            config,
            ProbeSources {
                dns,
                tls: Arc::new(NoTls),
                whois: Arc::new(FixedWhois(whois)),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_redemption_period_scenario() {
        let scanner = scanner(Arc::new(NoDns), Ok("Status: REDEMPTIONPERIOD\n".to_string()));
        let result = tokio_test::block_on(scanner.check_domain("ab.li"));

        assert_eq!(result.verdict, Verdict::SpecialStatus("REDEMPTIONPERIOD".to_string()));
        assert!(!result.to_record().available);
        assert_eq!(scanner.context().special_status().len(), 1);
    }

    #[tokio::test]
    async fn test_dns_evidence_registers() {
        let scanner = scanner(Arc::new(OnlyA), Ok("No match for ab.li".to_string()));
        let result = scanner.check_domain("ab.li").await;

        assert_eq!(result.verdict, Verdict::Registered);
        assert_eq!(result.signatures, vec![Signature::DnsA]);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_without_dns_is_available_and_flagged() {
        let scanner = scanner(Arc::new(NoDns), Ok("Rate limit exceeded".to_string()));
        let result = scanner.check_domain("qx.li").await;

        assert!(result.is_available());
        let records = scanner.context().special_status().get_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "WHOIS_RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_unreachable_whois_stays_available_and_flagged() {
        let scanner = scanner(
            Arc::new(NoDns),
            Err(DomainScanError::whois("qx.li", "no route to host")),
        );
        let result = scanner.check_domain("qx.li").await;

        assert!(result.is_available());
        assert!(result.error.is_none());
        assert!(result.to_record().available);
        let records = scanner.context().special_status().get_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "WHOIS_UNREACHABLE");
    }

    #[tokio::test]
    async fn test_dns_evidence_beats_whois_special_status() {
        let scanner = scanner(Arc::new(OnlyA), Ok("Status: REDEMPTIONPERIOD\n".to_string()));
        let result = scanner.check_domain("ab.li").await;

        assert_eq!(result.verdict, Verdict::Registered);
        assert_eq!(result.signatures, vec![Signature::DnsA]);
        assert!(scanner.context().special_status().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_probes_are_skipped() {
        let config = ScanConfig::default().with_methods(ProbeMethods {
            dns: false,
            whois: false,
            ssl: false,
        });
        let scanner = DomainScanner::with_sources(
            config,
            ProbeSources {
                dns: Arc::new(OnlyA),
                tls: Arc::new(NoTls),
                whois: Arc::new(FixedWhois(Ok("Registrar: X".to_string()))),
            },
        )
        .unwrap();

        let result = scanner.check_domain("ab.li").await;
        assert!(result.signatures.is_empty());
        assert_eq!(result.verdict, Verdict::Available);
    }
}
