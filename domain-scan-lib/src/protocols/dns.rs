//! DNS evidence for registration.
//!
//! Any record at all under a candidate means someone delegated it. Lookup
//! failures (NXDOMAIN, timeouts, SERVFAIL) are absence of evidence.

use crate::error::DomainScanError;
use crate::types::Signature;
use async_trait::async_trait;
use futures::future::join_all;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use std::sync::Arc;
use tracing::{debug, warn};

/// Record types queried for every candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsRecordKind {
    Ns,
    A,
    Mx,
    Txt,
    Cname,
}

impl DnsRecordKind {
    pub const ALL: [DnsRecordKind; 5] = [
        DnsRecordKind::Ns,
        DnsRecordKind::A,
        DnsRecordKind::Mx,
        DnsRecordKind::Txt,
        DnsRecordKind::Cname,
    ];

    pub fn signature(&self) -> Signature {
        match self {
            DnsRecordKind::Ns => Signature::DnsNs,
            DnsRecordKind::A => Signature::DnsA,
            DnsRecordKind::Mx => Signature::DnsMx,
            DnsRecordKind::Txt => Signature::DnsTxt,
            DnsRecordKind::Cname => Signature::DnsCname,
        }
    }
}

/// Something that can answer DNS questions for a name.
///
/// Returns the textual record data; an empty vector means no records.
#[async_trait]
pub trait DnsSource: Send + Sync {
    async fn lookup(
        &self,
        domain: &str,
        kind: DnsRecordKind,
    ) -> Result<Vec<String>, DomainScanError>;
}

/// Resolver built from the platform configuration (`/etc/resolv.conf` on
/// Unix), using its default timeouts.
pub struct SystemDnsSource {
    resolver: TokioAsyncResolver,
}

impl SystemDnsSource {
    pub fn new() -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                warn!(error = %e, "system resolver configuration unavailable, using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { resolver }
    }
}

impl Default for SystemDnsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsSource for SystemDnsSource {
    async fn lookup(
        &self,
        domain: &str,
        kind: DnsRecordKind,
    ) -> Result<Vec<String>, DomainScanError> {
        // Trailing dot keeps the search list out of the query.
        let fqdn = format!("{}.", domain.trim_end_matches('.'));
        let to_error = |e: hickory_resolver::error::ResolveError| {
            DomainScanError::dns(domain, e.to_string())
        };

        let records = match kind {
            DnsRecordKind::Ns => self
                .resolver
                .ns_lookup(fqdn.as_str())
                .await
                .map_err(to_error)?
                .iter()
                .map(|ns| ns.to_string())
                .collect(),
            DnsRecordKind::A => self
                .resolver
                .lookup_ip(fqdn.as_str())
                .await
                .map_err(to_error)?
                .iter()
                .map(|ip| ip.to_string())
                .collect(),
            DnsRecordKind::Mx => self
                .resolver
                .mx_lookup(fqdn.as_str())
                .await
                .map_err(to_error)?
                .iter()
                .map(|mx| mx.exchange().to_string())
                .collect(),
            DnsRecordKind::Txt => self
                .resolver
                .txt_lookup(fqdn.as_str())
                .await
                .map_err(to_error)?
                .iter()
                .map(|txt| txt.to_string())
                .collect(),
            DnsRecordKind::Cname => self
                .resolver
                .lookup(fqdn.as_str(), RecordType::CNAME)
                .await
                .map_err(to_error)?
                .iter()
                .filter_map(|rdata| match rdata {
                    RData::CNAME(target) => Some(target.to_string()),
                    _ => None,
                })
                .collect(),
        };

        Ok(records)
    }
}

/// Runs the five lookups for a candidate and turns answers into signatures.
#[derive(Clone)]
pub struct DnsProbe {
    source: Arc<dyn DnsSource>,
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

impl DnsProbe {
    pub fn new(source: Arc<dyn DnsSource>) -> Self {
        Self { source }
    }

    /// Signatures in record-kind order (NS, A, MX, TXT, CNAME).
    pub async fn signatures(&self, domain: &str) -> Vec<Signature> {
        let lookups = DnsRecordKind::ALL
            .iter()
            .map(|&kind| async move { (kind, self.source.lookup(domain, kind).await) });

        let mut signatures = Vec::new();
        for (kind, outcome) in join_all(lookups).await {
            let records = match outcome {
                Ok(records) => records,
                Err(e) => {
                    debug!(domain, ?kind, error = %e, "DNS lookup yielded no evidence");
                    continue;
                }
            };

            let present = match kind {
                // A CNAME pointing back at the query name proves nothing.
                DnsRecordKind::Cname => {
                    let query = normalize_name(domain);
                    records.iter().any(|target| normalize_name(target) != query)
                }
                _ => !records.is_empty(),
            };

            if present {
                signatures.push(kind.signature());
            }
        }
        signatures
    }
}
