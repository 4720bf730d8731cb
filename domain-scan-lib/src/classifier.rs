//! Turns probe evidence into a verdict.
//!
//! Precedence, highest first:
//!
//! 1. RESERVED present: Registered
//! 2. any DNS, WHOIS or SSL signature: Registered
//! 3. WHOIS special status: SpecialStatus(reason), recorded for review
//! 4. WHOIS rate limited on its last attempt: Available, recorded as
//!    `WHOIS_RATE_LIMITED`
//! 5. WHOIS unreachable on every attempt: Available, recorded as
//!    `WHOIS_UNREACHABLE`
//! 6. otherwise: Available

use crate::protocols::WhoisEvidence;
use crate::special_status::{SpecialStatusLog, WHOIS_RATE_LIMITED, WHOIS_UNREACHABLE};
use crate::types::{Signature, Verdict};
use std::sync::Arc;

/// Stateless apart from the run's special-status log.
#[derive(Debug, Clone)]
pub struct Classifier {
    special_status: Arc<SpecialStatusLog>,
}

impl Classifier {
    pub fn new(special_status: Arc<SpecialStatusLog>) -> Self {
        Self { special_status }
    }

    pub fn classify(&self, domain: &str, signatures: &[Signature], whois: &WhoisEvidence) -> Verdict {
        if signatures.contains(&Signature::Reserved) {
            return Verdict::Registered;
        }

        if !signatures.is_empty() {
            return Verdict::Registered;
        }

        if let Some(reason) = whois.special_reason() {
            self.special_status.append(domain, reason);
            return Verdict::SpecialStatus(reason.to_string());
        }

        match whois {
            WhoisEvidence::RateLimited => self.special_status.append(domain, WHOIS_RATE_LIMITED),
            WhoisEvidence::Unreachable(_) => self.special_status.append(domain, WHOIS_UNREACHABLE),
            _ => {}
        }
        Verdict::Available
    }
}
