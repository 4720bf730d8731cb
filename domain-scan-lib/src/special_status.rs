//! Run-scoped list of domains that need manual review.

use crate::types::SpecialStatusRecord;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Reason recorded when WHOIS stayed rate limited and nothing else showed
/// the domain is taken.
pub const WHOIS_RATE_LIMITED: &str = "WHOIS_RATE_LIMITED";

/// Reason recorded when every WHOIS attempt failed and nothing else showed
/// the domain is taken.
pub const WHOIS_UNREACHABLE: &str = "WHOIS_UNREACHABLE";

/// Append-only (within a run) list of special-status records, shared by all
/// workers.
#[derive(Debug, Default)]
pub struct SpecialStatusLog {
    records: Mutex<Vec<SpecialStatusRecord>>,
}

impl SpecialStatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<SpecialStatusRecord>> {
        // Poisoned locks still hold a consistent Vec.
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn append(&self, domain: &str, reason: &str) {
        warn!(domain, status = reason, "special status");
        self.guard().push(SpecialStatusRecord {
            domain: domain.to_string(),
            status: reason.to_string(),
            detail: format!("WHOIS status: {}", reason),
        });
    }

    /// Snapshot of every record so far, in append order.
    pub fn get_all(&self) -> Vec<SpecialStatusRecord> {
        self.guard().clone()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Drop all records. Only meant for the start of a new run.
    pub fn clear(&self) {
        self.guard().clear();
    }
}
