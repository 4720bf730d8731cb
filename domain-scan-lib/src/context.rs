//! Per-run shared state.
//!
//! One `RunContext` is built before a scan starts and handed to every
//! worker by reference. Nothing in it outlives the run, so two scans in the
//! same process never see each other's special-status records.

use crate::error::DomainScanError;
use crate::protocols::WhoisIndicators;
use crate::special_status::SpecialStatusLog;
use crate::types::{RetryPolicy, ScanConfig};
use std::sync::Arc;

#[derive(Debug)]
pub struct RunContext {
    config: ScanConfig,
    indicators: WhoisIndicators,
    special_status: Arc<SpecialStatusLog>,
}

impl RunContext {
    /// Validate `config` and build the run's read-only tables.
    pub fn new(config: ScanConfig) -> Result<Self, DomainScanError> {
        validate_scan_config(&config)?;
        Ok(Self {
            config,
            indicators: WhoisIndicators::new(),
            special_status: Arc::new(SpecialStatusLog::new()),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn indicators(&self) -> &WhoisIndicators {
        &self.indicators
    }

    pub fn special_status(&self) -> &Arc<SpecialStatusLog> {
        &self.special_status
    }
}

/// Reject configurations the worker pool cannot run with.
pub fn validate_scan_config(config: &ScanConfig) -> Result<(), DomainScanError> {
    if config.workers == 0 || config.workers > 100 {
        return Err(DomainScanError::config(format!(
            "worker count must be between 1 and 100, got {}",
            config.workers
        )));
    }
    if config.queue_capacity == 0 {
        return Err(DomainScanError::config("queue capacity must be at least 1"));
    }
    let attempts = config.whois_retry.max_attempts;
    if attempts == 0 || attempts > RetryPolicy::MAX_ATTEMPTS {
        return Err(DomainScanError::config(format!(
            "WHOIS attempts must be between 1 and {}, got {}",
            RetryPolicy::MAX_ATTEMPTS,
            attempts
        )));
    }
    if config.tls_timeout.is_zero() || config.whois_timeout.is_zero() {
        return Err(DomainScanError::config("probe timeouts must be non-zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let ctx = RunContext::new(ScanConfig::default()).unwrap();
        assert!(ctx.special_status().is_empty());
        assert_eq!(ctx.config().workers, 10);
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut config = ScanConfig::default();
        config.workers = 0;
        assert!(RunContext::new(config).is_err());

        let mut config = ScanConfig::default();
        config.workers = 101;
        assert!(RunContext::new(config).is_err());

        let mut config = ScanConfig::default();
        config.whois_retry.max_attempts = 6;
        assert!(RunContext::new(config).is_err());

        let mut config = ScanConfig::default();
        config.queue_capacity = 0;
        let err = RunContext::new(config).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_runs_do_not_share_special_status() {
        let first = RunContext::new(ScanConfig::default()).unwrap();
        let second = RunContext::new(ScanConfig::default()).unwrap();
        first.special_status().append("ab.li", "HOLD");
        assert_eq!(first.special_status().len(), 1);
        assert!(second.special_status().is_empty());
    }
}
