//! Worker pool and result aggregation for a scan.
//!
//! Candidates flow through two bounded queues:
//!
//! ```text
//! generator --[candidates]--> N workers --[results]--> aggregator --> sink
//! ```
//!
//! Bounded queues are the only flow control. A slow sink stalls the workers
//! and a slow generator starves them. The result queue closes once every
//! worker has dropped its sender, so the aggregator sees exactly the
//! candidates that were generated, no more and no fewer.

use crate::checker::DomainScanner;
use crate::error::DomainScanError;
use crate::generate::{spawn_candidate_producer, CandidateGenerator};
use crate::types::{ScanResult, SpecialStatusRecord, Verdict};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

/// Running counters, updated once per result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub processed: u64,
    pub available: u64,
    pub registered: u64,
    pub special: u64,
    pub errors: u64,
}

/// Consumer of per-candidate results, called in completion order.
pub trait ResultSink {
    fn accept(&mut self, result: &ScanResult, progress: &Progress);
}

impl<F> ResultSink for F
where
    F: FnMut(&ScanResult, &Progress),
{
    fn accept(&mut self, result: &ScanResult, progress: &Progress) {
        self(result, progress)
    }
}

/// Sink that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResultSink for NullSink {
    fn accept(&mut self, _result: &ScanResult, _progress: &Progress) {}
}

/// A candidate whose probing hit an unexpected failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCandidate {
    pub domain: String,
    pub message: String,
}

/// Everything a finished scan produced.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Candidates emitted by the generator
    pub generated: u64,
    /// Results drained by the aggregator
    pub processed: u64,
    pub available: Vec<String>,
    pub registered: Vec<String>,
    /// Domains with a special-status verdict, with their reason
    pub special: Vec<(String, String)>,
    pub errors: Vec<FailedCandidate>,
    /// Run's special-status log, including rate-limit flags
    pub special_status: Vec<SpecialStatusRecord>,
    pub duration: Duration,
}

impl ScanReport {
    pub fn is_complete(&self) -> bool {
        self.processed == self.generated
    }
}

/// Partitions results into per-category lists in completion order.
#[derive(Debug, Default)]
pub struct Aggregator {
    progress: Progress,
    available: Vec<String>,
    registered: Vec<String>,
    special: Vec<(String, String)>,
    errors: Vec<FailedCandidate>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Record one result and return the updated counters.
    pub fn absorb(&mut self, result: &ScanResult) -> &Progress {
        self.progress.processed += 1;

        if let Some(message) = &result.error {
            self.progress.errors += 1;
            self.errors.push(FailedCandidate {
                domain: result.domain.clone(),
                message: message.clone(),
            });
            return &self.progress;
        }

        match &result.verdict {
            Verdict::Available => {
                self.progress.available += 1;
                self.available.push(result.domain.clone());
            }
            Verdict::Registered => {
                self.progress.registered += 1;
                self.registered.push(result.domain.clone());
            }
            Verdict::SpecialStatus(reason) => {
                self.progress.special += 1;
                self.special.push((result.domain.clone(), reason.clone()));
            }
        }
        &self.progress
    }

    pub fn finish(
        self,
        generated: u64,
        special_status: Vec<SpecialStatusRecord>,
        duration: Duration,
    ) -> ScanReport {
        ScanReport {
            generated,
            processed: self.progress.processed,
            available: self.available,
            registered: self.registered,
            special: self.special,
            errors: self.errors,
            special_status,
            duration,
        }
    }
}

type SharedCandidates = Arc<Mutex<mpsc::Receiver<String>>>;

async fn worker(
    id: usize,
    scanner: DomainScanner,
    candidates: SharedCandidates,
    results: mpsc::Sender<ScanResult>,
    delay: Duration,
) -> u64 {
    let mut handled = 0u64;

    loop {
        // Lock only for the dequeue so other workers can probe meanwhile.
        let next = candidates.lock().await.recv().await;
        let Some(domain) = next else { break };

        let result = scanner.check_domain(&domain).await;
        handled += 1;

        if results.send(result).await.is_err() {
            warn!(worker = id, "result queue closed, stopping worker");
            break;
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    debug!(worker = id, handled, "worker finished");
    handled
}

/// Run a full scan: generate, probe with a fixed pool, aggregate.
///
/// Returns once the generator is exhausted and every result has been
/// delivered to `sink`.
pub async fn run_scan<S: ResultSink>(
    scanner: &DomainScanner,
    generator: CandidateGenerator,
    mut sink: S,
) -> Result<ScanReport, DomainScanError> {
    let config = scanner.config().clone();
    let started = Instant::now();

    info!(
        workers = config.workers,
        delay_ms = config.delay.as_millis() as u64,
        keyspace = generator.total(),
        "starting scan"
    );

    let (candidates, producer) = spawn_candidate_producer(generator, config.queue_capacity);
    let candidates: SharedCandidates = Arc::new(Mutex::new(candidates));
    let (result_tx, mut result_rx) = mpsc::channel(config.queue_capacity);

    let workers: Vec<_> = (1..=config.workers)
        .map(|id| {
            tokio::spawn(worker(
                id,
                scanner.clone(),
                Arc::clone(&candidates),
                result_tx.clone(),
                config.delay,
            ))
        })
        .collect();
    // Workers hold the remaining senders; the queue closes when they finish.
    drop(result_tx);

    let mut aggregator = Aggregator::new();
    while let Some(result) = result_rx.recv().await {
        let progress = aggregator.absorb(&result);
        sink.accept(&result, progress);
    }

    let generated = producer
        .await
        .map_err(|e| DomainScanError::internal(format!("candidate producer failed: {}", e)))?;

    let mut handled = 0u64;
    for outcome in join_all(workers).await {
        handled += outcome
            .map_err(|e| DomainScanError::internal(format!("worker task failed: {}", e)))?;
    }

    let special_status = scanner.context().special_status().get_all();
    let report = aggregator.finish(generated, special_status, started.elapsed());

    if !report.is_complete() || handled != report.processed {
        warn!(
            generated,
            processed = report.processed,
            handled,
            "processed count does not match generated count"
        );
    }

    info!(
        processed = report.processed,
        available = report.available.len(),
        registered = report.registered.len(),
        special = report.special.len(),
        errors = report.errors.len(),
        elapsed = ?report.duration,
        "scan finished"
    );

    Ok(report)
}
