//! Worker pool / dispatcher
//!
//! Executes the lookup step concurrently while bounding the number of
//! simultaneous calls to the catalogue. The filtered row set is split into
//! contiguous, near-equal chunks (one per worker) so row order inside a
//! chunk is preserved and every row is assigned exactly once. Workers are
//! OS threads because each lookup is a blocking network call.
//!
//! # Error Handling
//! - Per-row error isolation: a failed lookup degrades to the "not found"
//!   sentinel and the worker moves on
//! - A run-scoped [`CancelFlag`] is checked before every lookup so one
//!   signal stops all workers at the next row boundary

use crate::aggregate::{self, RowOutcome, RunOutcome};
use crate::client::{CatalogueClient, CatalogueError};
use crate::isbn;
use nlbcheck_common::models::{AvailabilityItem, InputRow, OutputRecord};
use nlbcheck_common::{Error, Result};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Backoff before the single lookup retry
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Hard cap on the default worker count; the catalogue is a third-party
/// service with no documented rate limit.
const MAX_DEFAULT_WORKERS: usize = 4;

/// Run-scoped cancellation flag, shared between the signal handler and
/// every worker thread.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; workers stop at their next row boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// The underlying flag, for `signal_hook::flag::register`.
    pub fn handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.0)
    }
}

/// Fixed-size pool of lookup workers, constructed once per run
#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with a fixed worker count (clamped to at least 1).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Default worker count: `min(4, available parallelism)`.
    pub fn default_workers() -> usize {
        thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1)
            .min(MAX_DEFAULT_WORKERS)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Dispatch the filtered rows across the pool and aggregate the results.
    ///
    /// Blocks the caller until every worker has finished (the thread scope
    /// is the join barrier); the aggregator drains outcomes concurrently
    /// inside the scope, so collection overlaps in-flight lookups.
    pub fn run(
        &self,
        rows: &[InputRow],
        client: &dyn CatalogueClient,
        cancel: &CancelFlag,
    ) -> Result<RunOutcome> {
        if rows.is_empty() {
            return Ok(RunOutcome::default());
        }

        let chunks = partition(rows, self.workers);
        let (tx, rx) = crossbeam_channel::unbounded();
        info!(
            "Dispatching {} rows across {} workers",
            rows.len(),
            chunks.iter().filter(|c| !c.is_empty()).count()
        );

        thread::scope(|scope| -> Result<RunOutcome> {
            for (index, chunk) in chunks.iter().enumerate() {
                if chunk.is_empty() {
                    continue;
                }
                let tx = tx.clone();
                thread::Builder::new()
                    .name(format!("lookup-worker-{index}"))
                    .spawn_scoped(scope, move || {
                        worker_loop(index, chunk, client, cancel, tx)
                    })
                    .map_err(Error::Io)?;
            }
            // Workers hold the remaining senders; collection ends when the
            // last one finishes.
            drop(tx);
            Ok(aggregate::collect(&rx))
        })
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(Self::default_workers())
    }
}

/// Split `items` into `workers` contiguous chunks whose sizes differ by at
/// most one; the first `len % workers` chunks carry the extra element.
pub fn partition<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    let workers = workers.max(1);
    let base = items.len() / workers;
    let remainder = items.len() % workers;

    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0;
    for index in 0..workers {
        let size = base + usize::from(index < remainder);
        chunks.push(&items[start..start + size]);
        start += size;
    }
    chunks
}

fn worker_loop(
    worker_index: usize,
    rows: &[InputRow],
    client: &dyn CatalogueClient,
    cancel: &CancelFlag,
    outcomes: crossbeam_channel::Sender<RowOutcome>,
) {
    debug!(worker = worker_index, rows = rows.len(), "Worker started");

    for row in rows {
        if cancel.is_cancelled() {
            warn!(
                worker = worker_index,
                "Cancellation requested; abandoning remaining rows"
            );
            break;
        }

        let Some(key) = isbn::normalized_key(row) else {
            debug!(book_id = %row.book_id, title = %row.title, "No usable ISBN; skipping row");
            continue;
        };

        let outcome = check_row(row, &key, client);
        if outcomes.send(outcome).is_err() {
            // Receiver gone; nothing left to report to.
            break;
        }
    }

    debug!(worker = worker_index, "Worker finished");
}

/// Resolve one row against the catalogue.
///
/// A lookup failure is contained here: it is logged and degraded to the
/// "not found" sentinel so the worker keeps its forward progress.
fn check_row(row: &InputRow, key: &str, client: &dyn CatalogueClient) -> RowOutcome {
    match lookup_with_retry(client, key) {
        Ok(items) if !items.is_empty() => RowOutcome {
            records: items
                .iter()
                .map(|item| OutputRecord::from_item(row, item))
                .collect(),
            matched: true,
        },
        Ok(_) => {
            debug!(book_id = %row.book_id, key = %key, "No copies in catalogue");
            RowOutcome {
                records: vec![OutputRecord::not_found(row)],
                matched: false,
            }
        }
        Err(e) => {
            warn!(
                book_id = %row.book_id,
                key = %key,
                error = %e,
                "Lookup failed; recording as not found"
            );
            RowOutcome {
                records: vec![OutputRecord::not_found(row)],
                matched: false,
            }
        }
    }
}

/// Look up a key, retrying exactly once after a short backoff when the
/// failure is retryable. Parse failures are not retried; the response
/// would not change.
pub fn lookup_with_retry(
    client: &dyn CatalogueClient,
    key: &str,
) -> std::result::Result<Vec<AvailabilityItem>, CatalogueError> {
    match client.lookup(key) {
        Err(e) if e.is_retryable() => {
            debug!(key = %key, error = %e, "Retrying lookup after backoff");
            thread::sleep(RETRY_BACKOFF);
            client.lookup(key)
        }
        other => other,
    }
}

// ============================================================================
// Tests
// ============================================================================
