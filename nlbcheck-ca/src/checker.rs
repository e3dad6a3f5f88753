//! Run orchestrator
//!
//! Discovers every export CSV in the input directory and drives one
//! pipeline execution per file: read → filter → dispatch → aggregate →
//! rank → write. Each input yields an independently timestamped report
//! plus a summary side-file. A failing artifact is logged and skipped so
//! the rest of the batch still runs.

use crate::client::CatalogueClient;
use crate::pool::{CancelFlag, WorkerPool};
use crate::{filter, input, report};
use chrono::Local;
use nlbcheck_common::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// One pipeline run per discovered input artifact
pub struct AvailabilityChecker {
    input_dir: PathBuf,
    output_dir: PathBuf,
    pool: WorkerPool,
    min_rating: f64,
}

impl AvailabilityChecker {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf, pool: WorkerPool) -> Self {
        Self {
            input_dir,
            output_dir,
            pool,
            min_rating: 0.0,
        }
    }

    /// Only check books rated at or above the cutoff.
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = min_rating;
        self
    }

    /// Process every `*.csv` in the input directory (non-recursive, sorted
    /// by name for a deterministic batch order).
    ///
    /// A missing input directory is fatal; a failure inside one artifact is
    /// logged and does not prevent the remaining artifacts from being
    /// attempted. Returns the input paths that were processed successfully,
    /// for use by an optional upload step.
    pub fn process_all(
        &self,
        client: &dyn CatalogueClient,
        cancel: &CancelFlag,
    ) -> Result<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(Error::InvalidInput(format!(
                "Input directory not found: {}",
                self.input_dir.display()
            )));
        }
        std::fs::create_dir_all(&self.output_dir)?;

        let mut inputs: Vec<PathBuf> = std::fs::read_dir(&self.input_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        inputs.sort();
        info!(
            "Found {} input file(s) in {}",
            inputs.len(),
            self.input_dir.display()
        );

        let mut processed = Vec::new();
        for path in inputs {
            if cancel.is_cancelled() {
                info!("Cancellation requested; skipping remaining inputs");
                break;
            }
            match self.process_file(&path, client, cancel) {
                Ok(output) => {
                    info!("Wrote {}", output.display());
                    processed.push(path);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", path.display(), e);
                }
            }
        }
        Ok(processed)
    }

    /// Run the pipeline for one input artifact; returns the report path.
    pub fn process_file(
        &self,
        path: &Path,
        client: &dyn CatalogueClient,
        cancel: &CancelFlag,
    ) -> Result<PathBuf> {
        info!("Reading from {}", path.display());
        let rows = input::read_rows(path)?;

        let candidates = filter::apply_min_rating(filter::filter_rows(&rows), self.min_rating);
        info!(
            "{} of {} rows are to-read candidates",
            candidates.len(),
            rows.len()
        );

        let outcome = self.pool.run(&candidates, client, cancel)?;
        let mut records = outcome.records;
        report::rank(&mut records);

        let output_path = self.output_path(path)?;
        report::write_report(&output_path, &records)?;
        let summary_path = output_path.with_extension("txt");
        report::write_summary(&summary_path, &outcome.stats)?;
        info!("{}", report::summary_line(&outcome.stats));

        Ok(output_path)
    }

    fn output_path(&self, input: &Path) -> Result<PathBuf> {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::InvalidInput(format!("Input has no file name: {}", input.display()))
            })?;
        let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S").to_string();
        Ok(unique_output_path(&self.output_dir, &stem, &timestamp))
    }
}

/// `<stem>-caa<timestamp>.csv`, with a numeric suffix probe so repeated
/// runs within the same second cannot collide.
fn unique_output_path(output_dir: &Path, stem: &str, timestamp: &str) -> PathBuf {
    let candidate = output_dir.join(format!("{stem}-caa{timestamp}.csv"));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1;
    loop {
        let candidate = output_dir.join(format!("{stem}-caa{timestamp}-{n}.csv"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_output_path_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = unique_output_path(dir.path(), "goodreads_library_export", "2026-08-07-10-00-00");
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "goodreads_library_export-caa2026-08-07-10-00-00.csv"
        );
    }

    #[test]
    fn test_unique_output_path_probes_past_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_output_path(dir.path(), "export", "2026-08-07-10-00-00");
        std::fs::write(&first, "x").unwrap();
        let second = unique_output_path(dir.path(), "export", "2026-08-07-10-00-00");
        assert_ne!(first, second);
        assert!(second
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("-1.csv"));

        std::fs::write(&second, "x").unwrap();
        let third = unique_output_path(dir.path(), "export", "2026-08-07-10-00-00");
        assert!(third
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("-2.csv"));
    }

    #[test]
    fn test_missing_input_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let checker = AvailabilityChecker::new(
            dir.path().join("nope"),
            dir.path().join("out"),
            WorkerPool::new(1),
        );

        struct NeverCalled;
        impl CatalogueClient for NeverCalled {
            fn lookup(
                &self,
                _key: &str,
            ) -> std::result::Result<
                Vec<nlbcheck_common::models::AvailabilityItem>,
                crate::client::CatalogueError,
            > {
                panic!("lookup must not be reached");
            }
        }

        assert!(checker.process_all(&NeverCalled, &CancelFlag::new()).is_err());
    }
}
