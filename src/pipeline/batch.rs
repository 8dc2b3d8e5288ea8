use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, warn};

use crate::catalog::store::AlleleCatalog;
use crate::core::contig::Genome;
use crate::core::report::GenomeReport;
use crate::parsing::fasta::{fasta_stem, parse_genome_file};
use crate::pipeline::config::PredictionConfig;
use crate::pipeline::predict::{predict_genome, PredictionError};

/// Why a genome produced no report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMarker {
    /// `malformed_input`, `unmapped_allele` or `alignment`
    pub kind: String,
    pub message: String,
}

impl From<&PredictionError> for ErrorMarker {
    fn from(e: &PredictionError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
        }
    }
}

/// Result for one genome of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Ok { report: GenomeReport },
    Failed { error: ErrorMarker },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub genome_id: String,

    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    fn from_result(genome_id: String, result: Result<GenomeReport, PredictionError>) -> Self {
        let outcome = match result {
            Ok(report) => BatchOutcome::Ok { report },
            Err(e) => {
                match &e {
                    PredictionError::UnmappedAllele(_) => error!("{genome_id}: {e}"),
                    _ => warn!("{genome_id}: {e}"),
                }
                BatchOutcome::Failed {
                    error: ErrorMarker::from(&e),
                }
            }
        };
        Self { genome_id, outcome }
    }

    #[must_use]
    pub fn report(&self) -> Option<&GenomeReport> {
        match &self.outcome {
            BatchOutcome::Ok { report } => Some(report),
            BatchOutcome::Failed { .. } => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&ErrorMarker> {
        match &self.outcome {
            BatchOutcome::Ok { .. } => None,
            BatchOutcome::Failed { error } => Some(error),
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.report().is_some()
    }
}

/// Run `f` on a rayon pool with `threads` workers (0 for one per core).
///
/// Falls back to the global pool if a dedicated one cannot be built.
pub fn with_thread_pool<T, F>(threads: usize, f: F) -> T
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(f),
        Err(e) => {
            warn!("Could not build a pool of {threads} threads ({e}); using the global pool");
            f()
        }
    }
}

/// Predict every genome, one entry each, in input order.
///
/// Genomes run concurrently; a failing genome yields an error marker and
/// never affects the others.
#[must_use]
pub fn predict_batch(
    genomes: &[Genome],
    catalog: &AlleleCatalog,
    config: &PredictionConfig,
) -> Vec<BatchEntry> {
    with_thread_pool(config.threads, || {
        genomes
            .par_iter()
            .map(|genome| {
                BatchEntry::from_result(genome.id.clone(), predict_genome(genome, catalog, config))
            })
            .collect()
    })
}

/// Load and predict genome FASTA files, one entry per path.
///
/// A file that cannot be parsed yields a `malformed_input` entry named after
/// the file stem.
#[must_use]
pub fn predict_files(
    paths: &[PathBuf],
    catalog: &AlleleCatalog,
    config: &PredictionConfig,
) -> Vec<BatchEntry> {
    with_thread_pool(config.threads, || {
        paths
            .par_iter()
            .map(|path| predict_file(path, catalog, config))
            .collect()
    })
}

fn predict_file(path: &Path, catalog: &AlleleCatalog, config: &PredictionConfig) -> BatchEntry {
    match parse_genome_file(path) {
        Ok(genome) => {
            let result = predict_genome(&genome, catalog, config);
            BatchEntry::from_result(genome.id, result)
        }
        Err(e) => BatchEntry::from_result(fasta_stem(path), Err(PredictionError::from(e))),
    }
}
