//! End-to-end prediction: configuration, per-genome pipeline and batches.
//!
//! A genome flows through the matching stages in order:
//!
//! ```text
//! contig(s) -> AligningMatcher -> HitFilter -> OverlapResolver
//!           -> PhenotypeMapper (+ point mutations) -> GenomeReport
//! ```
//!
//! The catalog and config are shared read-only; every genome is independent,
//! so batches fan out over a rayon pool and a failing genome only affects its
//! own entry.

pub mod batch;
pub mod config;
pub mod predict;

pub use batch::{predict_batch, predict_files, BatchEntry, BatchOutcome, ErrorMarker};
pub use config::{ConfigError, MultiContigPolicy, PredictionConfig};
pub use predict::{assemble, predict, predict_genome, PredictionError};
