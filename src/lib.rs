//! # amr-predict
//!
//! A library for predicting antimicrobial resistance phenotypes from complete
//! bacterial genome assemblies.
//!
//! Resistance is usually carried by a small number of well-characterized
//! genes and chromosomal point mutations. `amr-predict` aligns a curated
//! catalog of resistance gene alleles against a genome, keeps the alignments
//! that pass identity and coverage thresholds, picks one allele per locus and
//! maps the winners to the antimicrobial classes they confer resistance to.
//!
//! ## Features
//!
//! - **Local alignment**: Affine-gap Smith-Waterman on both strands
//! - **Seed pre-filter**: Only alleles sharing a k-mer with the genome are aligned
//! - **Locus resolution**: Deterministic winner selection among overlapping hits
//! - **Point mutations**: Known resistance mutations in chromosomal genes
//! - **Caveats**: Timeouts, ambiguous bases and fragmented assemblies are reported
//! - **Batches**: Genomes are processed in parallel and fail independently
//!
//! ## Example
//!
//! ```rust,no_run
//! use amr_predict::{predict, PredictionConfig};
//! use amr_predict::parsing::database::load_database_dir;
//! use amr_predict::parsing::fasta::parse_genome_file;
//! use std::path::Path;
//!
//! // Load the curated database once
//! let catalog = load_database_dir(Path::new("resfinder_db")).unwrap();
//!
//! // Parse a complete assembly
//! let genome = parse_genome_file(Path::new("isolate.fasta")).unwrap();
//!
//! let report = predict(&genome.contigs[0], &catalog, &PredictionConfig::default()).unwrap();
//! for call in &report.calls {
//!     println!("{} {:.1}%", call.allele_id(), call.hit.identity * 100.0);
//! }
//! for class in report.profile.classes() {
//!     println!("resistant to {class}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Allele catalog storage and seed indexing
//! - [`core`]: Core data types for contigs, alleles, hits and reports
//! - [`matching`]: Alignment, filtering, locus resolution and phenotype mapping
//! - [`parsing`]: Parsers for FASTA, curated database directories and metadata
//! - [`pipeline`]: Configuration, per-genome prediction and batch runs
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod pipeline;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::AlleleCatalog;
pub use core::allele::ReferenceAllele;
pub use core::contig::{Contig, Genome};
pub use core::report::{Caveat, GenomeReport, ResistanceProfile, ResolvedCall};
pub use core::types::*;
pub use pipeline::config::PredictionConfig;
pub use pipeline::predict::{predict, predict_genome, PredictionError};
