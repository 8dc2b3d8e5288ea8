//! Allele alignment, hit filtering, locus resolution and phenotype mapping.
//!
//! This module provides the per-genome matching stages:
//!
//! - [`AligningMatcher`]: Best local alignment of each allele strand per contig
//! - [`HitFilter`]: Identity and coverage thresholds
//! - [`OverlapResolver`]: One winning hit per locus
//! - [`PhenotypeMapper`]: Resistance classes of the resolved calls
//! - [`mutation`]: Known resistance point mutations inside resolved calls
//!
//! ## Alignment
//!
//! Alignment is affine-gap Smith-Waterman with BLASTN nucleotide scoring by
//! default (reward 2, penalty -3, gap open 5, gap extend 2). Reverse-strand
//! matches are found by aligning the reverse complement of the allele, so
//! query coordinates always refer to the forward strand of the contig. A
//! k-mer seed index restricts each allele to the contig windows around its
//! seeded diagonals.
//!
//! ## Resolution
//!
//! Hits sharing more than the configured fraction of the shorter query range
//! form a locus. The winner has the highest identity, then the highest
//! coverage, then the lexicographically smallest allele id.
//!
//! ## Example
//!
//! ```rust,no_run
//! use amr_predict::matching::{AligningMatcher, HitFilter, OverlapResolver, PhenotypeMapper};
//! use amr_predict::parsing::database::load_database_dir;
//! use amr_predict::parsing::fasta::parse_genome_file;
//! use amr_predict::PredictionConfig;
//! use std::path::Path;
//!
//! let catalog = load_database_dir(Path::new("resfinder_db")).unwrap();
//! let genome = parse_genome_file(Path::new("sample.fasta")).unwrap();
//! let config = PredictionConfig::default();
//!
//! let outcome = AligningMatcher::new(&catalog, &config)
//!     .find_alignments(&genome.contigs[0])
//!     .unwrap();
//! let hits = HitFilter::from_config(&catalog, &config).filter(outcome.alignments);
//! let calls = OverlapResolver::from_config(&config).resolve(hits);
//! let profile = PhenotypeMapper::new(&catalog).map_to_phenotypes(&calls).unwrap();
//!
//! for class in profile.classes() {
//!     println!("{class}: {:?}", profile.evidence(class).collect::<Vec<_>>());
//! }
//! ```

pub mod aligner;
pub mod engine;
pub mod filter;
pub mod mutation;
pub mod overlap;
pub mod phenotype;
pub mod scoring;

pub use aligner::AlignmentError;
pub use engine::{AligningMatcher, MatchOutcome};
pub use filter::HitFilter;
pub use overlap::OverlapResolver;
pub use phenotype::{PhenotypeMapper, UnmappedAlleleError};
pub use scoring::ScoringScheme;
