//! Parsers for genome assemblies and curated resistance databases.
//!
//! This module provides parsers for:
//!
//! - **FASTA files**: Query assemblies and allele sequences (plain or gzip)
//! - **Allele headers**: `family:allele:accession:other` definition lines
//! - **notes.txt**: Per-family resistance classes and identity overrides
//! - **Mutation tables**: `resistens-overview.txt` and `RNA_genes.txt`
//! - **Database directories**: All of the above combined into a catalog
//!
//! ## Example
//!
//! ```rust,no_run
//! use amr_predict::parsing::database::load_database_dir;
//! use amr_predict::parsing::fasta::parse_genome_file;
//! use std::path::Path;
//!
//! let catalog = load_database_dir(Path::new("resfinder_db")).unwrap();
//! let genome = parse_genome_file(Path::new("sample.fasta")).unwrap();
//! println!("{} alleles, {} contigs", catalog.len(), genome.contigs.len());
//! ```
//!
//! ## Allele Identifiers
//!
//! | Header | Allele id |
//! |--------|-----------|
//! | `blaTEM:1:AY458016` | `blaTEM_1` |
//! | `blaTEM:1:AY458017` (repeat) | `blaTEM_1-1` |
//! | `gyrA` | `gyrA` |

pub mod database;
pub mod fasta;
pub mod header;
pub mod notes;
pub mod overview;
