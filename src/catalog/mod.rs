//! Resistance determinant catalog storage and indexing.
//!
//! The catalog holds every curated reference allele with its gene family,
//! resistance classes and optional identity override, plus any point mutation
//! targets. It is constructed once per run, never mutated afterwards, and
//! passed by reference into every genome pipeline.
//!
//! ## Example
//!
//! ```rust,no_run
//! use amr_predict::parsing::database::load_database_dir;
//! use amr_predict::core::types::AlleleId;
//! use std::path::Path;
//!
//! // Load a curated database directory (FASTA files + notes.txt)
//! let catalog = load_database_dir(Path::new("resfinder_db")).unwrap();
//!
//! // List all gene families
//! for family in catalog.families() {
//!     println!("{family}");
//! }
//!
//! // Get a specific allele
//! let tem1 = catalog.get(&AlleleId::new("blaTEM-1_1"));
//! ```
//!
//! ## Exported Catalogs
//!
//! A loaded catalog can be exported to JSON and reloaded later:
//!
//! ```rust,no_run
//! use amr_predict::AlleleCatalog;
//! use std::path::Path;
//!
//! let catalog = AlleleCatalog::load_from_file(Path::new("catalog.json")).unwrap();
//! let json = catalog.to_json().unwrap();
//! ```

pub mod index;
pub mod store;
