//! Command-line interface for amr-predict.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **predict**: Predict resistance phenotypes for one or more genome assemblies
//! - **catalog**: List, show, or export the loaded allele catalog
//!
//! ## Usage
//!
//! ```text
//! # Predict from a curated database directory
//! amr-predict predict --database resfinder_db isolate1.fasta isolate2.fasta
//!
//! # Stricter thresholds from the command line
//! amr-predict predict --database resfinder_db --min-identity 0.98 isolate1.fasta
//!
//! # One row per call instead of JSON
//! amr-predict predict --database resfinder_db --format tsv isolate1.fasta
//!
//! # Export the catalog for faster reloads
//! amr-predict catalog export --database resfinder_db catalog.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::catalog::store::AlleleCatalog;
use crate::parsing::database::load_database_dir;

pub mod catalog;
pub mod predict;

#[derive(Parser)]
#[command(name = "amr-predict")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Predict antimicrobial resistance phenotypes from bacterial genome assemblies")]
#[command(
    long_about = "amr-predict aligns a curated catalog of resistance gene alleles against complete bacterial genome assemblies.\n\nFor each genome it reports:\n- The best allele at every resistance locus, with identity and coverage\n- Known resistance point mutations in chromosomal genes\n- The antimicrobial classes the genome is predicted to resist"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict resistance phenotypes for genome assemblies
    Predict(predict::PredictArgs),

    /// Inspect the allele catalog
    Catalog(catalog::CatalogArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Tsv,
}

/// Where to load the allele catalog from
#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct CatalogSource {
    /// Curated database directory (FASTA files plus notes.txt)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Catalog previously exported with `catalog export`
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

impl CatalogSource {
    /// Load the catalog from whichever source was given
    ///
    /// # Errors
    ///
    /// Returns an error if the database directory or catalog file cannot be
    /// loaded.
    pub fn load(&self, verbose: bool) -> anyhow::Result<AlleleCatalog> {
        let catalog = match (&self.database, &self.catalog) {
            (Some(dir), _) => load_database(dir)?,
            (None, Some(path)) => AlleleCatalog::load_from_file(path)
                .with_context(|| format!("Failed to load catalog {}", path.display()))?,
            (None, None) => anyhow::bail!("Either --database or --catalog is required"),
        };

        if verbose {
            eprintln!(
                "Loaded catalog with {} alleles in {} gene families ({} mutation targets)",
                catalog.len(),
                catalog.families().len(),
                catalog.mutation_target_count()
            );
        }
        if catalog.is_empty() {
            eprintln!("Warning: Catalog is empty, no alleles to match against.");
        }
        Ok(catalog)
    }
}

fn load_database(dir: &Path) -> anyhow::Result<AlleleCatalog> {
    load_database_dir(dir).with_context(|| format!("Failed to load database {}", dir.display()))
}
