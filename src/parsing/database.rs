//! Loader for curated resistance database directories.
//!
//! A database directory holds one or more allele FASTA files, an optional
//! `notes.txt` with per-family resistance classes, and optional point
//! mutation tables. Files are read in sorted name order so allele ids and
//! catalog order are stable between runs.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::catalog::store::AlleleCatalog;
use crate::core::allele::ReferenceAllele;
use crate::utils::validation::MAX_ALLELES;

use super::fasta::{is_fasta_file, read_fasta_file, ParseError};
use super::header::{parse_allele_header, AlleleIdAssigner};
use super::notes::read_notes_file;
use super::overview::load_mutation_targets;

/// Notes file name inside a database directory
pub const NOTES_FILE: &str = "notes.txt";

/// FASTA files of a database directory, sorted by name
fn fasta_files(dir: &Path) -> Result<Vec<PathBuf>, ParseError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_fasta_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load a curated database directory into a catalog.
///
/// # Errors
///
/// Returns a `ParseError` if the directory cannot be read, contains no
/// FASTA files, or any file is malformed. Allele validation failures
/// surface as `ParseError::Catalog`.
pub fn load_database_dir(dir: &Path) -> Result<AlleleCatalog, ParseError> {
    if !dir.is_dir() {
        return Err(ParseError::InvalidFormat(format!(
            "Database path {} is not a directory",
            dir.display()
        )));
    }

    let files = fasta_files(dir)?;
    if files.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "No FASTA files found in {}",
            dir.display()
        )));
    }

    let notes_path = dir.join(NOTES_FILE);
    let notes = if notes_path.exists() {
        read_notes_file(&notes_path)?
    } else {
        warn!("No {} in {}; alleles will carry no resistance classes", NOTES_FILE, dir.display());
        Default::default()
    };

    let mut catalog = AlleleCatalog::new();
    let mut ids = AlleleIdAssigner::new();

    for path in &files {
        let records = read_fasta_file(path, MAX_ALLELES)?;
        debug!("Read {} alleles from {}", records.len(), path.display());

        for record in records {
            let header = parse_allele_header(&record.name);
            let id = ids.assign(&header.base_id());
            let mut allele =
                ReferenceAllele::new(id, header.family, header.allele, &record.sequence);
            if let Some(accession) = header.accession {
                allele = allele.with_accession(accession);
            }
            if let Some(note) = notes.get(&allele.family) {
                allele = allele.with_classes(note.classes.iter().copied());
                allele.note.clone_from(&note.note);
                if let Some(min_identity) = note.min_identity {
                    allele = allele.with_min_identity(min_identity);
                }
            }
            catalog.add_allele(allele)?;
        }
    }

    catalog.add_mutation_targets(load_mutation_targets(dir)?);

    debug!(
        "Loaded {} alleles in {} families ({} mutation targets) from {}",
        catalog.len(),
        catalog.families().len(),
        catalog.mutation_target_count(),
        dir.display()
    );
    Ok(catalog)
}
