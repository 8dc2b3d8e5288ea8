//! Parser for point mutation tables.
//!
//! `resistens-overview.txt` is tab separated with the columns gene id, gene
//! name, mutations needed, position, reference codons, reference residues,
//! resistance residues, resistance classes and PubMed ids. List columns are
//! comma separated. `RNA_genes.txt` lists one non-coding gene id per line.

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use crate::core::mutation::MutationTarget;

use super::fasta::ParseError;
use super::notes::parse_class_list;

/// File names inside a database directory
pub const OVERVIEW_FILE: &str = "resistens-overview.txt";
pub const RNA_GENES_FILE: &str = "RNA_genes.txt";

const MIN_COLUMNS: usize = 8;

fn split_list(field: &str) -> Vec<String> {
    field
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Read the set of non-coding gene ids.
///
/// # Errors
///
/// Returns `ParseError::Io` if reading fails.
pub fn read_rna_genes<R: BufRead>(reader: R) -> Result<HashSet<String>, ParseError> {
    let mut genes = HashSet::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() && !trimmed.starts_with('#') {
            genes.insert(trimmed.to_string());
        }
    }
    Ok(genes)
}

/// Whether a gene is read at codon level. RNA genes and promoters are not.
#[must_use]
pub fn is_coding_gene(gene_id: &str, rna_genes: &HashSet<String>) -> bool {
    !rna_genes.contains(gene_id) && !gene_id.to_lowercase().contains("promoter")
}

fn parse_number<T: std::str::FromStr>(field: &str, column: &str, line: usize) -> Result<T, ParseError> {
    field.trim().parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid {column} '{}' on line {line}", field.trim()))
    })
}

/// Parse one overview row (1-based `line` number used in errors).
///
/// # Errors
///
/// Returns a `ParseError` for missing columns, non-numeric counts or
/// positions, and unknown resistance classes.
pub fn parse_overview_line(
    text: &str,
    line: usize,
    rna_genes: &HashSet<String>,
) -> Result<MutationTarget, ParseError> {
    let parts: Vec<&str> = text.split('\t').collect();
    if parts.len() < MIN_COLUMNS {
        return Err(ParseError::InvalidFormat(format!(
            "Expected at least {MIN_COLUMNS} tab separated columns on line {line}, found {}",
            parts.len()
        )));
    }

    let gene_id = parts[0].trim().to_string();
    let coding = is_coding_gene(&gene_id, rna_genes);

    Ok(MutationTarget {
        gene_name: parts[1].trim().to_string(),
        mutations_needed: parse_number(parts[2], "mutation count", line)?,
        position: parse_number(parts[3], "position", line)?,
        reference_codons: split_list(parts[4]),
        reference_residues: split_list(parts[5]),
        resistance_residues: split_list(parts[6]),
        classes: parse_class_list(parts[7], line)?,
        pubmed_ids: parts
            .get(8)
            .map(|field| {
                field
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        coding,
        gene_id,
    })
}

/// Read every mutation target from an overview table.
///
/// # Errors
///
/// Returns a `ParseError` if reading fails or any row is malformed.
pub fn read_overview<R: BufRead>(
    reader: R,
    rna_genes: &HashSet<String>,
) -> Result<Vec<MutationTarget>, ParseError> {
    let mut targets = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        targets.push(parse_overview_line(trimmed, idx + 1, rna_genes)?);
    }
    Ok(targets)
}

/// Load mutation targets from a database directory.
///
/// Returns an empty list when the directory has no overview table.
///
/// # Errors
///
/// Returns a `ParseError` if either file exists but cannot be read or parsed.
pub fn load_mutation_targets(dir: &Path) -> Result<Vec<MutationTarget>, ParseError> {
    let overview_path = dir.join(OVERVIEW_FILE);
    if !overview_path.exists() {
        return Ok(Vec::new());
    }

    let rna_path = dir.join(RNA_GENES_FILE);
    let rna_genes = if rna_path.exists() {
        read_rna_genes(std::io::BufReader::new(std::fs::File::open(rna_path)?))?
    } else {
        HashSet::new()
    };

    let file = std::fs::File::open(overview_path)?;
    read_overview(std::io::BufReader::new(file), &rna_genes)
}
