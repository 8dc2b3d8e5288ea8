//! Parser for FASTA files using noodles.
//!
//! Reads query assemblies and curated allele sequences. Supports both
//! uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna`, `.fsa`, `.ffn` (uncompressed)
//! - the same with `.gz` or `.bgz` appended (compressed)

use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use thiserror::Error;

use crate::catalog::store::CatalogError;
use crate::core::contig::{Contig, Genome};
use crate::utils::validation::{check_alphabet, check_record_limit, MAX_CONTIGS};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Record '{0}' has an empty sequence")]
    EmptyRecord(String),

    #[error("Record '{record}' has invalid nucleotide '{symbol}' at position {position}")]
    InvalidSequence {
        record: String,
        position: usize,
        symbol: char,
    },

    #[error("Unknown resistance class '{label}' on line {line}")]
    UnknownResistanceClass { label: String, line: usize },

    #[error("Too many records: {0} exceeds maximum allowed")]
    TooManyRecords(usize),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

const FASTA_EXTENSIONS: &[&str] = &["fa", "fasta", "fna", "fsa", "ffn"];

/// A raw FASTA record: identifier plus sequence bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Check if the path has a FASTA extension
pub fn is_fasta_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let trimmed = path_str
        .strip_suffix(".gz")
        .or_else(|| path_str.strip_suffix(".bgz"))
        .unwrap_or(&path_str);

    matches!(
        Path::new(trimmed)
            .extension()
            .and_then(OsStr::to_str),
        Some(ext) if FASTA_EXTENSIONS.contains(&ext)
    )
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// File name with compression and FASTA extensions removed
#[must_use]
pub fn fasta_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lowered = name.to_ascii_lowercase();

    let mut end = name.len();
    for suffix in [".gz", ".bgz"] {
        if lowered[..end].ends_with(suffix) {
            end -= suffix.len();
            break;
        }
    }
    for ext in FASTA_EXTENSIONS {
        let suffix = format!(".{ext}");
        if lowered[..end].ends_with(&suffix) {
            end -= suffix.len();
            break;
        }
    }
    name[..end].to_string()
}

/// Read all records of a FASTA file, decompressing if needed.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles`
/// if parsing fails, or `ParseError::TooManyRecords` if `limit` is exceeded.
pub fn read_fasta_file(path: &Path, limit: usize) -> Result<Vec<FastaRecord>, ParseError> {
    let file = std::fs::File::open(path)?;
    if is_gzipped(path) {
        read_fasta(BufReader::new(MultiGzDecoder::new(file)), limit)
    } else {
        read_fasta(BufReader::new(file), limit)
    }
}

/// Read all records from any buffered FASTA source.
///
/// # Errors
///
/// Returns `ParseError::Noodles` if parsing fails, or
/// `ParseError::TooManyRecords` if `limit` is exceeded.
pub fn read_fasta<R: BufRead>(reader: R, limit: usize) -> Result<Vec<FastaRecord>, ParseError> {
    let mut fasta_reader = fasta::io::Reader::new(reader);
    let mut records = Vec::new();

    for result in fasta_reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        if check_record_limit(records.len(), limit).is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }

        records.push(FastaRecord {
            name: String::from_utf8_lossy(record.name()).to_string(),
            sequence: record.sequence().as_ref().to_vec(),
        });
    }

    Ok(records)
}

/// Validate a raw record and turn it into a contig.
///
/// # Errors
///
/// Returns `ParseError::EmptyRecord` for empty sequences and
/// `ParseError::InvalidSequence` for symbols outside the nucleotide alphabet.
pub fn record_to_contig(record: &FastaRecord) -> Result<Contig, ParseError> {
    if record.sequence.is_empty() {
        return Err(ParseError::EmptyRecord(record.name.clone()));
    }
    let report = check_alphabet(&record.sequence).map_err(|(position, byte)| {
        ParseError::InvalidSequence {
            record: record.name.clone(),
            position,
            symbol: char::from(byte),
        }
    })?;

    Ok(Contig::new(record.name.clone(), &record.sequence).with_ambiguous_bases(report.ambiguous))
}

/// Build a genome from parsed records
fn records_to_genome(id: &str, records: &[FastaRecord]) -> Result<Genome, ParseError> {
    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }
    let contigs = records
        .iter()
        .map(record_to_contig)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Genome::new(id, contigs))
}

/// Parse a genome assembly FASTA file.
///
/// The genome is named after the file stem. Every record is validated; the
/// single-contig policy is applied later by the pipeline.
///
/// # Errors
///
/// Returns a `ParseError` if the file cannot be read or parsed, is empty, or
/// contains an empty or invalid record.
pub fn parse_genome_file(path: &Path) -> Result<Genome, ParseError> {
    let records = read_fasta_file(path, MAX_CONTIGS)?;
    let genome = records_to_genome(&fasta_stem(path), &records)?;
    Ok(genome.with_source(path.display().to_string()))
}

/// Parse a genome from in-memory FASTA text.
///
/// # Errors
///
/// Returns a `ParseError` if the text is not valid FASTA, is empty, or
/// contains an empty or invalid record.
pub fn parse_genome_text(id: &str, text: &[u8]) -> Result<Genome, ParseError> {
    let records = read_fasta(text, MAX_CONTIGS)?;
    records_to_genome(id, &records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_is_fasta_file() {
        assert!(is_fasta_file(Path::new("test.fa")));
        assert!(is_fasta_file(Path::new("test.fasta")));
        assert!(is_fasta_file(Path::new("test.fna")));
        assert!(is_fasta_file(Path::new("beta-lactam.fsa")));
        assert!(is_fasta_file(Path::new("test.fa.gz")));
        assert!(is_fasta_file(Path::new("test.fna.bgz")));
        assert!(is_fasta_file(Path::new("/path/to/Genome.FASTA")));

        assert!(!is_fasta_file(Path::new("notes.txt")));
        assert!(!is_fasta_file(Path::new("test.gz")));
        assert!(!is_fasta_file(Path::new("test.fai")));
    }

    #[test]
    fn test_fasta_stem() {
        assert_eq!(fasta_stem(Path::new("/data/SRR123.fasta")), "SRR123");
        assert_eq!(fasta_stem(Path::new("SRR123.fna.gz")), "SRR123");
        assert_eq!(fasta_stem(Path::new("sample.v2.FA")), "sample.v2");
        assert_eq!(fasta_stem(Path::new("noext")), "noext");
    }

    #[test]
    fn test_parse_genome_file() {
        let fasta_content = b">chromosome description\nACGTACGT\nacgt\n>plasmid\nGGGN\n";

        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let genome = parse_genome_file(temp.path()).unwrap();
        assert_eq!(genome.contigs.len(), 2);
        assert_eq!(genome.contigs[0].id, "chromosome");
        assert_eq!(genome.contigs[0].length, 12);
        assert_eq!(genome.contigs[0].sequence(), b"ACGTACGTACGT");
        assert_eq!(genome.contigs[1].ambiguous_bases, 1);
        assert!(genome.source.is_some());
    }

    #[test]
    fn test_parse_gzipped_genome_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let temp = NamedTempFile::with_suffix(".fasta.gz").unwrap();
        let mut encoder = GzEncoder::new(temp.reopen().unwrap(), Compression::default());
        encoder.write_all(b">contig_1\nACGTACGT\n").unwrap();
        encoder.finish().unwrap();

        let genome = parse_genome_file(temp.path()).unwrap();
        assert_eq!(genome.contigs.len(), 1);
        assert_eq!(genome.contigs[0].length, 8);
    }

    #[test]
    fn test_parse_empty_fasta() {
        let result = parse_genome_text("empty", b"");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_empty_record() {
        let result = parse_genome_text("g", b">empty\n>full\nACGT\n");
        assert!(matches!(result, Err(ParseError::EmptyRecord(name)) if name == "empty"));
    }

    #[test]
    fn test_parse_invalid_symbol() {
        let result = parse_genome_text("g", b">c\nACGT*ACGT\n");
        match result {
            Err(ParseError::InvalidSequence {
                record,
                position,
                symbol,
            }) => {
                assert_eq!(record, "c");
                assert_eq!(position, 4);
                assert_eq!(symbol, '*');
            }
            other => panic!("Expected InvalidSequence, got {other:?}"),
        }
    }

    #[test]
    fn test_record_limit() {
        let result = read_fasta(&b">a\nA\n>b\nC\n>c\nG\n"[..], 2);
        assert!(matches!(result, Err(ParseError::TooManyRecords(2))));
    }
}
