//! Parser for the `notes.txt` metadata file of a curated database.
//!
//! Each non-comment line describes one gene family:
//!
//! ```text
//! blaTEM:Beta-lactam resistance:Alternate name TEM
//! tetA:Tetracycline resistance::95
//! ```
//!
//! Fields are the family, a list of resistance classes separated by commas
//! or "and" (for example "Fluoroquinolone and aminoglycoside resistance"), a
//! free-text note and an optional family-wide minimum identity (a fraction,
//! or a percentage when above 1).

use std::collections::{BTreeSet, HashMap};
use std::io::BufRead;
use std::path::Path;

use crate::core::types::ResistanceClass;

use super::fasta::ParseError;

/// Metadata for one gene family
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FamilyNote {
    pub family: String,
    pub classes: BTreeSet<ResistanceClass>,
    pub note: Option<String>,
    pub min_identity: Option<f64>,
}

/// Parse a resistance class list, split on commas and "and".
///
/// # Errors
///
/// Returns `ParseError::UnknownResistanceClass` for any label outside the
/// fixed taxonomy.
pub fn parse_class_list(field: &str, line: usize) -> Result<BTreeSet<ResistanceClass>, ParseError> {
    ResistanceClass::parse_list(field)
        .map(|classes| classes.into_iter().collect())
        .map_err(|label| ParseError::UnknownResistanceClass { label, line })
}

fn parse_identity(field: &str, line: usize) -> Result<Option<f64>, ParseError> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    let value: f64 = field.parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid minimum identity '{field}' on line {line}"))
    })?;
    Ok(Some(if value > 1.0 { value / 100.0 } else { value }))
}

/// Parse a single notes line (1-based `line` number used in errors)
///
/// # Errors
///
/// Returns a `ParseError` for unknown classes or an unparseable identity.
pub fn parse_note_line(text: &str, line: usize) -> Result<FamilyNote, ParseError> {
    let mut parts = text.trim().splitn(4, ':').map(str::trim);
    let family = parts.next().unwrap_or_default().to_string();
    let classes = parse_class_list(parts.next().unwrap_or_default(), line)?;
    let note = parts
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let min_identity = parts
        .next()
        .map(|field| parse_identity(field, line))
        .transpose()?
        .flatten();

    Ok(FamilyNote {
        family,
        classes,
        note,
        min_identity,
    })
}

/// Read notes keyed by family; later lines for a family replace earlier ones.
///
/// # Errors
///
/// Returns a `ParseError` if reading fails or any line is malformed.
pub fn read_notes<R: BufRead>(reader: R) -> Result<HashMap<String, FamilyNote>, ParseError> {
    let mut notes = HashMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let note = parse_note_line(trimmed, idx + 1)?;
        notes.insert(note.family.clone(), note);
    }
    Ok(notes)
}

/// Read a notes file from disk.
///
/// # Errors
///
/// Returns a `ParseError` if the file cannot be opened or is malformed.
pub fn read_notes_file(path: &Path) -> Result<HashMap<String, FamilyNote>, ParseError> {
    let file = std::fs::File::open(path)?;
    read_notes(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_line() {
        let note = parse_note_line("blaTEM:Beta-lactam resistance:Alternate name TEM", 1).unwrap();
        assert_eq!(note.family, "blaTEM");
        assert_eq!(note.classes.len(), 1);
        assert!(note.classes.contains(&ResistanceClass::BetaLactam));
        assert_eq!(note.note.as_deref(), Some("Alternate name TEM"));
        assert!(note.min_identity.is_none());
    }

    #[test]
    fn test_multiple_classes() {
        let note = parse_note_line("aac(6')-Ib-cr:Aminoglycoside, Fluoroquinolone resistance", 1)
            .unwrap();
        assert_eq!(
            note.classes.into_iter().collect::<Vec<_>>(),
            vec![ResistanceClass::Aminoglycoside, ResistanceClass::Quinolone]
        );
    }

    #[test]
    fn test_lincosamide_and_compound_classes() {
        let text = "lnu(A):Lincosamide resistance:\n\
                    aac(6')-Ib-cr:Fluoroquinolone and aminoglycoside resistance:\n\
                    erm(B):Macrolide, Lincosamide and Streptogramin B resistance:\n";
        let notes = read_notes(text.as_bytes()).unwrap();
        assert_eq!(notes.len(), 3);
        assert_eq!(
            notes["lnu(A)"].classes.iter().copied().collect::<Vec<_>>(),
            vec![ResistanceClass::Lincosamide]
        );
        assert_eq!(
            notes["aac(6')-Ib-cr"].classes.iter().copied().collect::<Vec<_>>(),
            vec![ResistanceClass::Aminoglycoside, ResistanceClass::Quinolone]
        );
        assert_eq!(
            notes["erm(B)"].classes.iter().copied().collect::<Vec<_>>(),
            vec![
                ResistanceClass::Lincosamide,
                ResistanceClass::Macrolide,
                ResistanceClass::Streptogramin
            ]
        );
    }

    #[test]
    fn test_identity_field() {
        let note = parse_note_line("tetA:Tetracycline resistance::95", 1).unwrap();
        assert!((note.min_identity.unwrap() - 0.95).abs() < 1e-9);

        let note = parse_note_line("tetB:Tetracycline resistance::0.8", 1).unwrap();
        assert_eq!(note.min_identity, Some(0.8));

        let result = parse_note_line("tetC:Tetracycline resistance::high", 3);
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_unknown_class_reports_line() {
        let text = "# comment\n\nblaTEM:Beta-lactam resistance:\nfoo:Unobtainium resistance:\n";
        match read_notes(text.as_bytes()) {
            Err(ParseError::UnknownResistanceClass { label, line }) => {
                assert_eq!(label, "Unobtainium resistance");
                assert_eq!(line, 4);
            }
            other => panic!("Expected UnknownResistanceClass, got {other:?}"),
        }
    }

    #[test]
    fn test_read_notes_skips_comments() {
        let text = "# family:classes:note\nsul1:Sulphonamide resistance:\n\ndfrA1:Trimethoprim resistance:\n";
        let notes = read_notes(text.as_bytes()).unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes["sul1"].classes.contains(&ResistanceClass::Sulphonamide));
    }
}
