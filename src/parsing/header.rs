//! Parser for curated allele FASTA headers.
//!
//! Headers have the form `family:allele:accession:other`, colon separated,
//! with trailing fields optional. A header without colons is taken as the
//! family name alone.

use std::collections::HashMap;

/// Fields of an allele header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlleleHeader {
    pub family: String,
    pub allele: String,
    pub accession: Option<String>,
    pub other: Option<String>,
}

impl AlleleHeader {
    /// Base identifier before de-duplication: `family_allele`, or `family`
    /// when the allele field is empty
    #[must_use]
    pub fn base_id(&self) -> String {
        if self.allele.is_empty() {
            self.family.clone()
        } else {
            format!("{}_{}", self.family, self.allele)
        }
    }
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Parse an allele header
#[must_use]
pub fn parse_allele_header(header: &str) -> AlleleHeader {
    let mut parts = header.trim().splitn(4, ':').map(str::trim);

    AlleleHeader {
        family: parts.next().unwrap_or_default().to_string(),
        allele: parts.next().unwrap_or_default().to_string(),
        accession: non_empty(parts.next()),
        other: non_empty(parts.next()),
    }
}

/// Hands out unique allele ids.
///
/// The first occurrence of a base id is used as-is; repeats get `-1`, `-2`,
/// ... appended in the order they are seen.
#[derive(Debug, Default)]
pub struct AlleleIdAssigner {
    seen: HashMap<String, usize>,
}

impl AlleleIdAssigner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, base_id: &str) -> String {
        let count = self.seen.entry(base_id.to_string()).or_insert(0);
        let id = if *count == 0 {
            base_id.to_string()
        } else {
            format!("{base_id}-{count}")
        };
        *count += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let header = parse_allele_header("blaTEM:1:AY458016:TEM-1 broad spectrum");
        assert_eq!(header.family, "blaTEM");
        assert_eq!(header.allele, "1");
        assert_eq!(header.accession.as_deref(), Some("AY458016"));
        assert_eq!(header.other.as_deref(), Some("TEM-1 broad spectrum"));
        assert_eq!(header.base_id(), "blaTEM_1");
    }

    #[test]
    fn test_parse_partial_header() {
        let header = parse_allele_header("tetA:3");
        assert_eq!(header.family, "tetA");
        assert_eq!(header.allele, "3");
        assert!(header.accession.is_none());
        assert!(header.other.is_none());

        let header = parse_allele_header("gyrA");
        assert_eq!(header.family, "gyrA");
        assert_eq!(header.base_id(), "gyrA");
    }

    #[test]
    fn test_other_field_keeps_colons() {
        let header = parse_allele_header("sul1:1::note: with colon");
        assert!(header.accession.is_none());
        assert_eq!(header.other.as_deref(), Some("note: with colon"));
    }

    #[test]
    fn test_assigner_suffixes_repeats() {
        let mut assigner = AlleleIdAssigner::new();
        assert_eq!(assigner.assign("blaTEM_1"), "blaTEM_1");
        assert_eq!(assigner.assign("blaTEM_1"), "blaTEM_1-1");
        assert_eq!(assigner.assign("tetA_1"), "tetA_1");
        assert_eq!(assigner.assign("blaTEM_1"), "blaTEM_1-2");
    }
}
