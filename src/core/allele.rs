use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::{AlleleId, ResistanceClass};
use crate::utils::validation::normalize_sequence;

/// A curated resistance-determinant allele from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAllele {
    /// Unique identifier (`family_allele`, suffixed `-N` for repeats)
    pub id: AlleleId,

    /// Gene family / locus name (e.g., "blaTEM")
    pub family: String,

    /// Allele name within the family (e.g., "1")
    pub allele: String,

    /// Sequence accession
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,

    /// Resistance classes conferred by this allele
    #[serde(default)]
    pub classes: BTreeSet<ResistanceClass>,

    /// Allele-specific minimum identity (fraction), overriding the global one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_identity: Option<f64>,

    /// Free-text note from the curated metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Uppercase nucleotide sequence
    #[serde(skip)]
    sequence: Vec<u8>,
}

impl ReferenceAllele {
    pub fn new(
        id: impl Into<String>,
        family: impl Into<String>,
        allele: impl Into<String>,
        sequence: &[u8],
    ) -> Self {
        Self {
            id: AlleleId::new(id),
            family: family.into(),
            allele: allele.into(),
            accession: None,
            classes: BTreeSet::new(),
            min_identity: None,
            note: None,
            sequence: normalize_sequence(sequence),
        }
    }

    #[must_use]
    pub fn with_classes(mut self, classes: impl IntoIterator<Item = ResistanceClass>) -> Self {
        self.classes.extend(classes);
        self
    }

    #[must_use]
    pub fn with_min_identity(mut self, min_identity: f64) -> Self {
        self.min_identity = Some(min_identity);
        self
    }

    #[must_use]
    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }

    pub(crate) fn set_sequence(&mut self, sequence: &[u8]) {
        self.sequence = normalize_sequence(sequence);
    }

    #[must_use]
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let allele = ReferenceAllele::new("blaTEM_1", "blaTEM", "1", b"atgagt")
            .with_classes([ResistanceClass::BetaLactam])
            .with_min_identity(0.98)
            .with_accession("AY458016");

        assert_eq!(allele.id.as_str(), "blaTEM_1");
        assert_eq!(allele.sequence(), b"ATGAGT");
        assert_eq!(allele.len(), 6);
        assert!(allele.classes.contains(&ResistanceClass::BetaLactam));
        assert_eq!(allele.min_identity, Some(0.98));
        assert_eq!(allele.accession.as_deref(), Some("AY458016"));
    }
}
