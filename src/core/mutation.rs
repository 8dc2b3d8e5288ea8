use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::types::ResistanceClass;

/// Length of the promoter region that negative target positions count back from
pub const PROMOTER_LENGTH: i64 = 53;

/// A known resistance-conferring point mutation in a chromosomal gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationTarget {
    /// Gene family the target lives in (matches `ReferenceAllele::family`)
    pub gene_id: String,

    /// Display name of the gene
    pub gene_name: String,

    /// Number of mutations needed to confer resistance
    pub mutations_needed: u32,

    /// 1-based codon index for coding genes, 1-based nucleotide position
    /// otherwise (negative positions are promoter offsets)
    pub position: i64,

    /// Accepted wild-type codons (or nucleotides)
    pub reference_codons: Vec<String>,

    /// Wild-type residues
    pub reference_residues: Vec<String>,

    /// Residues known to confer resistance
    pub resistance_residues: Vec<String>,

    /// Resistance classes conferred by the mutation
    pub classes: BTreeSet<ResistanceClass>,

    /// Literature references
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pubmed_ids: Vec<String>,

    /// Whether the gene is protein coding (codon-level target)
    pub coding: bool,
}

impl MutationTarget {
    /// Zero-based range of reference nucleotides this target inspects.
    ///
    /// Returns `None` for positions that cannot exist (zero, or a promoter
    /// offset before the start of the promoter).
    #[must_use]
    pub fn reference_range(&self) -> Option<(usize, usize)> {
        if self.coding {
            let codon = usize::try_from(self.position).ok()?.checked_sub(1)?;
            Some((codon * 3, codon * 3 + 3))
        } else {
            let start = if self.position < 0 {
                self.position + PROMOTER_LENGTH
            } else {
                self.position - 1
            };
            let start = usize::try_from(start).ok()?;
            Some((start, start + 1))
        }
    }

    /// Label used in reports, e.g. `gyrA@83`
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}@{}", self.gene_id, self.position)
    }
}

#[cfg(test)]
pub(crate) fn test_target(gene: &str, position: i64, coding: bool) -> MutationTarget {
    MutationTarget {
        gene_id: gene.to_string(),
        gene_name: gene.to_string(),
        mutations_needed: 1,
        position,
        reference_codons: Vec::new(),
        reference_residues: Vec::new(),
        resistance_residues: Vec::new(),
        classes: BTreeSet::new(),
        pubmed_ids: Vec::new(),
        coding,
    }
}
