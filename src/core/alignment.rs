use serde::{Deserialize, Serialize};

use crate::core::types::{AlleleId, Strand};

/// A single column of a pairwise alignment, from the query's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOp {
    /// Identical bases
    Match,
    /// Aligned but different bases
    Mismatch,
    /// Base present in the query but not the reference
    Insertion,
    /// Base present in the reference but not the query
    Deletion,
}

/// Best local alignment of one reference allele against one contig strand.
///
/// Coordinates are zero-based and half-open. Query coordinates always refer
/// to the forward strand of the contig; reference coordinates refer to the
/// allele as stored in the catalog, whatever the strand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub contig_id: String,
    pub query_start: usize,
    pub query_end: usize,
    pub strand: Strand,
    pub allele_id: AlleleId,
    pub reference_start: usize,
    pub reference_end: usize,
    pub reference_length: usize,

    /// Identical columns / alignment columns, in `[0, 1]`
    pub identity: f64,

    /// Aligned reference span / full allele length, in `[0, 1]`
    pub coverage: f64,

    /// Raw affine-gap alignment score
    pub score: i32,

    /// Number of identical columns
    pub matches: usize,

    /// Number of alignment columns, gaps included
    pub aligned_length: usize,

    /// Alignment columns in contig order (left to right on the forward strand)
    #[serde(skip)]
    pub edit_script: Vec<EditOp>,
}

impl Alignment {
    /// Length of the query range
    #[must_use]
    pub fn query_len(&self) -> usize {
        self.query_end - self.query_start
    }

    /// Number of query positions shared with another alignment on the same contig
    #[must_use]
    pub fn overlap_len(&self, other: &Alignment) -> usize {
        if self.contig_id != other.contig_id {
            return 0;
        }
        let start = self.query_start.max(other.query_start);
        let end = self.query_end.min(other.query_end);
        end.saturating_sub(start)
    }

    /// Whether the whole allele aligned without a single difference
    #[must_use]
    pub fn is_full_match(&self) -> bool {
        self.matches == self.reference_length && self.aligned_length == self.reference_length
    }
}

/// An alignment that passed the identity and coverage thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hit(pub Alignment);

impl Hit {
    #[must_use]
    pub fn into_alignment(self) -> Alignment {
        self.0
    }
}

impl std::ops::Deref for Hit {
    type Target = Alignment;

    fn deref(&self) -> &Alignment {
        &self.0
    }
}

#[cfg(test)]
pub(crate) fn test_alignment(
    allele: &str,
    contig: &str,
    query: (usize, usize),
    identity: f64,
    coverage: f64,
) -> Alignment {
    Alignment {
        contig_id: contig.to_string(),
        query_start: query.0,
        query_end: query.1,
        strand: Strand::Forward,
        allele_id: AlleleId::new(allele),
        reference_start: 0,
        reference_end: query.1 - query.0,
        reference_length: query.1 - query.0,
        identity,
        coverage,
        score: 0,
        matches: 0,
        aligned_length: query.1 - query.0,
        edit_script: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_len() {
        let a = test_alignment("a", "c1", (100, 200), 1.0, 1.0);
        let b = test_alignment("b", "c1", (150, 300), 1.0, 1.0);
        let c = test_alignment("c", "c1", (200, 300), 1.0, 1.0);
        let d = test_alignment("d", "c2", (100, 200), 1.0, 1.0);

        assert_eq!(a.query_len(), 100);
        assert_eq!(a.overlap_len(&b), 50);
        assert_eq!(b.overlap_len(&a), 50);
        assert_eq!(a.overlap_len(&c), 0);
        assert_eq!(a.overlap_len(&d), 0);
    }

    #[test]
    fn test_hit_derefs_to_alignment() {
        let hit = Hit(test_alignment("blaTEM_1", "c1", (0, 10), 0.9, 0.6));
        assert_eq!(hit.allele_id.as_str(), "blaTEM_1");
        assert_eq!(hit.query_len(), 10);
    }
}
