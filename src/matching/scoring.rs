use serde::{Deserialize, Serialize};

use crate::core::alignment::EditOp;
use crate::utils::nucleotide::is_identity;

/// Safely convert usize to f64 for fraction calculations
///
/// Sequence and alignment lengths stay far below the f64 mantissa limit, so
/// the precision loss clippy warns about cannot occur in practice.
#[inline]
pub(crate) fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Nucleotide scoring parameters for affine-gap local alignment.
///
/// A gap of length `k` costs `gap_open + k * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringScheme {
    /// Reward for identical bases
    pub match_score: i32,
    /// Score for differing bases (negative)
    pub mismatch_score: i32,
    /// Cost to open a gap (positive)
    pub gap_open: i32,
    /// Cost per gap position (positive)
    pub gap_extend: i32,
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self {
            match_score: 2,     // BLASTN reward
            mismatch_score: -3, // BLASTN penalty
            gap_open: 5,
            gap_extend: 2,
        }
    }
}

impl ScoringScheme {
    /// Score of aligning two bases. Ambiguity codes never score as a match.
    #[inline]
    #[must_use]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        if is_identity(a, b) {
            self.match_score
        } else {
            self.mismatch_score
        }
    }

    /// Cost of the first position of a gap
    #[inline]
    #[must_use]
    pub fn gap_first(&self) -> i32 {
        self.gap_open + self.gap_extend
    }

    /// Check parameters for sanity, returning a description of the first problem
    #[must_use]
    pub fn check(&self) -> Option<String> {
        if self.match_score <= 0 {
            return Some(format!("match score must be positive, got {}", self.match_score));
        }
        if self.mismatch_score >= 0 {
            return Some(format!(
                "mismatch score must be negative, got {}",
                self.mismatch_score
            ));
        }
        if self.gap_open < 0 || self.gap_extend < 0 {
            return Some(format!(
                "gap costs must not be negative, got open {} extend {}",
                self.gap_open, self.gap_extend
            ));
        }
        None
    }

    /// Score an edit script against the sequences it aligns
    #[must_use]
    pub fn score_ops(&self, ops: &[EditOp]) -> i32 {
        let mut score = 0;
        let mut previous = None;
        for &op in ops {
            score += match op {
                EditOp::Match => self.match_score,
                EditOp::Mismatch => self.mismatch_score,
                EditOp::Insertion | EditOp::Deletion if previous == Some(op) => -self.gap_extend,
                EditOp::Insertion | EditOp::Deletion => -self.gap_first(),
            };
            previous = Some(op);
        }
        score
    }
}

/// Column statistics of an edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnCounts {
    pub matches: usize,
    pub mismatches: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl ColumnCounts {
    #[must_use]
    pub fn from_ops(ops: &[EditOp]) -> Self {
        let mut counts = Self::default();
        for op in ops {
            match op {
                EditOp::Match => counts.matches += 1,
                EditOp::Mismatch => counts.mismatches += 1,
                EditOp::Insertion => counts.insertions += 1,
                EditOp::Deletion => counts.deletions += 1,
            }
        }
        counts
    }

    /// Total alignment columns, gaps included
    #[must_use]
    pub fn columns(&self) -> usize {
        self.matches + self.mismatches + self.insertions + self.deletions
    }

    /// Reference bases consumed by the alignment
    #[must_use]
    pub fn reference_span(&self) -> usize {
        self.matches + self.mismatches + self.deletions
    }

    /// Identical columns / all columns
    #[must_use]
    pub fn identity(&self) -> f64 {
        let columns = self.columns();
        if columns == 0 {
            0.0
        } else {
            count_to_f64(self.matches) / count_to_f64(columns)
        }
    }
}

/// Aligned reference span / full allele length
#[must_use]
pub fn coverage(reference_span: usize, allele_length: usize) -> f64 {
    if allele_length == 0 {
        0.0
    } else {
        count_to_f64(reference_span) / count_to_f64(allele_length)
    }
}
