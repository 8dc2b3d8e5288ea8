use std::borrow::Cow;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::catalog::index::{Candidate, CandidateFinder, SeedIndex};
use crate::catalog::store::AlleleCatalog;
use crate::core::alignment::Alignment;
use crate::core::allele::ReferenceAllele;
use crate::core::contig::Contig;
use crate::core::report::Caveat;
use crate::core::types::Strand;
use crate::matching::aligner::{align_local, AlignmentBuffer, AlignmentError, LocalAlignment};
use crate::matching::scoring::{coverage, ColumnCounts};
use crate::pipeline::config::PredictionConfig;
use crate::utils::nucleotide::reverse_complement;

/// Alignments found for a genome plus any tasks that ran out of time
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// At most one alignment per (contig, allele, strand), in candidate order
    pub alignments: Vec<Alignment>,

    /// One `AlignmentTimeout` caveat per timed-out task
    pub caveats: Vec<Caveat>,
}

impl MatchOutcome {
    fn extend(&mut self, other: MatchOutcome) {
        self.alignments.extend(other.alignments);
        self.caveats.extend(other.caveats);
    }
}

/// Aligns every worthwhile catalog allele against a genome's contigs
pub struct AligningMatcher<'a> {
    catalog: &'a AlleleCatalog,
    config: &'a PredictionConfig,
}

impl<'a> AligningMatcher<'a> {
    pub fn new(catalog: &'a AlleleCatalog, config: &'a PredictionConfig) -> Self {
        Self { catalog, config }
    }

    /// Best alignment of each allele on each strand of one contig.
    ///
    /// Alleles fan out over the current rayon pool. A timed-out task is
    /// dropped and recorded as a caveat.
    ///
    /// # Errors
    ///
    /// Returns any `AlignmentError` other than a timeout; the genome cannot
    /// be analyzed reliably after one.
    pub fn find_alignments(&self, contig: &Contig) -> Result<MatchOutcome, AlignmentError> {
        let candidates = self.candidates(contig);
        debug!(
            "Contig {}: aligning {} allele strands of {} alleles",
            contig.id,
            candidates.len(),
            self.catalog.len()
        );

        let results: Vec<Result<Option<Alignment>, AlignmentError>> = candidates
            .par_iter()
            .map_init(AlignmentBuffer::new, |buffer, candidate| {
                self.align_candidate(contig, candidate, buffer)
            })
            .collect();

        let mut outcome = MatchOutcome::default();
        for (candidate, result) in candidates.iter().zip(results) {
            match result {
                Ok(Some(alignment)) => outcome.alignments.push(alignment),
                Ok(None) => {}
                Err(AlignmentError::Timeout) => {
                    let allele = &self.catalog.alleles[candidate.allele_index];
                    warn!(
                        "Alignment of {} ({}) against {} timed out; treating as no match",
                        allele.id, candidate.strand, contig.id
                    );
                    outcome.caveats.push(Caveat::AlignmentTimeout {
                        allele_id: allele.id.clone(),
                        contig_id: contig.id.clone(),
                        strand: candidate.strand,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        Ok(outcome)
    }

    /// Alignments across several contigs, in contig order
    ///
    /// # Errors
    ///
    /// Returns the first non-timeout `AlignmentError` from any contig.
    pub fn find_alignments_in(&self, contigs: &[Contig]) -> Result<MatchOutcome, AlignmentError> {
        let mut outcome = MatchOutcome::default();
        for contig in contigs {
            outcome.extend(self.find_alignments(contig)?);
        }
        Ok(outcome)
    }

    /// Allele strands to align, with the contig windows to search
    fn candidates(&self, contig: &Contig) -> Vec<Candidate> {
        if self.config.prefilter {
            let index = SeedIndex::build(contig, self.config.seed_length);
            return CandidateFinder::new(self.catalog, &index).find_candidates();
        }

        let whole = vec![(0, contig.len())];
        (0..self.catalog.len())
            .flat_map(|allele_index| {
                let whole = whole.clone();
                Strand::BOTH.into_iter().map(move |strand| Candidate {
                    allele_index,
                    strand,
                    windows: whole.clone(),
                })
            })
            .collect()
    }

    fn align_candidate(
        &self,
        contig: &Contig,
        candidate: &Candidate,
        buffer: &mut AlignmentBuffer,
    ) -> Result<Option<Alignment>, AlignmentError> {
        let allele = &self.catalog.alleles[candidate.allele_index];
        let oriented: Cow<'_, [u8]> = match candidate.strand {
            Strand::Forward => Cow::Borrowed(allele.sequence()),
            Strand::Reverse => Cow::Owned(reverse_complement(allele.sequence())),
        };
        let deadline = self
            .config
            .alignment_timeout()
            .map(|limit| Instant::now() + limit);

        let mut best: Option<(usize, LocalAlignment)> = None;
        for &(start, end) in &candidate.windows {
            let window = &contig.sequence()[start..end];
            if let Some(local) =
                align_local(window, &oriented, &self.config.scoring, buffer, deadline)?
            {
                if best.as_ref().map_or(true, |(_, b)| local.score > b.score) {
                    best = Some((start, local));
                }
            }
        }

        Ok(best.map(|(offset, local)| {
            build_alignment(contig, allele, candidate.strand, offset, local)
        }))
    }
}

/// Convert a window-relative local alignment into contig and allele coordinates
pub(crate) fn build_alignment(
    contig: &Contig,
    allele: &ReferenceAllele,
    strand: Strand,
    offset: usize,
    local: LocalAlignment,
) -> Alignment {
    let counts = ColumnCounts::from_ops(&local.edit_script);
    let length = allele.len();
    let (reference_start, reference_end) = match strand {
        Strand::Forward => (local.reference_start, local.reference_end),
        Strand::Reverse => (length - local.reference_end, length - local.reference_start),
    };

    Alignment {
        contig_id: contig.id.clone(),
        query_start: offset + local.query_start,
        query_end: offset + local.query_end,
        strand,
        allele_id: allele.id.clone(),
        reference_start,
        reference_end,
        reference_length: length,
        identity: counts.identity(),
        coverage: coverage(counts.reference_span(), length),
        score: local.score,
        matches: counts.matches,
        aligned_length: counts.columns(),
        edit_script: local.edit_script,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENE: &[u8] = b"ATGAGTATTCAACATTTCCGTGTCGCCCTTATTCCCTTTTTTGCGGCATTTTGCCTTCCTGTTTTTGCTCACCCAGAAACG";
    const FLANK: &[u8] = b"GGCCTTAGCGCAGATCCAGCTGACTGACCGTAATCGGCTAGCTAGGATTAC";

    fn catalog() -> AlleleCatalog {
        AlleleCatalog::from_alleles([ReferenceAllele::new("blaTEM_1", "blaTEM", "1", GENE)]).unwrap()
    }

    fn contig_with(insert: &[u8]) -> Contig {
        Contig::new("chr", &[FLANK, insert, FLANK].concat())
    }

    #[test]
    fn test_forward_exact_match() {
        let catalog = catalog();
        let config = PredictionConfig::default();
        let matcher = AligningMatcher::new(&catalog, &config);

        let outcome = matcher.find_alignments(&contig_with(GENE)).unwrap();
        let forward: Vec<_> = outcome
            .alignments
            .iter()
            .filter(|a| a.strand == Strand::Forward)
            .collect();
        assert_eq!(forward.len(), 1);
        let alignment = forward[0];
        assert_eq!(alignment.query_start, FLANK.len());
        assert_eq!(alignment.query_end, FLANK.len() + GENE.len());
        assert!((alignment.identity - 1.0).abs() < f64::EPSILON);
        assert!((alignment.coverage - 1.0).abs() < f64::EPSILON);
        assert!(alignment.is_full_match());
        assert!(outcome.caveats.is_empty());
    }

    #[test]
    fn test_reverse_strand_match() {
        let catalog = catalog();
        let config = PredictionConfig::default();
        let matcher = AligningMatcher::new(&catalog, &config);

        let outcome = matcher
            .find_alignments(&contig_with(&reverse_complement(GENE)))
            .unwrap();
        let reverse: Vec<_> = outcome
            .alignments
            .iter()
            .filter(|a| a.strand == Strand::Reverse)
            .collect();
        assert_eq!(reverse.len(), 1);
        assert_eq!(reverse[0].query_start, FLANK.len());
        assert_eq!(reverse[0].reference_start, 0);
        assert_eq!(reverse[0].reference_end, GENE.len());
        assert!((reverse[0].coverage - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_prefilter_does_not_change_result() {
        let catalog = catalog();
        let mut mutated = GENE.to_vec();
        mutated[40] = b'A';
        let contig = contig_with(&mutated);

        let config = PredictionConfig::default();
        let filtered = AligningMatcher::new(&catalog, &config)
            .find_alignments(&contig)
            .unwrap();

        let config = PredictionConfig {
            prefilter: false,
            ..PredictionConfig::default()
        };
        let unfiltered = AligningMatcher::new(&catalog, &config)
            .find_alignments(&contig)
            .unwrap();

        let best = |outcome: &MatchOutcome| {
            outcome
                .alignments
                .iter()
                .find(|a| a.strand == Strand::Forward)
                .cloned()
                .unwrap()
        };
        assert_eq!(best(&filtered), best(&unfiltered));
    }

    #[test]
    fn test_partial_gene_coverage() {
        let catalog = catalog();
        let config = PredictionConfig::default();
        let matcher = AligningMatcher::new(&catalog, &config);

        let half = &GENE[..GENE.len() / 2];
        let outcome = matcher.find_alignments(&contig_with(half)).unwrap();
        let alignment = outcome
            .alignments
            .iter()
            .find(|a| a.strand == Strand::Forward)
            .unwrap();
        assert_eq!(alignment.reference_start, 0);
        assert!((alignment.coverage - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_timeout_becomes_caveat() {
        let catalog = catalog();
        let config = PredictionConfig {
            alignment_timeout_ms: 1,
            prefilter: false,
            ..PredictionConfig::default()
        };
        let matcher = AligningMatcher::new(&catalog, &config);
        let long = Contig::new("long", &FLANK.repeat(4000));

        let outcome = matcher.find_alignments(&long).unwrap();
        assert!(outcome.alignments.is_empty());
        assert_eq!(outcome.caveats.len(), 2);
        assert!(matches!(
            &outcome.caveats[0],
            Caveat::AlignmentTimeout { contig_id, strand: Strand::Forward, .. } if contig_id == "long"
        ));
    }

    #[test]
    fn test_multiple_contigs_in_order() {
        let catalog = catalog();
        let config = PredictionConfig::default();
        let matcher = AligningMatcher::new(&catalog, &config);
        let contigs = [
            Contig::new("plasmid", &[FLANK, GENE].concat()),
            Contig::new("empty", FLANK),
        ];
        let outcome = matcher.find_alignments_in(&contigs).unwrap();
        assert!(outcome
            .alignments
            .iter()
            .all(|a| a.contig_id == "plasmid"));
        assert!(!outcome.alignments.is_empty());
    }
}
