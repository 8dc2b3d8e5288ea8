use tracing::debug;

use crate::catalog::store::AlleleCatalog;
use crate::core::alignment::{Alignment, Hit};
use crate::core::types::AlleleId;
use crate::pipeline::config::PredictionConfig;

/// Keeps alignments meeting the identity and coverage thresholds.
///
/// Both comparisons are inclusive. An allele's own minimum identity, when the
/// catalog defines one, replaces the global identity threshold.
pub struct HitFilter<'a> {
    catalog: &'a AlleleCatalog,
    min_identity: f64,
    min_coverage: f64,
}

impl<'a> HitFilter<'a> {
    pub fn new(catalog: &'a AlleleCatalog, min_identity: f64, min_coverage: f64) -> Self {
        Self {
            catalog,
            min_identity,
            min_coverage,
        }
    }

    pub fn from_config(catalog: &'a AlleleCatalog, config: &PredictionConfig) -> Self {
        Self::new(catalog, config.min_identity, config.min_coverage)
    }

    /// Identity threshold that applies to an allele
    #[must_use]
    pub fn identity_threshold(&self, allele_id: &AlleleId) -> f64 {
        self.catalog
            .get(allele_id)
            .and_then(|allele| allele.min_identity)
            .unwrap_or(self.min_identity)
    }

    #[must_use]
    pub fn passes(&self, alignment: &Alignment) -> bool {
        alignment.identity >= self.identity_threshold(&alignment.allele_id)
            && alignment.coverage >= self.min_coverage
    }

    /// Keep passing alignments, in input order
    #[must_use]
    pub fn filter(&self, alignments: Vec<Alignment>) -> Vec<Hit> {
        let total = alignments.len();
        let hits: Vec<Hit> = alignments
            .into_iter()
            .filter(|alignment| self.passes(alignment))
            .map(Hit)
            .collect();
        debug!("{} of {} alignments passed filtering", hits.len(), total);
        hits
    }
}
