use std::collections::BTreeMap;

use thiserror::Error;
use tracing::error;

use crate::catalog::store::AlleleCatalog;
use crate::core::allele::ReferenceAllele;
use crate::core::report::{PointMutation, ResistanceProfile, ResolvedCall};
use crate::core::types::AlleleId;

/// A call names an allele the catalog does not contain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Resolved call refers to allele {0} which is not in the catalog")]
pub struct UnmappedAlleleError(pub AlleleId);

/// Translates resolved calls into resistance classes
pub struct PhenotypeMapper<'a> {
    catalog: &'a AlleleCatalog,
}

impl<'a> PhenotypeMapper<'a> {
    pub fn new(catalog: &'a AlleleCatalog) -> Self {
        Self { catalog }
    }

    /// Catalog entry for a call's allele.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedAlleleError` if the allele is missing, which means
    /// the calls were not produced from this catalog.
    pub fn allele_for(&self, call: &ResolvedCall) -> Result<&'a ReferenceAllele, UnmappedAlleleError> {
        self.catalog.get(call.allele_id()).ok_or_else(|| {
            error!(
                "Integrity defect: allele {} was called but is absent from the catalog",
                call.allele_id()
            );
            UnmappedAlleleError(call.allele_id().clone())
        })
    }

    /// Resistance classes of every call, each (class, family) pair once.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedAlleleError` for the first call whose allele is not
    /// in the catalog.
    pub fn map_to_phenotypes(
        &self,
        calls: &[ResolvedCall],
    ) -> Result<ResistanceProfile, UnmappedAlleleError> {
        let mut profile = ResistanceProfile::new();
        for call in calls {
            let allele = self.allele_for(call)?;
            for &class in &allele.classes {
                profile.add(class, allele.family.as_str());
            }
        }
        Ok(profile)
    }

    /// Add the classes of detected point mutations, with the mutated gene as
    /// evidence
    pub fn add_point_mutations(&self, profile: &mut ResistanceProfile, mutations: &[PointMutation]) {
        for mutation in mutations {
            for &class in &mutation.classes {
                profile.add(class, mutation.gene_id.as_str());
            }
        }
    }

    /// Every catalog gene family mapped to whether any call names it.
    ///
    /// # Errors
    ///
    /// Returns `UnmappedAlleleError` for a call whose allele is not in the
    /// catalog.
    pub fn gene_presence(
        &self,
        calls: &[ResolvedCall],
    ) -> Result<BTreeMap<String, bool>, UnmappedAlleleError> {
        let mut presence: BTreeMap<String, bool> = self
            .catalog
            .families()
            .into_iter()
            .map(|family| (family.to_string(), false))
            .collect();
        for call in calls {
            let allele = self.allele_for(call)?;
            presence.insert(allele.family.clone(), true);
        }
        Ok(presence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::{test_alignment, Hit};
    use crate::core::types::ResistanceClass;
    use std::collections::BTreeSet;

    fn catalog() -> AlleleCatalog {
        AlleleCatalog::from_alleles([
            ReferenceAllele::new("blaTEM_1", "blaTEM", "1", b"ACGT")
                .with_classes([ResistanceClass::BetaLactam]),
            ReferenceAllele::new("blaTEM_2", "blaTEM", "2", b"ACGA")
                .with_classes([ResistanceClass::BetaLactam]),
            ReferenceAllele::new("aac_1", "aac(6')-Ib-cr", "1", b"ACGA")
                .with_classes([ResistanceClass::Aminoglycoside, ResistanceClass::Quinolone]),
            ReferenceAllele::new("gyrA", "gyrA", "", b"ACGA"),
        ])
        .unwrap()
    }

    fn call(allele: &str, start: usize) -> ResolvedCall {
        ResolvedCall::new(Hit(test_alignment(allele, "c", (start, start + 4), 1.0, 1.0)))
    }

    #[test]
    fn test_profile_dedups_class_family_pairs() {
        let catalog = catalog();
        let mapper = PhenotypeMapper::new(&catalog);
        let profile = mapper
            .map_to_phenotypes(&[call("blaTEM_1", 0), call("blaTEM_2", 100), call("aac_1", 200)])
            .unwrap();

        assert_eq!(profile.entry_count(), 3);
        assert_eq!(
            profile.evidence(ResistanceClass::BetaLactam).collect::<Vec<_>>(),
            vec!["blaTEM"]
        );
        assert!(profile.contains(ResistanceClass::Quinolone));
        assert!(profile.contains(ResistanceClass::Aminoglycoside));
    }

    #[test]
    fn test_empty_calls_give_empty_profile() {
        let catalog = catalog();
        let profile = PhenotypeMapper::new(&catalog).map_to_phenotypes(&[]).unwrap();
        assert!(profile.is_empty());
    }

    #[test]
    fn test_unmapped_allele_is_error() {
        let catalog = catalog();
        let result = PhenotypeMapper::new(&catalog).map_to_phenotypes(&[call("mcr-1_1", 0)]);
        assert_eq!(result, Err(UnmappedAlleleError(AlleleId::new("mcr-1_1"))));
    }

    #[test]
    fn test_gene_presence_covers_every_family() {
        let catalog = catalog();
        let presence = PhenotypeMapper::new(&catalog)
            .gene_presence(&[call("blaTEM_2", 0)])
            .unwrap();
        assert_eq!(presence.len(), 3);
        assert_eq!(presence.get("blaTEM"), Some(&true));
        assert_eq!(presence.get("gyrA"), Some(&false));
    }

    #[test]
    fn test_point_mutation_classes_enter_profile() {
        let catalog = catalog();
        let mapper = PhenotypeMapper::new(&catalog);
        let mut profile = mapper.map_to_phenotypes(&[call("gyrA", 0)]).unwrap();
        assert!(profile.is_empty());

        let mutation = PointMutation {
            target: "gyrA@83".to_string(),
            gene_id: "gyrA".to_string(),
            allele_id: AlleleId::new("gyrA"),
            contig_id: "c".to_string(),
            position: 83,
            mutations_needed: 1,
            query_codon: "TTG".to_string(),
            query_residue: "L".to_string(),
            change: "S->L".to_string(),
            classes: BTreeSet::from([ResistanceClass::Quinolone]),
        };
        mapper.add_point_mutations(&mut profile, &[mutation.clone(), mutation]);
        assert_eq!(profile.entry_count(), 1);
        assert_eq!(
            profile.evidence(ResistanceClass::Quinolone).collect::<Vec<_>>(),
            vec!["gyrA"]
        );
    }
}
