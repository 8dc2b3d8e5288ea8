use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::allele::ReferenceAllele;
use crate::core::mutation::MutationTarget;
use crate::core::types::AlleleId;
use crate::utils::validation::{check_alphabet, check_record_limit, MAX_ALLELES};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Duplicate allele id: {0}")]
    DuplicateAllele(AlleleId),

    #[error("Allele {0} has an empty sequence")]
    EmptyAllele(AlleleId),

    #[error("Allele {allele} has invalid nucleotide '{symbol}' at position {position}")]
    InvalidSequence {
        allele: AlleleId,
        position: usize,
        symbol: char,
    },

    #[error("Invalid identity override {value} for allele {allele}")]
    InvalidOverride { allele: AlleleId, value: f64 },

    #[error("Too many alleles: {0} exceeds maximum allowed")]
    TooManyAlleles(usize),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub created_at: String,
    pub alleles: Vec<AlleleRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutation_targets: Vec<MutationTarget>,
}

/// An allele with its sequence, as stored in exported catalogs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlleleRecord {
    #[serde(flatten)]
    pub allele: ReferenceAllele,
    pub sequence: String,
}

/// The curated determinant catalog with lookup indexes.
///
/// Built once per run and shared read-only by every genome pipeline.
#[derive(Debug, Default)]
pub struct AlleleCatalog {
    /// All alleles in load order
    pub alleles: Vec<ReferenceAllele>,

    /// Index: allele ID -> index in alleles vec
    id_to_index: HashMap<AlleleId, usize>,

    /// Index: gene family -> indices of its alleles
    family_to_alleles: HashMap<String, Vec<usize>>,

    /// Point mutation targets keyed by gene family
    mutation_targets: HashMap<String, Vec<MutationTarget>>,
}

impl AlleleCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from alleles, validating each one
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` for duplicate ids, empty or invalid
    /// sequences, out-of-range identity overrides, or too many alleles.
    pub fn from_alleles(
        alleles: impl IntoIterator<Item = ReferenceAllele>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for allele in alleles {
            catalog.add_allele(allele)?;
        }
        Ok(catalog)
    }

    /// Load catalog from an exported JSON file
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the file cannot be read or is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the JSON is invalid or an allele fails
    /// validation.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            warn!(
                "Catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION, data.version
            );
        }

        let mut catalog = Self::new();
        for record in data.alleles {
            let mut allele = record.allele;
            allele.set_sequence(record.sequence.as_bytes());
            catalog.add_allele(allele)?;
        }
        catalog.add_mutation_targets(data.mutation_targets);

        Ok(catalog)
    }

    /// Add an allele to the catalog
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` if the allele id is already present, the
    /// sequence is empty or uses symbols outside the nucleotide alphabet, or
    /// its identity override is not a fraction.
    pub fn add_allele(&mut self, allele: ReferenceAllele) -> Result<(), CatalogError> {
        if check_record_limit(self.alleles.len(), MAX_ALLELES).is_some() {
            return Err(CatalogError::TooManyAlleles(self.alleles.len()));
        }
        if self.id_to_index.contains_key(&allele.id) {
            return Err(CatalogError::DuplicateAllele(allele.id));
        }
        if allele.is_empty() {
            return Err(CatalogError::EmptyAllele(allele.id));
        }
        if let Err((position, byte)) = check_alphabet(allele.sequence()) {
            return Err(CatalogError::InvalidSequence {
                allele: allele.id,
                position,
                symbol: char::from(byte),
            });
        }
        if let Some(value) = allele.min_identity {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(CatalogError::InvalidOverride {
                    allele: allele.id,
                    value,
                });
            }
        }

        let index = self.alleles.len();
        self.id_to_index.insert(allele.id.clone(), index);
        self.family_to_alleles
            .entry(allele.family.clone())
            .or_default()
            .push(index);
        self.alleles.push(allele);
        Ok(())
    }

    /// Attach point mutation targets, keyed by their gene family
    pub fn add_mutation_targets(&mut self, targets: impl IntoIterator<Item = MutationTarget>) {
        for target in targets {
            if !self.family_to_alleles.contains_key(&target.gene_id) {
                warn!(
                    "Mutation target {} refers to gene {} which has no allele in the catalog",
                    target.label(),
                    target.gene_id
                );
            }
            self.mutation_targets
                .entry(target.gene_id.clone())
                .or_default()
                .push(target);
        }
    }

    /// Get an allele by ID
    #[must_use]
    pub fn get(&self, id: &AlleleId) -> Option<&ReferenceAllele> {
        self.id_to_index.get(id).map(|&idx| &self.alleles[idx])
    }

    /// Alleles belonging to a gene family
    pub fn family(&self, family: &str) -> impl Iterator<Item = &ReferenceAllele> {
        self.family_to_alleles
            .get(family)
            .into_iter()
            .flat_map(|indices| indices.iter().map(|&idx| &self.alleles[idx]))
    }

    /// All gene families, sorted
    #[must_use]
    pub fn families(&self) -> BTreeSet<&str> {
        self.family_to_alleles.keys().map(String::as_str).collect()
    }

    /// Point mutation targets for a gene family
    #[must_use]
    pub fn mutation_targets(&self, family: &str) -> &[MutationTarget] {
        self.mutation_targets
            .get(family)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of point mutation targets
    #[must_use]
    pub fn mutation_target_count(&self) -> usize {
        self.mutation_targets.values().map(Vec::len).sum()
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let mut mutation_targets: Vec<MutationTarget> =
            self.mutation_targets.values().flatten().cloned().collect();
        mutation_targets.sort_by(|a, b| {
            a.gene_id
                .cmp(&b.gene_id)
                .then_with(|| a.position.cmp(&b.position))
        });

        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            alleles: self
                .alleles
                .iter()
                .map(|allele| AlleleRecord {
                    allele: allele.clone(),
                    sequence: String::from_utf8_lossy(allele.sequence()).into_owned(),
                })
                .collect(),
            mutation_targets,
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of alleles in catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    /// Check if catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mutation::test_target;
    use crate::core::types::ResistanceClass;

    fn make_test_catalog() -> AlleleCatalog {
        AlleleCatalog::from_alleles([
            ReferenceAllele::new("blaTEM_1", "blaTEM", "1", b"ATGAGTATTCAACATTTCCG")
                .with_classes([ResistanceClass::BetaLactam]),
            ReferenceAllele::new("blaTEM_1-1", "blaTEM", "1", b"ATGAGTATTCAACATTTCCA")
                .with_classes([ResistanceClass::BetaLactam]),
            ReferenceAllele::new("tetA_1", "tetA", "1", b"ATGAAACCCAACAGACCCCT")
                .with_classes([ResistanceClass::Tetracycline]),
        ])
        .unwrap()
    }

    #[test]
    fn test_catalog_get_by_id() {
        let catalog = make_test_catalog();
        let allele = catalog.get(&AlleleId::new("tetA_1")).unwrap();
        assert_eq!(allele.family, "tetA");
        assert!(catalog.get(&AlleleId::new("nonexistent")).is_none());
    }

    #[test]
    fn test_catalog_families() {
        let catalog = make_test_catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.families().into_iter().collect::<Vec<_>>(),
            vec!["blaTEM", "tetA"]
        );
        assert_eq!(catalog.family("blaTEM").count(), 2);
        assert_eq!(catalog.family("mcr").count(), 0);
    }

    #[test]
    fn test_duplicate_allele_rejected() {
        let mut catalog = make_test_catalog();
        let result = catalog.add_allele(ReferenceAllele::new("tetA_1", "tetA", "1", b"ACGT"));
        assert!(matches!(result, Err(CatalogError::DuplicateAllele(_))));
    }

    #[test]
    fn test_empty_allele_rejected() {
        let result = AlleleCatalog::from_alleles([ReferenceAllele::new("x_1", "x", "1", b"")]);
        assert!(matches!(result, Err(CatalogError::EmptyAllele(_))));
    }

    #[test]
    fn test_invalid_sequence_rejected() {
        let result =
            AlleleCatalog::from_alleles([ReferenceAllele::new("x_1", "x", "1", b"ACGT-ACGT")]);
        match result {
            Err(CatalogError::InvalidSequence {
                position, symbol, ..
            }) => {
                assert_eq!(position, 4);
                assert_eq!(symbol, '-');
            }
            other => panic!("Expected InvalidSequence, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = AlleleCatalog::from_alleles([
            ReferenceAllele::new("x_1", "x", "1", b"ACGT").with_min_identity(95.0)
        ]);
        assert!(matches!(result, Err(CatalogError::InvalidOverride { .. })));
    }

    #[test]
    fn test_mutation_targets_by_family() {
        let mut catalog = make_test_catalog();
        catalog.add_mutation_targets([test_target("tetA", 3, true), test_target("gyrA", 83, true)]);
        assert_eq!(catalog.mutation_targets("tetA").len(), 1);
        assert_eq!(catalog.mutation_targets("gyrA").len(), 1);
        assert!(catalog.mutation_targets("blaTEM").is_empty());
        assert_eq!(catalog.mutation_target_count(), 2);
    }

    #[test]
    fn test_catalog_json_round_trip() {
        let catalog = make_test_catalog();
        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("blaTEM_1-1"));

        let reloaded = AlleleCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), catalog.len());
        let allele = reloaded.get(&AlleleId::new("blaTEM_1")).unwrap();
        assert_eq!(allele.sequence(), b"ATGAGTATTCAACATTTCCG");
        assert!(allele.classes.contains(&ResistanceClass::BetaLactam));
    }
}
