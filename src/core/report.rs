use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::alignment::Hit;
use crate::core::types::{AlleleId, ResistanceClass, Strand};

/// The single hit chosen for a locus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCall {
    /// Winning hit
    pub hit: Hit,

    /// 100% identity over 100% of the allele
    pub full_match: bool,

    /// Partial hit ending close to a contig end (possibly truncated)
    pub contig_edge: bool,

    /// Losing alleles that competed for the same locus, best first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<AlleleId>,
}

impl ResolvedCall {
    /// Call for a hit that won its locus outright
    #[must_use]
    pub fn new(hit: Hit) -> Self {
        Self {
            full_match: hit.is_full_match(),
            contig_edge: false,
            alternatives: Vec::new(),
            hit,
        }
    }

    #[must_use]
    pub fn allele_id(&self) -> &AlleleId {
        &self.hit.allele_id
    }

    /// Flag a partial hit whose query range comes within `edge_distance` of
    /// either end of its contig
    pub fn mark_contig_edge(&mut self, contig_length: usize, edge_distance: usize) {
        let near_start = self.hit.query_start <= edge_distance;
        let near_end = self.hit.query_end + edge_distance >= contig_length;
        self.contig_edge = self.hit.coverage < 1.0 && (near_start || near_end);
    }
}

/// A detected resistance point mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMutation {
    /// Target label, e.g. `gyrA@83`
    pub target: String,
    pub gene_id: String,
    pub allele_id: AlleleId,
    pub contig_id: String,
    pub position: i64,

    /// Mutations the target needs to confer resistance on its own
    pub mutations_needed: u32,

    /// Observed codon (coding genes) or nucleotide
    pub query_codon: String,

    /// Observed residue (amino acid or nucleotide)
    pub query_residue: String,

    /// Change in `wildtype->observed` form
    pub change: String,

    pub classes: BTreeSet<ResistanceClass>,
}

/// Resistance classes detected for one genome with their supporting gene families
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResistanceProfile {
    classes: BTreeMap<ResistanceClass, BTreeSet<String>>,
}

impl ResistanceProfile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `family` confers resistance to `class`.
    ///
    /// Returns `false` when the pair was already present.
    pub fn add(&mut self, class: ResistanceClass, family: impl Into<String>) -> bool {
        self.classes.entry(class).or_default().insert(family.into())
    }

    /// Gene families supporting a class, sorted
    pub fn evidence(&self, class: ResistanceClass) -> impl Iterator<Item = &str> {
        self.classes
            .get(&class)
            .into_iter()
            .flat_map(|families| families.iter().map(String::as_str))
    }

    #[must_use]
    pub fn contains(&self, class: ResistanceClass) -> bool {
        self.classes.contains_key(&class)
    }

    /// Detected classes in taxonomy order
    pub fn classes(&self) -> impl Iterator<Item = ResistanceClass> + '_ {
        self.classes.keys().copied()
    }

    /// Number of distinct (class, family) pairs
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.classes.values().map(BTreeSet::len).sum()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Condition that reduces confidence in a report without invalidating it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Caveat {
    /// An allele's alignment exceeded its time bound and was treated as no match
    AlignmentTimeout {
        allele_id: AlleleId,
        contig_id: String,
        strand: Strand,
    },
    /// The assembly contains IUPAC ambiguity codes
    AmbiguousBases { count: usize },
    /// The assembly has more than one record
    MultipleContigs { count: usize },
}

/// Summary of an analysed contig
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContigSummary {
    pub id: String,
    pub length: u64,
    pub md5: String,
}

/// Final per-genome prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeReport {
    pub genome_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contigs: Vec<ContigSummary>,

    /// One call per locus, ordered by contig then position
    pub calls: Vec<ResolvedCall>,

    pub profile: ResistanceProfile,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub point_mutations: Vec<PointMutation>,

    /// Every catalog gene family and whether it was called
    #[serde(default)]
    pub gene_presence: BTreeMap<String, bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub caveats: Vec<Caveat>,
}

impl GenomeReport {
    /// No determinants were found
    #[must_use]
    pub fn is_susceptible(&self) -> bool {
        self.profile.is_empty()
    }

    /// Whether any caveat lowers confidence in the result
    #[must_use]
    pub fn has_caveats(&self) -> bool {
        !self.caveats.is_empty()
    }
}
