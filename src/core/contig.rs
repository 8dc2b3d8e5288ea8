use serde::{Deserialize, Serialize};

use crate::utils::validation::{normalize_sequence, sequence_md5};

/// A single assembled contig of a query genome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Record identifier (first word of the FASTA header)
    pub id: String,

    /// Sequence length in bases
    pub length: u64,

    /// MD5 checksum of the normalized sequence
    pub md5: String,

    /// Number of IUPAC ambiguity symbols in the sequence
    #[serde(default)]
    pub ambiguous_bases: usize,

    /// Uppercase nucleotide sequence
    #[serde(skip)]
    sequence: Vec<u8>,
}

impl Contig {
    /// Build a contig from raw sequence bytes.
    ///
    /// The sequence is uppercased and `U` folded to `T`. Alphabet validation
    /// is the loader's job; see [`crate::parsing::fasta`].
    pub fn new(id: impl Into<String>, sequence: &[u8]) -> Self {
        let sequence = normalize_sequence(sequence);
        Self {
            id: id.into(),
            length: sequence.len() as u64,
            md5: sequence_md5(&sequence),
            ambiguous_bases: 0,
            sequence,
        }
    }

    #[must_use]
    pub fn with_ambiguous_bases(mut self, count: usize) -> Self {
        self.ambiguous_bases = count;
        self
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

/// A query genome: a complete assembly, normally a single contig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genome {
    /// Genome identifier (file stem or contig id)
    pub id: String,

    /// Source file path (if known)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// All records of the assembly
    pub contigs: Vec<Contig>,
}

impl Genome {
    pub fn new(id: impl Into<String>, contigs: Vec<Contig>) -> Self {
        Self {
            id: id.into(),
            source: None,
            contigs,
        }
    }

    /// A genome consisting of exactly one contig, named after it
    #[must_use]
    pub fn from_contig(contig: Contig) -> Self {
        Self::new(contig.id.clone(), vec![contig])
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Find a contig by id
    #[must_use]
    pub fn contig(&self, id: &str) -> Option<&Contig> {
        self.contigs.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn is_single_contig(&self) -> bool {
        self.contigs.len() == 1
    }

    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.contigs.iter().map(|c| c.length).sum()
    }

    #[must_use]
    pub fn ambiguous_bases(&self) -> usize {
        self.contigs.iter().map(|c| c.ambiguous_bases).sum()
    }
}
