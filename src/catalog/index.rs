use rustc_hash::FxHashMap;

use crate::core::allele::ReferenceAllele;
use crate::core::contig::Contig;
use crate::core::types::Strand;
use crate::utils::nucleotide::reverse_complement;

use super::store::AlleleCatalog;

/// Longest seed that fits a 2-bit packed `u64`
pub const MAX_SEED_LENGTH: usize = 32;

/// Exact k-mer seeds of a contig's forward strand, with their positions.
///
/// Positions are stored contiguously per k-mer: `slots[kmer]` is a
/// `(start, count)` range into `positions`.
pub struct SeedIndex {
    seed_length: usize,
    contig_length: usize,
    slots: FxHashMap<u64, (u32, u32)>,
    positions: Vec<u32>,
}

impl SeedIndex {
    /// Index every unambiguous k-mer of a contig.
    ///
    /// `seed_length` is clamped to `1..=MAX_SEED_LENGTH`.
    pub fn build(contig: &Contig, seed_length: usize) -> Self {
        let seed_length = seed_length.clamp(1, MAX_SEED_LENGTH);
        let sequence = contig.sequence();

        let mut counts: FxHashMap<u64, u32> = FxHashMap::default();
        for_each_kmer(sequence, seed_length, |_, kmer| {
            *counts.entry(kmer).or_insert(0) += 1;
            true
        });

        let mut slots = FxHashMap::default();
        slots.reserve(counts.len());
        let mut next = 0u32;
        for (kmer, count) in counts {
            slots.insert(kmer, (next, 0));
            next += count;
        }

        let mut positions = vec![0u32; next as usize];
        for_each_kmer(sequence, seed_length, |start, kmer| {
            if let Some((offset, filled)) = slots.get_mut(&kmer) {
                positions[(*offset + *filled) as usize] = u32::try_from(start).unwrap_or(u32::MAX);
                *filled += 1;
            }
            true
        });

        Self {
            seed_length,
            contig_length: sequence.len(),
            slots,
            positions,
        }
    }

    #[must_use]
    pub fn seed_length(&self) -> usize {
        self.seed_length
    }

    /// Number of distinct k-mers
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Contig positions where a packed k-mer starts
    fn positions_of(&self, kmer: u64) -> &[u32] {
        self.slots
            .get(&kmer)
            .map(|&(start, count)| &self.positions[start as usize..(start + count) as usize])
            .unwrap_or_default()
    }

    /// Whether any k-mer of `sequence` occurs in the index
    #[must_use]
    pub fn shares_seed(&self, sequence: &[u8]) -> bool {
        let mut found = false;
        for_each_kmer(sequence, self.seed_length, |_, kmer| {
            found = self.slots.contains_key(&kmer);
            !found
        });
        found
    }

    /// Contig windows worth aligning `sequence` against.
    ///
    /// Every shared seed fixes a diagonal; the window spans the whole
    /// sequence on that diagonal plus `slack` bases either side to leave
    /// room for gaps. Overlapping windows are merged. Returns half-open
    /// ranges sorted by start.
    #[must_use]
    pub fn seed_windows(&self, sequence: &[u8], slack: usize) -> Vec<(usize, usize)> {
        let mut windows = Vec::new();
        for_each_kmer(sequence, self.seed_length, |offset, kmer| {
            for &position in self.positions_of(kmer) {
                let diagonal = (position as usize).saturating_sub(offset);
                let start = diagonal.saturating_sub(slack);
                let end = (diagonal + sequence.len() + slack).min(self.contig_length);
                windows.push((start, end));
            }
            true
        });
        merge_windows(windows)
    }
}

/// Merge overlapping or touching ranges
fn merge_windows(mut windows: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    windows.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(windows.len());
    for (start, end) in windows {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Call `f` with the start offset and 2-bit packed value of every k-mer free
/// of ambiguity codes.
///
/// Stops early when `f` returns `false`.
fn for_each_kmer(sequence: &[u8], k: usize, mut f: impl FnMut(usize, u64) -> bool) {
    let mask = if k == MAX_SEED_LENGTH {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    };
    let mut kmer = 0u64;
    let mut valid = 0usize;

    for (idx, &base) in sequence.iter().enumerate() {
        let code = match base {
            b'A' => 0,
            b'C' => 1,
            b'G' => 2,
            b'T' => 3,
            _ => {
                valid = 0;
                continue;
            }
        };
        kmer = ((kmer << 2) | code) & mask;
        valid += 1;
        if valid >= k && !f(idx + 1 - k, kmer) {
            return;
        }
    }
}

/// An allele strand worth aligning, with the contig windows to align it in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Index into `AlleleCatalog::alleles`
    pub allele_index: usize,
    pub strand: Strand,
    /// Half-open contig ranges, sorted and disjoint
    pub windows: Vec<(usize, usize)>,
}

/// Finds the (allele, strand) pairs worth aligning against one contig
pub struct CandidateFinder<'a> {
    catalog: &'a AlleleCatalog,
    index: &'a SeedIndex,
}

impl<'a> CandidateFinder<'a> {
    pub fn new(catalog: &'a AlleleCatalog, index: &'a SeedIndex) -> Self {
        Self { catalog, index }
    }

    /// Gap room either side of a seeded diagonal
    fn slack(&self, allele: &ReferenceAllele) -> usize {
        allele.len() / 2 + self.index.seed_length()
    }

    /// Candidates for one allele, at most one per strand.
    ///
    /// Alleles shorter than the seed length cannot be seeded and are
    /// aligned against the whole contig on both strands.
    #[must_use]
    pub fn candidates_for(&self, allele_index: usize, allele: &ReferenceAllele) -> Vec<Candidate> {
        if allele.len() < self.index.seed_length() {
            return Strand::BOTH
                .iter()
                .map(|&strand| Candidate {
                    allele_index,
                    strand,
                    windows: vec![(0, self.index.contig_length)],
                })
                .collect();
        }

        let slack = self.slack(allele);
        let mut candidates = Vec::with_capacity(2);
        for strand in Strand::BOTH {
            let windows = match strand {
                Strand::Forward => self.index.seed_windows(allele.sequence(), slack),
                Strand::Reverse => self
                    .index
                    .seed_windows(&reverse_complement(allele.sequence()), slack),
            };
            if !windows.is_empty() {
                candidates.push(Candidate {
                    allele_index,
                    strand,
                    windows,
                });
            }
        }
        candidates
    }

    /// All candidates, in catalog order then strand order
    #[must_use]
    pub fn find_candidates(&self) -> Vec<Candidate> {
        self.catalog
            .alleles
            .iter()
            .enumerate()
            .flat_map(|(idx, allele)| self.candidates_for(idx, allele))
            .collect()
    }
}
