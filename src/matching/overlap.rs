//! Grouping of overlapping hits into loci and winner selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::core::alignment::Hit;
use crate::core::contig::Contig;
use crate::core::report::ResolvedCall;
use crate::core::types::Strand;
use crate::matching::scoring::count_to_f64;
use crate::pipeline::config::PredictionConfig;

/// Picks one hit per locus.
///
/// Two hits on the same contig belong to the same locus when their shared
/// query span is more than `overlap_fraction` of the shorter range; loci are
/// the connected groups under that relation. The result depends only on the
/// set of hits, never their order.
#[derive(Debug, Clone, Copy)]
pub struct OverlapResolver {
    overlap_fraction: f64,
}

impl OverlapResolver {
    #[must_use]
    pub fn new(overlap_fraction: f64) -> Self {
        Self { overlap_fraction }
    }

    #[must_use]
    pub fn from_config(config: &PredictionConfig) -> Self {
        Self::new(config.overlap_fraction)
    }

    /// Whether two hits compete for the same locus
    #[must_use]
    pub fn overlaps(&self, a: &Hit, b: &Hit) -> bool {
        let shared = a.overlap_len(b);
        if shared == 0 {
            return false;
        }
        let shorter = a.query_len().min(b.query_len());
        count_to_f64(shared) > self.overlap_fraction * count_to_f64(shorter)
    }

    /// Group hits into loci.
    ///
    /// Returns indices into `hits`, each locus sorted by position and loci
    /// ordered by their first hit.
    #[must_use]
    pub fn group(&self, hits: &[Hit]) -> Vec<Vec<usize>> {
        let mut order: Vec<usize> = (0..hits.len()).collect();
        order.sort_by(|&a, &b| position_order(&hits[a], &hits[b]));

        let mut sets = DisjointSets::new(hits.len());
        let mut active: Vec<usize> = Vec::new();
        for &idx in &order {
            let hit = &hits[idx];
            active.retain(|&other| {
                hits[other].contig_id == hit.contig_id && hits[other].query_end > hit.query_start
            });
            for &other in &active {
                if self.overlaps(hit, &hits[other]) {
                    sets.union(idx, other);
                }
            }
            active.push(idx);
        }

        let mut loci: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut first_seen: Vec<Option<usize>> = vec![None; hits.len()];
        for (rank, &idx) in order.iter().enumerate() {
            let root = sets.find(idx);
            let key = *first_seen[root].get_or_insert(rank);
            loci.entry(key).or_default().push(idx);
        }
        loci.into_values().collect()
    }

    /// One call per locus, ordered by contig then query position
    #[must_use]
    pub fn resolve(&self, hits: Vec<Hit>) -> Vec<ResolvedCall> {
        let loci = self.group(&hits);
        let mut calls: Vec<ResolvedCall> = loci
            .into_iter()
            .map(|mut locus| {
                locus.sort_by(|&a, &b| preference_order(&hits[a], &hits[b]));
                let mut call = ResolvedCall::new(hits[locus[0]].clone());
                for &loser in &locus[1..] {
                    let id = &hits[loser].allele_id;
                    if id != call.allele_id() && !call.alternatives.contains(id) {
                        call.alternatives.push(id.clone());
                    }
                }
                call
            })
            .collect();
        calls.sort_by(|a, b| position_order(&a.hit, &b.hit));
        calls
    }
}

/// Flag partial calls that run into the end of their contig
pub fn flag_contig_edges(calls: &mut [ResolvedCall], contigs: &[Contig], edge_distance: usize) {
    for call in calls {
        if let Some(contig) = contigs.iter().find(|c| c.id == call.hit.contig_id) {
            call.mark_contig_edge(contig.len(), edge_distance);
        }
    }
}

fn strand_rank(strand: Strand) -> u8 {
    match strand {
        Strand::Forward => 0,
        Strand::Reverse => 1,
    }
}

/// Contig, then query start, then a total order on the remaining fields
fn position_order(a: &Hit, b: &Hit) -> Ordering {
    a.contig_id
        .cmp(&b.contig_id)
        .then_with(|| a.query_start.cmp(&b.query_start))
        .then_with(|| a.query_end.cmp(&b.query_end))
        .then_with(|| a.allele_id.cmp(&b.allele_id))
        .then_with(|| strand_rank(a.strand).cmp(&strand_rank(b.strand)))
}

/// Winner first: highest identity, highest coverage, smallest allele id
fn preference_order(a: &Hit, b: &Hit) -> Ordering {
    b.identity
        .total_cmp(&a.identity)
        .then_with(|| b.coverage.total_cmp(&a.coverage))
        .then_with(|| a.allele_id.cmp(&b.allele_id))
        .then_with(|| position_order(a, b))
}

/// Union-find over hit indices
struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra.max(rb)] = ra.min(rb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alignment::test_alignment;

    fn hit(allele: &str, contig: &str, range: (usize, usize), identity: f64, coverage: f64) -> Hit {
        Hit(test_alignment(allele, contig, range, identity, coverage))
    }

    fn winners(calls: &[ResolvedCall]) -> Vec<&str> {
        calls.iter().map(|c| c.allele_id().as_str()).collect()
    }

    /// Deterministic permutations without extra dependencies
    fn rotations_and_reversals(hits: &[Hit]) -> Vec<Vec<Hit>> {
        let mut perms = Vec::new();
        for shift in 0..hits.len() {
            let mut rotated = hits.to_vec();
            rotated.rotate_left(shift);
            perms.push(rotated.clone());
            rotated.reverse();
            perms.push(rotated);
        }
        let mut interleaved: Vec<Hit> = hits.iter().step_by(2).cloned().collect();
        interleaved.extend(hits.iter().skip(1).step_by(2).cloned());
        perms.push(interleaved);
        perms
    }

    #[test]
    fn test_overlap_fraction_is_strict() {
        let resolver = OverlapResolver::new(0.5);
        let a = hit("a", "c", (0, 100), 1.0, 1.0);
        let half = hit("b", "c", (50, 150), 1.0, 1.0);
        let more = hit("c", "c", (49, 149), 1.0, 1.0);
        let other_contig = hit("d", "x", (0, 100), 1.0, 1.0);

        assert!(!resolver.overlaps(&a, &half));
        assert!(resolver.overlaps(&a, &more));
        assert!(!resolver.overlaps(&a, &other_contig));
    }

    #[test]
    fn test_shorter_range_sets_the_fraction() {
        let resolver = OverlapResolver::new(0.5);
        let long = hit("long", "c", (0, 1000), 1.0, 1.0);
        let short = hit("short", "c", (900, 1020), 1.0, 1.0);
        // 100 shared bases of a 120 bp hit
        assert!(resolver.overlaps(&long, &short));
    }

    #[test]
    fn test_winner_by_identity_then_coverage_then_id() {
        let resolver = OverlapResolver::new(0.5);

        let calls = resolver.resolve(vec![
            hit("blaTEM_2", "c", (0, 100), 0.95, 1.0),
            hit("blaTEM_1", "c", (2, 100), 0.98, 0.9),
        ]);
        assert_eq!(winners(&calls), vec!["blaTEM_1"]);
        assert_eq!(calls[0].alternatives[0].as_str(), "blaTEM_2");

        let calls = resolver.resolve(vec![
            hit("blaTEM_1", "c", (0, 100), 0.98, 0.9),
            hit("blaTEM_2", "c", (0, 100), 0.98, 1.0),
        ]);
        assert_eq!(winners(&calls), vec!["blaTEM_2"]);

        let calls = resolver.resolve(vec![
            hit("blaTEM_2", "c", (0, 100), 0.98, 1.0),
            hit("blaTEM_10", "c", (0, 100), 0.98, 1.0),
        ]);
        assert_eq!(winners(&calls), vec!["blaTEM_10"]);
    }

    #[test]
    fn test_chained_overlaps_form_one_locus() {
        let resolver = OverlapResolver::new(0.5);
        let calls = resolver.resolve(vec![
            hit("a", "c", (0, 100), 0.99, 1.0),
            hit("b", "c", (40, 140), 0.95, 1.0),
            hit("c", "c", (80, 180), 1.0, 1.0),
        ]);
        assert_eq!(winners(&calls), vec!["c"]);
        assert_eq!(calls[0].alternatives.len(), 2);
    }

    #[test]
    fn test_separate_loci_and_contigs() {
        let resolver = OverlapResolver::new(0.5);
        let calls = resolver.resolve(vec![
            hit("tetA_1", "plasmid", (10, 200), 1.0, 1.0),
            hit("blaTEM_1", "chr", (500, 600), 1.0, 1.0),
            hit("sul1_1", "chr", (0, 100), 1.0, 1.0),
        ]);
        assert_eq!(winners(&calls), vec!["sul1_1", "blaTEM_1", "tetA_1"]);
        assert!(calls.iter().all(|c| c.alternatives.is_empty()));
    }

    #[test]
    fn test_empty_input() {
        assert!(OverlapResolver::new(0.5).resolve(Vec::new()).is_empty());
    }

    #[test]
    fn test_resolution_ignores_input_order() {
        let resolver = OverlapResolver::new(0.5);
        let hits = vec![
            hit("blaTEM_1", "c", (100, 961), 0.99, 1.0),
            hit("blaTEM_2", "c", (100, 961), 0.99, 1.0),
            hit("blaSHV_1", "c", (120, 980), 0.91, 1.0),
            hit("tetA_1", "c", (2000, 3200), 0.97, 0.95),
            hit("tetB_1", "c", (2500, 3700), 0.97, 0.95),
            hit("sul1_1", "c", (5000, 5840), 1.0, 1.0),
            hit("sul2_1", "c", (5400, 6200), 1.0, 1.0),
            hit("qnrS_1", "p", (0, 657), 0.96, 1.0),
        ];
        let expected = resolver.resolve(hits.clone());

        for permuted in rotations_and_reversals(&hits) {
            assert_eq!(resolver.resolve(permuted), expected);
        }
    }

    #[test]
    fn test_calls_never_overlap_beyond_fraction() {
        let resolver = OverlapResolver::new(0.5);
        let hits: Vec<Hit> = (0..40)
            .map(|i| {
                let start = (i * 37) % 900;
                let len = 50 + (i * 13) % 120;
                hit(&format!("allele_{i:02}"), "c", (start, start + len), 0.9 + f64::from(i as u8 % 10) * 0.01, 1.0)
            })
            .collect();

        for permuted in rotations_and_reversals(&hits) {
            let calls = resolver.resolve(permuted);
            for (i, a) in calls.iter().enumerate() {
                for b in &calls[i + 1..] {
                    assert!(!resolver.overlaps(&a.hit, &b.hit));
                }
            }
        }
    }

    #[test]
    fn test_flag_contig_edges() {
        let contigs = [Contig::new("c", &[b'A'; 300])];
        let mut calls = vec![
            ResolvedCall::new(hit("x", "c", (0, 100), 1.0, 0.7)),
            ResolvedCall::new(hit("y", "c", (150, 200), 1.0, 0.7)),
        ];
        flag_contig_edges(&mut calls, &contigs, 25);
        assert!(calls[0].contig_edge);
        assert!(!calls[1].contig_edge);
    }
}
