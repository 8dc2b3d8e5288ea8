//! Detection of known resistance point mutations inside resolved calls.

use crate::core::alignment::{Alignment, EditOp};
use crate::core::allele::ReferenceAllele;
use crate::core::contig::Contig;
use crate::core::mutation::MutationTarget;
use crate::core::report::{PointMutation, ResolvedCall};
use crate::core::types::Strand;
use crate::utils::nucleotide::{complement, translate_codon};

/// Query bases aligned to each allele position, in allele orientation.
///
/// Index `i` covers allele position `alignment.reference_start + i`; `None`
/// marks a base deleted from the query.
#[must_use]
pub fn aligned_query_bases(alignment: &Alignment, contig: &Contig) -> Vec<Option<u8>> {
    let span = alignment.reference_end - alignment.reference_start;
    let mut observed = vec![None; span];
    let sequence = contig.sequence();

    // Walk columns left to right on the contig; on the reverse strand the
    // allele is read from its end backwards.
    let mut query = alignment.query_start;
    let mut offset = 0usize;
    for op in &alignment.edit_script {
        let slot = match alignment.strand {
            Strand::Forward => offset,
            Strand::Reverse => span.wrapping_sub(offset + 1),
        };
        match op {
            EditOp::Match | EditOp::Mismatch => {
                if let (Some(cell), Some(&base)) = (observed.get_mut(slot), sequence.get(query)) {
                    *cell = Some(match alignment.strand {
                        Strand::Forward => base,
                        Strand::Reverse => complement(base),
                    });
                }
                query += 1;
                offset += 1;
            }
            EditOp::Insertion => query += 1,
            EditOp::Deletion => offset += 1,
        }
    }
    observed
}

/// Residue for a stretch of bases: translated codon or the single nucleotide
fn residue(bases: &[u8], coding: bool) -> String {
    if coding {
        translate_codon(bases).to_string()
    } else {
        String::from_utf8_lossy(bases).into_owned()
    }
}

/// Check one target against the aligned query bases
fn inspect_target(
    target: &MutationTarget,
    call: &ResolvedCall,
    allele: &ReferenceAllele,
    observed: &[Option<u8>],
) -> Option<PointMutation> {
    let (start, end) = target.reference_range()?;
    let hit = &call.hit;
    if start < hit.reference_start || end > hit.reference_end || end > allele.len() {
        return None;
    }

    let reference = &allele.sequence()[start..end];
    let reference_text = String::from_utf8_lossy(reference).into_owned();
    if !target.reference_codons.is_empty() && !target.reference_codons.contains(&reference_text) {
        return None;
    }

    let offset = start - hit.reference_start;
    let query: Vec<u8> = observed[offset..offset + (end - start)]
        .iter()
        .copied()
        .collect::<Option<Vec<u8>>>()?;
    if query == reference {
        return None;
    }

    let query_residue = residue(&query, target.coding);
    if !target.resistance_residues.contains(&query_residue) {
        return None;
    }

    Some(PointMutation {
        target: target.label(),
        gene_id: target.gene_id.clone(),
        allele_id: hit.allele_id.clone(),
        contig_id: hit.contig_id.clone(),
        position: target.position,
        mutations_needed: target.mutations_needed,
        query_codon: String::from_utf8_lossy(&query).into_owned(),
        change: format!("{}->{}", residue(reference, target.coding), query_residue),
        query_residue,
        classes: target.classes.clone(),
    })
}

/// Known resistance mutations carried by a resolved call.
///
/// A target is reported when the alignment covers it, the allele carries an
/// accepted wild-type codon there, and the query residue is one of the
/// resistance residues.
#[must_use]
pub fn find_point_mutations(
    call: &ResolvedCall,
    allele: &ReferenceAllele,
    targets: &[MutationTarget],
    contig: &Contig,
) -> Vec<PointMutation> {
    if targets.is_empty() {
        return Vec::new();
    }
    let observed = aligned_query_bases(&call.hit, contig);
    targets
        .iter()
        .filter_map(|target| inspect_target(target, call, allele, &observed))
        .collect()
}
