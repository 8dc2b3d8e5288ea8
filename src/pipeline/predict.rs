use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::store::AlleleCatalog;
use crate::core::contig::{Contig, Genome};
use crate::core::report::{Caveat, ContigSummary, GenomeReport, ResistanceProfile, ResolvedCall};
use crate::matching::aligner::AlignmentError;
use crate::matching::engine::AligningMatcher;
use crate::matching::filter::HitFilter;
use crate::matching::mutation::find_point_mutations;
use crate::matching::overlap::{flag_contig_edges, OverlapResolver};
use crate::matching::phenotype::{PhenotypeMapper, UnmappedAlleleError};
use crate::parsing::fasta::ParseError;
use crate::pipeline::config::{ConfigError, MultiContigPolicy, PredictionConfig};

/// Failure that aborts one genome
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error(transparent)]
    UnmappedAllele(#[from] UnmappedAlleleError),

    #[error("Alignment failed: {0}")]
    Alignment(#[from] AlignmentError),

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

impl From<ParseError> for PredictionError {
    fn from(e: ParseError) -> Self {
        Self::MalformedInput(e.to_string())
    }
}

impl PredictionError {
    /// Stable snake_case name of the error kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedInput(_) => "malformed_input",
            Self::UnmappedAllele(_) => "unmapped_allele",
            Self::Alignment(_) => "alignment",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}

/// Predict the resistance profile of a single-contig genome.
///
/// The report is named after the contig.
///
/// # Errors
///
/// Returns `PredictionError::InvalidConfig` if `config` fails validation,
/// `PredictionError::Alignment` for an alignment failure other than a
/// timeout and `PredictionError::UnmappedAllele` if the catalog is
/// inconsistent with the calls made from it.
pub fn predict(
    contig: &Contig,
    catalog: &AlleleCatalog,
    config: &PredictionConfig,
) -> Result<GenomeReport, PredictionError> {
    config.validate()?;
    let contigs = std::slice::from_ref(contig);
    let mut caveats = Vec::new();
    if contig.ambiguous_bases > 0 {
        caveats.push(Caveat::AmbiguousBases {
            count: contig.ambiguous_bases,
        });
    }
    run(&contig.id, contigs, catalog, config, caveats)
}

/// Predict the resistance profile of a genome, applying the multi-contig
/// policy.
///
/// # Errors
///
/// Returns `PredictionError::MalformedInput` for a genome without contigs or
/// a multi-contig genome under `MultiContigPolicy::Reject`, otherwise as
/// [`predict`].
pub fn predict_genome(
    genome: &Genome,
    catalog: &AlleleCatalog,
    config: &PredictionConfig,
) -> Result<GenomeReport, PredictionError> {
    config.validate()?;
    if genome.contigs.is_empty() {
        return Err(PredictionError::MalformedInput(format!(
            "Genome {} has no contigs",
            genome.id
        )));
    }

    let mut caveats = Vec::new();
    if !genome.is_single_contig() {
        let count = genome.contigs.len();
        match config.multi_contig {
            MultiContigPolicy::Reject => {
                return Err(PredictionError::MalformedInput(format!(
                    "Genome {} has {count} contigs; expected one complete assembly",
                    genome.id
                )));
            }
            MultiContigPolicy::Flag => {
                warn!(
                    "Genome {} has {count} contigs; analyzing all of them",
                    genome.id
                );
                caveats.push(Caveat::MultipleContigs { count });
            }
        }
    }

    let ambiguous = genome.ambiguous_bases();
    if ambiguous > 0 {
        caveats.push(Caveat::AmbiguousBases { count: ambiguous });
    }

    run(&genome.id, &genome.contigs, catalog, config, caveats)
}

/// Build the report for a genome from its resolved calls and profile.
///
/// Never fails; no calls gives an empty profile.
#[must_use]
pub fn assemble(
    genome_id: impl Into<String>,
    calls: Vec<ResolvedCall>,
    profile: ResistanceProfile,
) -> GenomeReport {
    GenomeReport {
        genome_id: genome_id.into(),
        contigs: Vec::new(),
        calls,
        profile,
        point_mutations: Vec::new(),
        gene_presence: BTreeMap::new(),
        caveats: Vec::new(),
    }
}

fn run(
    genome_id: &str,
    contigs: &[Contig],
    catalog: &AlleleCatalog,
    config: &PredictionConfig,
    mut caveats: Vec<Caveat>,
) -> Result<GenomeReport, PredictionError> {
    let outcome = AligningMatcher::new(catalog, config).find_alignments_in(contigs)?;
    let aligned = outcome.alignments.len();
    caveats.extend(outcome.caveats);

    let hits = HitFilter::from_config(catalog, config).filter(outcome.alignments);
    let passing = hits.len();
    let mut calls = OverlapResolver::from_config(config).resolve(hits);
    flag_contig_edges(&mut calls, contigs, config.edge_distance);
    debug!(
        "{genome_id}: {aligned} alignments, {passing} passed thresholds, {} loci",
        calls.len()
    );

    let mapper = PhenotypeMapper::new(catalog);
    let mut profile = mapper.map_to_phenotypes(&calls)?;

    let mut point_mutations = Vec::new();
    for call in &calls {
        let allele = mapper.allele_for(call)?;
        let targets = catalog.mutation_targets(&allele.family);
        if targets.is_empty() {
            continue;
        }
        if let Some(contig) = contigs.iter().find(|c| c.id == call.hit.contig_id) {
            point_mutations.extend(find_point_mutations(call, allele, targets, contig));
        }
    }
    mapper.add_point_mutations(&mut profile, &point_mutations);
    let gene_presence = mapper.gene_presence(&calls)?;

    let mut report = assemble(genome_id, calls, profile);
    report.contigs = contigs
        .iter()
        .map(|c| ContigSummary {
            id: c.id.clone(),
            length: c.length,
            md5: c.md5.clone(),
        })
        .collect();
    report.point_mutations = point_mutations;
    report.gene_presence = gene_presence;
    report.caveats = caveats;

    info!(
        "{genome_id}: {} calls, {} point mutations, {} resistance classes",
        report.calls.len(),
        report.point_mutations.len(),
        report.profile.len()
    );
    Ok(report)
}
