use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::catalog::store::AlleleCatalog;
use crate::cli::{CatalogSource, OutputFormat};
use crate::pipeline::batch::{predict_files, BatchEntry, BatchOutcome};
use crate::pipeline::config::{MultiContigPolicy, PredictionConfig};

#[derive(Args)]
pub struct PredictArgs {
    /// Genome assembly FASTA files (optionally gzip compressed)
    #[arg(required = true)]
    pub genomes: Vec<PathBuf>,

    #[command(flatten)]
    pub source: CatalogSource,

    /// JSON config file; flags below override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum identity for a hit (fraction, e.g. 0.9)
    #[arg(long)]
    pub min_identity: Option<f64>,

    /// Minimum allele coverage for a hit (fraction, e.g. 0.6)
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Shared fraction of the shorter hit above which two hits are one locus
    #[arg(long)]
    pub overlap_fraction: Option<f64>,

    /// Worker threads (0 uses one per core)
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Time limit per allele strand alignment in milliseconds (0 disables)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Seed length for the candidate pre-filter
    #[arg(long)]
    pub seed_length: Option<usize>,

    /// Align every allele against every contig, skipping the seed pre-filter
    #[arg(long)]
    pub no_prefilter: bool,

    /// How to treat genomes with more than one contig
    #[arg(long, value_enum)]
    pub multi_contig: Option<MultiContigArg>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum MultiContigArg {
    Reject,
    Flag,
}

impl From<MultiContigArg> for MultiContigPolicy {
    fn from(arg: MultiContigArg) -> Self {
        match arg {
            MultiContigArg::Reject => MultiContigPolicy::Reject,
            MultiContigArg::Flag => MultiContigPolicy::Flag,
        }
    }
}

impl PredictArgs {
    /// Config file values (or defaults) with command-line overrides applied
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is invalid or an override is out
    /// of range.
    pub fn resolve_config(&self) -> anyhow::Result<PredictionConfig> {
        let mut config = match &self.config {
            Some(path) => PredictionConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PredictionConfig::default(),
        };

        if let Some(v) = self.min_identity {
            config.min_identity = v;
        }
        if let Some(v) = self.min_coverage {
            config.min_coverage = v;
        }
        if let Some(v) = self.overlap_fraction {
            config.overlap_fraction = v;
        }
        if let Some(v) = self.threads {
            config.threads = v;
        }
        if let Some(v) = self.timeout_ms {
            config.alignment_timeout_ms = v;
        }
        if let Some(v) = self.seed_length {
            config.seed_length = v;
        }
        if self.no_prefilter {
            config.prefilter = false;
        }
        if let Some(v) = self.multi_contig {
            config.multi_contig = v.into();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute predict subcommand
///
/// # Errors
///
/// Returns an error if the catalog or config cannot be loaded, or if any
/// genome failed (after every genome's entry has been printed).
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PredictArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.resolve_config()?;
    let catalog = args.source.load(verbose)?;

    if verbose {
        eprintln!(
            "Predicting {} genome(s) with min identity {}, min coverage {}",
            args.genomes.len(),
            config.min_identity,
            config.min_coverage
        );
    }

    let entries = predict_files(&args.genomes, &catalog, &config);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        OutputFormat::Tsv => print_tsv(&entries, &catalog),
    }

    let failed = entries.iter().filter(|e| !e.is_ok()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} genome(s) failed", entries.len());
    }
    Ok(())
}

fn print_tsv(entries: &[BatchEntry], catalog: &AlleleCatalog) {
    println!(
        "genome_id\tstatus\tcontig\tstart\tend\tstrand\tallele\tidentity\tcoverage\tfull_match\tcontig_edge\tclasses"
    );
    for entry in entries {
        match &entry.outcome {
            BatchOutcome::Ok { report } => {
                if report.calls.is_empty() {
                    println!("{}\tsusceptible\t\t\t\t\t\t\t\t\t\t", entry.genome_id);
                }
                for call in &report.calls {
                    let classes = catalog
                        .get(call.allele_id())
                        .map(|allele| {
                            allele
                                .classes
                                .iter()
                                .map(ToString::to_string)
                                .collect::<Vec<_>>()
                                .join(",")
                        })
                        .unwrap_or_default();
                    println!(
                        "{}\tok\t{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{}\t{}\t{}",
                        entry.genome_id,
                        call.hit.contig_id,
                        call.hit.query_start,
                        call.hit.query_end,
                        call.hit.strand,
                        call.allele_id(),
                        call.hit.identity,
                        call.hit.coverage,
                        call.full_match,
                        call.contig_edge,
                        classes
                    );
                }
            }
            BatchOutcome::Failed { error } => {
                println!(
                    "{}\tfailed:{}\t\t\t\t\t\t\t\t\t\t{}",
                    entry.genome_id, error.kind, error.message
                );
            }
        }
    }
}
