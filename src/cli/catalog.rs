use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::catalog::store::AlleleCatalog;
use crate::cli::{CatalogSource, OutputFormat};
use crate::core::allele::ReferenceAllele;
use crate::core::types::{AlleleId, ResistanceClass};

#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommands,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List gene families in the catalog
    List {
        #[command(flatten)]
        source: CatalogSource,

        /// Only families conferring this class (e.g. "beta-lactam")
        #[arg(long)]
        class: Option<String>,
    },

    /// Show an allele, or every allele of a gene family
    Show {
        /// Allele ID (e.g. "blaTEM-1_1") or gene family
        #[arg(required = true)]
        id: String,

        #[command(flatten)]
        source: CatalogSource,
    },

    /// Export the catalog to a JSON file
    Export {
        /// Output file path
        #[arg(required = true)]
        output: PathBuf,

        #[command(flatten)]
        source: CatalogSource,
    },
}

/// Execute catalog subcommand
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded, the requested entry
/// does not exist, or the export cannot be written.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: CatalogArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        CatalogCommands::List { source, class } => {
            let catalog = source.load(verbose)?;
            let class = class
                .map(|label| {
                    ResistanceClass::parse(&label)
                        .ok_or_else(|| anyhow::anyhow!("Unknown resistance class '{label}'"))
                })
                .transpose()?;
            run_list(&catalog, class, format)
        }
        CatalogCommands::Show { id, source } => run_show(&source.load(verbose)?, &id, format),
        CatalogCommands::Export { output, source } => run_export(&source.load(verbose)?, output),
    }
}

/// One row of `catalog list`
#[derive(serde::Serialize)]
struct FamilySummary<'a> {
    family: &'a str,
    alleles: usize,
    classes: Vec<ResistanceClass>,
    mutation_targets: usize,
}

fn family_summary<'a>(catalog: &'a AlleleCatalog, family: &'a str) -> FamilySummary<'a> {
    let mut classes: Vec<ResistanceClass> = Vec::new();
    let mut alleles = 0;
    for allele in catalog.family(family) {
        alleles += 1;
        classes.extend(allele.classes.iter().copied());
    }
    classes.sort_unstable();
    classes.dedup();
    FamilySummary {
        family,
        alleles,
        classes,
        mutation_targets: catalog.mutation_targets(family).len(),
    }
}

fn join_classes(classes: &[ResistanceClass]) -> String {
    classes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn run_list(
    catalog: &AlleleCatalog,
    class: Option<ResistanceClass>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let rows: Vec<FamilySummary<'_>> = catalog
        .families()
        .into_iter()
        .map(|family| family_summary(catalog, family))
        .filter(|row| class.map_or(true, |c| row.classes.contains(&c)))
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Tsv => {
            println!("family\talleles\tmutation_targets\tclasses");
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.family,
                    row.alleles,
                    row.mutation_targets,
                    join_classes(&row.classes)
                );
            }
        }
    }
    Ok(())
}

fn run_show(catalog: &AlleleCatalog, id: &str, format: OutputFormat) -> anyhow::Result<()> {
    let alleles: Vec<&ReferenceAllele> = match catalog.get(&AlleleId::new(id)) {
        Some(allele) => vec![allele],
        None => catalog.family(id).collect(),
    };
    if alleles.is_empty() {
        anyhow::bail!("No allele or gene family named '{id}' in the catalog");
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = alleles
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "id": a.id,
                        "family": a.family,
                        "allele": a.allele,
                        "accession": a.accession,
                        "length": a.len(),
                        "classes": a.classes,
                        "min_identity": a.min_identity,
                        "note": a.note,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("id\tfamily\tallele\taccession\tlength\tmin_identity\tclasses");
            for a in &alleles {
                let classes: Vec<ResistanceClass> = a.classes.iter().copied().collect();
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    a.id,
                    a.family,
                    a.allele,
                    a.accession.as_deref().unwrap_or(""),
                    a.len(),
                    a.min_identity.map(|v| v.to_string()).unwrap_or_default(),
                    join_classes(&classes)
                );
            }
        }
    }
    Ok(())
}

fn run_export(catalog: &AlleleCatalog, output: PathBuf) -> anyhow::Result<()> {
    let json = catalog.to_json()?;
    std::fs::write(&output, json)?;

    eprintln!(
        "Exported {} alleles to {}",
        catalog.len(),
        output.display()
    );

    Ok(())
}
