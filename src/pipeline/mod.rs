//! Orchestration of one SASpector run.
//!
//! [`preflight`] rejects bad option combinations and missing programs before
//! anything touches the filesystem; [`run`] then executes the stages strictly
//! in order and stops at the first failure. Nothing is retried or rolled back:
//! whatever earlier stages wrote stays in the output directory.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use serde::Serialize;
use tracing::{error, info};

use crate::core::config::RunConfig;
use crate::stages::extract::{extract_regions, ReferenceSummary};
use crate::stages::{annotate, coverage, kmer, mapper, quast, repeats, select};
use crate::tools::requirements::check_requirements;
use crate::tools::ToolRunner;
use crate::utils::outdir::prepare_output_dir;
use crate::utils::validation::validate;

/// Outcome of a completed run, also written to `<outdir>/<prefix>_run.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub config: RunConfig,
    /// Reference the draft was aligned to, as supplied or selected
    pub reference: PathBuf,
    pub reference_concatenated: bool,
    pub mash_distance: Option<f64>,
    pub reference_summary: ReferenceSummary,
    pub mapped_regions: usize,
    pub unmapped_regions: usize,
    pub conflict_regions: usize,
    pub reverse_regions: usize,
    pub regions_with_protein_hits: Option<usize>,
    pub kmer_clusters: Option<usize>,
    pub regions_with_repeats: Option<usize>,
    pub quast_dir: Option<PathBuf>,
    pub coverage_table: Option<PathBuf>,
    pub elapsed_secs: f64,
}

/// Validate options, check `$PATH` and create the output directory.
///
/// Every failing validation rule is logged before the run is rejected.
///
/// # Errors
///
/// Fails on the first category of problem found: invalid options, missing
/// programs, or an output directory that cannot be prepared.
pub fn preflight(config: &RunConfig) -> anyhow::Result<()> {
    let failures = validate(config);
    if let Some((_, first)) = failures.first() {
        for (rule, err) in &failures {
            error!("{rule}: {err}");
        }
        bail!("invalid options: {first}");
    }

    check_requirements(config)?;
    prepare_output_dir(&config.outdir, config.force)?;
    Ok(())
}

/// Run every enabled stage against a prepared output directory.
///
/// # Errors
///
/// Returns the first stage failure with context naming the stage.
pub fn run(config: &RunConfig, runner: &dyn ToolRunner) -> anyhow::Result<RunSummary> {
    let started = Instant::now();

    let (reference, mash_distance) = match (&config.reference, &config.mash_selection) {
        (Some(reference), _) => (reference.clone(), None),
        (None, Some(sketch)) => {
            let selection = select::select_reference(config, runner, sketch)
                .context("Reference selection failed")?;
            (selection.reference, Some(selection.hit.distance))
        }
        (None, None) => bail!("no reference genome available"),
    };

    let normalized = mapper::normalize_reference(config, runner, &reference)
        .context("Reference normalization failed")?;
    let alignment =
        mapper::align(config, runner, &normalized.path).context("Genome alignment failed")?;

    let extraction = extract_regions(config, &normalized.path, &alignment.backbone)
        .context("Region extraction failed")?;
    let unmapped_fasta = config.unmapped_fasta();

    let annotation = annotate::annotate(config, runner, &unmapped_fasta, extraction.unmapped.len())
        .context("Annotation failed")?;

    let kmer_clusters = match config.kmers {
        Some(k) => {
            let report = kmer::compare_regions(config, &extraction.unmapped, k)
                .context("K-mer comparison failed")?;
            Some(report.clusters.iter().max().copied().unwrap_or(0))
        }
        None => None,
    };

    let regions_with_repeats = if config.tandem_repeats {
        repeats::find_repeats(config, runner, &unmapped_fasta, &extraction.unmapped)
            .context("Tandem repeat search failed")?
            .map(|report| {
                report
                    .sequences
                    .iter()
                    .filter(|s| !s.repeats.is_empty())
                    .count()
            })
    } else {
        None
    };

    let quast_dir = if config.quast {
        quast::assess(
            config,
            runner,
            &unmapped_fasta,
            extraction.unmapped.len(),
            &reference,
        )
        .context("QUAST failed")?
    } else {
        None
    };

    let coverage_table = match &config.coverage {
        Some(bam) => coverage::region_coverage(
            config,
            runner,
            bam,
            &normalized.layout,
            &extraction.unmapped,
        )
        .context("Coverage computation failed")?
        .map(|report| report.summary),
        None => None,
    };

    let summary = RunSummary {
        config: config.clone(),
        reference,
        reference_concatenated: normalized.concatenated,
        mash_distance,
        reference_summary: extraction.reference_summary.clone(),
        mapped_regions: extraction.regions.mapped.len(),
        unmapped_regions: extraction.regions.unmapped.len(),
        conflict_regions: extraction.regions.conflict.len(),
        reverse_regions: extraction.regions.reverse.len(),
        regions_with_protein_hits: annotation
            .blastx_best_hits
            .as_ref()
            .map(|_| annotation.regions_with_hits),
        kmer_clusters,
        regions_with_repeats,
        quast_dir,
        coverage_table,
        elapsed_secs: started.elapsed().as_secs_f64(),
    };

    let path = config.prefixed(&config.outdir, "_run.json");
    let json = serde_json::to_string_pretty(&summary)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(
        "SASpector finished in {:.1}s: {} unmapped regions, {:.2}% of the reference mapped",
        summary.elapsed_secs, summary.unmapped_regions, summary.reference_summary.fraction_mapped
    );
    Ok(summary)
}

/// Preflight checks followed by the full run.
///
/// # Errors
///
/// As [`preflight`] and [`run`].
pub fn execute(config: &RunConfig, runner: &dyn ToolRunner) -> anyhow::Result<RunSummary> {
    preflight(config)?;
    run(config, runner)
}
