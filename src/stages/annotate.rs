//! Gene prediction on the unmapped regions and protein search against a
//! user-supplied database.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::core::config::RunConfig;
use crate::parsing::blast::{best_hits, parse_blast_tabular};
use crate::tools::requirements::{BLASTX, PROKKA};
use crate::tools::{Invocation, ToolRunner};
use crate::utils::outdir::create_dir;

/// Maximum e-value reported by blastx
pub const BLASTX_EVALUE: &str = "1e-5";

#[derive(Debug, Clone, Default)]
pub struct Annotation {
    pub prokka_dir: Option<PathBuf>,
    pub blastx_hits: Option<PathBuf>,
    pub blastx_best_hits: Option<PathBuf>,
    pub regions_with_hits: usize,
}

/// Run prokka over the unmapped regions, then blastx when `--proteindb` is set.
///
/// Both programs are skipped when there is no unmapped region to annotate.
///
/// # Errors
///
/// Fails if prokka or blastx exit unsuccessfully or the blastx table cannot be
/// parsed.
pub fn annotate(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    unmapped_fasta: &Path,
    unmapped_count: usize,
) -> anyhow::Result<Annotation> {
    let mut annotation = Annotation::default();
    if unmapped_count == 0 {
        warn!("No unmapped regions, skipping gene prediction");
        return Ok(annotation);
    }

    let prokka_dir = config.subdir("prokka");
    info!("Predicting genes in {} unmapped regions", unmapped_count);
    runner.run(
        &Invocation::new(PROKKA)
            .arg("--outdir")
            .arg(&prokka_dir)
            .arg("--prefix")
            .arg(&config.prefix)
            .arg("--force")
            .arg(unmapped_fasta),
    )?;
    annotation.prokka_dir = Some(prokka_dir);

    if let Some(db) = &config.proteindb {
        search_proteins(config, runner, unmapped_fasta, db, &mut annotation)?;
    } else {
        info!("No --proteindb given, skipping blastx");
    }

    Ok(annotation)
}

fn search_proteins(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    query: &Path,
    db: &Path,
    annotation: &mut Annotation,
) -> anyhow::Result<()> {
    let dir = config.subdir("blastx");
    create_dir(&dir)?;
    let hits_path = config.prefixed(&dir, "_blastx.tsv");

    info!("Searching unmapped regions against {}", db.display());
    runner.run(
        &Invocation::new(BLASTX)
            .arg("-query")
            .arg(query)
            .arg("-subject")
            .arg(db)
            .args(["-outfmt", "6", "-evalue", BLASTX_EVALUE])
            .arg("-out")
            .arg(&hits_path),
    )?;

    let hits = parse_blast_tabular(&hits_path)
        .with_context(|| format!("Failed to parse blastx output {}", hits_path.display()))?;
    let best = best_hits(&hits);
    info!(
        "blastx: {} hits, {} regions with a protein match",
        hits.len(),
        best.len()
    );

    let best_path = config.prefixed(&dir, "_blastx_besthits.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&best_path)
        .with_context(|| format!("Failed to create {}", best_path.display()))?;
    for hit in &best {
        writer.serialize(hit)?;
    }
    writer.flush()?;

    annotation.regions_with_hits = best.len();
    annotation.blastx_hits = Some(hits_path);
    annotation.blastx_best_hits = Some(best_path);
    Ok(())
}
