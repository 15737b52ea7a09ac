//! Tandem repeat detection in the unmapped regions with Tandem Repeats Finder.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{info, warn};

use crate::core::config::RunConfig;
use crate::parsing::trf::{parse_trf_ngs, SequenceRepeats};
use crate::stages::extract::UnmappedRegion;
use crate::tools::requirements::TRF;
use crate::tools::{Invocation, ToolError, ToolRunner};
use crate::utils::outdir::create_dir;

/// Match, mismatch, indel, match probability, indel probability, minimum
/// score and maximum period, in the order `trf` expects them
pub const TRF_PARAMETERS: [&str; 7] = ["2", "7", "7", "80", "10", "50", "500"];

#[derive(Debug, Clone)]
pub struct RepeatReport {
    pub dat: PathBuf,
    pub summary: PathBuf,
    pub sequences: Vec<SequenceRepeats>,
}

/// Run `trf` on the unmapped regions and write `tandem_repeats/<prefix>_trf.dat`
/// and a per-region `tandem_repeats/<prefix>_trf_summary.tsv`.
///
/// `trf` reports the number of repeats it found through its exit status, so a
/// non-zero exit is accepted as long as the output file was written.
///
/// # Errors
///
/// Fails if `trf` cannot be started, dies from a signal, or leaves output that
/// cannot be parsed.
pub fn find_repeats(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    unmapped_fasta: &Path,
    unmapped: &[UnmappedRegion],
) -> anyhow::Result<Option<RepeatReport>> {
    if unmapped.is_empty() {
        warn!("No unmapped regions, skipping tandem repeat search");
        return Ok(None);
    }

    let dir = config.subdir("tandem_repeats");
    create_dir(&dir)?;
    let dat = config.prefixed(&dir, "_trf.dat");
    // trf runs inside its output directory
    let input = std::fs::canonicalize(unmapped_fasta)
        .with_context(|| format!("Cannot resolve {}", unmapped_fasta.display()))?;

    info!("Searching tandem repeats in {} regions", unmapped.len());
    let invocation = Invocation::new(TRF)
        .arg(input)
        .args(TRF_PARAMETERS)
        .args(["-h", "-ngs"])
        .stdout_to(&dat)
        .current_dir(&dir);
    match runner.run(&invocation) {
        Ok(_) => {}
        Err(ToolError::Failed {
            code: Some(code), ..
        }) if dat.is_file() => {
            warn!("{TRF} exited with status {code}, using its output anyway");
        }
        Err(e) => return Err(e.into()),
    }

    let text = std::fs::read_to_string(&dat)
        .with_context(|| format!("Failed to read {}", dat.display()))?;
    let sequences = parse_trf_ngs(&text)
        .with_context(|| format!("Failed to parse {}", dat.display()))?;

    let summary = config.prefixed(&dir, "_trf_summary.tsv");
    write_summary(&summary, unmapped, &sequences)?;
    let with_repeats = sequences.iter().filter(|s| !s.repeats.is_empty()).count();
    info!(
        "{} of {} unmapped regions contain tandem repeats",
        with_repeats,
        unmapped.len()
    );

    Ok(Some(RepeatReport {
        dat,
        summary,
        sequences,
    }))
}

fn write_summary(
    path: &Path,
    unmapped: &[UnmappedRegion],
    sequences: &[SequenceRepeats],
) -> anyhow::Result<()> {
    let by_name: HashMap<&str, &SequenceRepeats> =
        sequences.iter().map(|s| (s.name.as_str(), s)).collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record([
        "Region",
        "Repeats",
        "CoveredBases",
        "CoveredFraction",
        "MaxScore",
    ])?;

    for region in unmapped {
        let (count, covered, score) = by_name
            .get(region.name.as_str())
            .map_or((0, 0, 0), |s| (s.repeats.len(), s.covered_bases(), s.max_score()));
        #[allow(clippy::cast_precision_loss)]
        let fraction = if region.sequence.is_empty() {
            0.0
        } else {
            covered as f64 / region.sequence.len() as f64
        };
        writer.write_record([
            region.name.clone(),
            count.to_string(),
            covered.to_string(),
            format!("{fraction:.4}"),
            score.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
