//! Read depth over the unmapped regions from a BAM of reads aligned to the
//! reference.
//!
//! Regions are found on the concatenated reference, so they are translated
//! back to the reference contigs with [`ContigLayout::locate`] before
//! `samtools bedcov` sees them. A region that straddles a contig boundary
//! becomes several BED lines sharing its name and is summed back together.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::core::config::RunConfig;
use crate::core::contig::ContigLayout;
use crate::parsing::bedcov::parse_bedcov_text;
use crate::stages::extract::UnmappedRegion;
use crate::tools::requirements::SAMTOOLS;
use crate::tools::{Invocation, ToolRunner};
use crate::utils::outdir::create_dir;

/// Depth summary for one unmapped region
#[derive(Debug, Clone, PartialEq)]
pub struct RegionCoverage {
    pub name: String,
    pub length: u64,
    pub depth_sum: u64,
}

impl RegionCoverage {
    #[must_use]
    pub fn mean_depth(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.depth_sum as f64 / self.length as f64;
        mean
    }
}

#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub bed: PathBuf,
    pub summary: PathBuf,
    pub regions: Vec<RegionCoverage>,
}

/// Existing index next to the BAM, as `samtools index` names it
fn existing_index(bam: &Path) -> Option<PathBuf> {
    let mut appended = bam.as_os_str().to_os_string();
    appended.push(".bai");
    [PathBuf::from(appended), bam.with_extension("bai")]
        .into_iter()
        .find(|p| p.is_file())
}

/// Write the BED file of unmapped regions on the original reference contigs.
/// Returns the number of lines written.
fn write_bed(path: &Path, layout: &ContigLayout, unmapped: &[UnmappedRegion]) -> anyhow::Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut lines = 0;
    for region in unmapped {
        let spans = layout.locate(region.core.start, region.core.end);
        if spans.is_empty() {
            warn!("Region {} lies outside the reference, skipping", region.name);
        }
        for span in spans {
            writer.write_record([
                span.contig,
                span.start.to_string(),
                span.end.to_string(),
                region.name.clone(),
            ])?;
            lines += 1;
        }
    }
    writer.flush()?;
    Ok(lines)
}

/// Index the BAM if needed, run `samtools bedcov` over the unmapped regions and
/// write `coverage/<prefix>_coverage.tsv`.
///
/// # Errors
///
/// Fails if samtools exits unsuccessfully or its output cannot be parsed.
pub fn region_coverage(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    bam: &Path,
    layout: &ContigLayout,
    unmapped: &[UnmappedRegion],
) -> anyhow::Result<Option<CoverageReport>> {
    if unmapped.is_empty() {
        warn!("No unmapped regions, skipping coverage");
        return Ok(None);
    }

    let dir = config.subdir("coverage");
    create_dir(&dir)?;

    let bam_arg: OsString = if let Some(index) = existing_index(bam) {
        debug!("Using BAM index {}", index.display());
        bam.as_os_str().to_os_string()
    } else {
        let index = config.prefixed(&dir, ".bai");
        info!("Indexing {}", bam.display());
        runner.run(
            &Invocation::new(SAMTOOLS)
                .arg("index")
                .arg(bam)
                .arg(&index),
        )?;
        // htslib syntax for an index stored away from its BAM
        let mut arg = bam.as_os_str().to_os_string();
        arg.push("##idx##");
        arg.push(index.as_os_str());
        arg
    };

    let bed = config.prefixed(&dir, "_unmapped.bed");
    let lines = write_bed(&bed, layout, unmapped)?;
    debug!("Wrote {} BED intervals to {}", lines, bed.display());

    let bedcov = config.prefixed(&dir, "_bedcov.tsv");
    info!("Computing read depth over {} unmapped regions", unmapped.len());
    runner.run(
        &Invocation::new(SAMTOOLS)
            .arg("bedcov")
            .arg(&bed)
            .arg(bam_arg)
            .stdout_to(&bedcov),
    )?;

    let text = std::fs::read_to_string(&bedcov)
        .with_context(|| format!("Failed to read {}", bedcov.display()))?;
    let rows = parse_bedcov_text(&text)
        .with_context(|| format!("Failed to parse {}", bedcov.display()))?;

    let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
    for row in &rows {
        let Some(name) = row.name.as_deref() else {
            continue;
        };
        let entry = totals.entry(name).or_default();
        entry.0 += row.end.saturating_sub(row.start);
        entry.1 += row.depth_sum;
    }

    let regions: Vec<RegionCoverage> = unmapped
        .iter()
        .map(|region| {
            let (length, depth_sum) = totals.get(region.name.as_str()).copied().unwrap_or_default();
            RegionCoverage {
                name: region.name.clone(),
                length,
                depth_sum,
            }
        })
        .collect();

    let summary = config.prefixed(&dir, "_coverage.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&summary)
        .with_context(|| format!("Failed to create {}", summary.display()))?;
    writer.write_record(["Region", "Length", "DepthSum", "MeanDepth"])?;
    for region in &regions {
        writer.write_record([
            region.name.clone(),
            region.length.to_string(),
            region.depth_sum.to_string(),
            format!("{:.2}", region.mean_depth()),
        ])?;
    }
    writer.flush()?;

    let uncovered = regions.iter().filter(|r| r.depth_sum == 0).count();
    if uncovered > 0 {
        info!("{} unmapped regions have no read coverage", uncovered);
    }

    Ok(Some(CoverageReport {
        bed,
        summary,
        regions,
    }))
}
