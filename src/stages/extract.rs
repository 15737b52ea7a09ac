//! Region extraction from the backbone file and the summary tables built on it.

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::core::config::RunConfig;
use crate::core::region::{Region, RegionKind, RegionSets};
use crate::core::sequence::{gc_content, SixFrameComposition, AMINO_ACIDS};
use crate::parsing::backbone::{classify_rows, parse_backbone_file};
use crate::parsing::fasta::{read_concatenated, write_records};
use crate::utils::outdir::create_dir;

/// An unmapped region after flanking, with its bases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmappedRegion {
    pub name: String,
    /// Region as found in the backbone
    pub core: Region,
    /// Region extended by the flanking bases
    pub flanked: Region,
    pub sequence: Vec<u8>,
}

/// Reference-wide statistics (`summary/<prefix>_referencesummary.tsv`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReferenceSummary {
    #[serde(rename = "GCContent")]
    pub gc_content: f64,
    pub length: u64,
    pub number_mapped_regions: usize,
    pub number_unmapped_regions: usize,
    pub fraction_mapped: f64,
    pub fraction_unmapped: f64,
}

impl ReferenceSummary {
    #[must_use]
    pub fn compute(reference: &[u8], regions: &RegionSets) -> Self {
        let length = reference.len() as u64;
        let aligned = regions.total_span(RegionKind::Mapped)
            + regions.total_span(RegionKind::Conflict)
            + regions.total_span(RegionKind::Reverse);
        let unmapped = regions.total_span(RegionKind::Unmapped);

        #[allow(clippy::cast_precision_loss)]
        let pct = |bases: u64| {
            if length == 0 {
                0.0
            } else {
                bases as f64 / length as f64 * 100.0
            }
        };

        Self {
            gc_content: gc_content(reference),
            length,
            number_mapped_regions: regions.aligned_count(),
            number_unmapped_regions: regions.unmapped.len(),
            fraction_mapped: pct(aligned),
            fraction_unmapped: pct(unmapped),
        }
    }
}

/// Everything later stages need from the extraction
#[derive(Debug, Clone)]
pub struct Extraction {
    pub regions: RegionSets,
    pub unmapped: Vec<UnmappedRegion>,
    pub reference_summary: ReferenceSummary,
}

/// Parse the backbone, write region FASTA files and the summary tables.
///
/// # Errors
///
/// Fails if the backbone, reference or draft cannot be parsed or an output
/// file cannot be written.
pub fn extract_regions(
    config: &RunConfig,
    reference: &Path,
    backbone: &Path,
) -> anyhow::Result<Extraction> {
    let rows = parse_backbone_file(backbone)
        .with_context(|| format!("Failed to parse backbone {}", backbone.display()))?;
    let regions = classify_rows(&rows);
    info!(
        "Backbone: {} mapped, {} unmapped, {} conflict, {} reverse regions",
        regions.mapped.len(),
        regions.unmapped.len(),
        regions.conflict.len(),
        regions.reverse.len()
    );

    let (_, reference_seq) = read_concatenated(reference)
        .with_context(|| format!("Failed to read reference {}", reference.display()))?;
    let reference_len = reference_seq.len() as u64;

    let (inside, outside): (Vec<Region>, Vec<Region>) = regions
        .unmapped
        .iter()
        .copied()
        .partition(|r| r.start <= reference_len);
    for region in &outside {
        warn!(
            "Unmapped region {}-{} lies past the end of the reference ({} bp), skipping",
            region.start, region.end, reference_len
        );
    }

    let unmapped: Vec<UnmappedRegion> = inside
        .iter()
        .map(|core| {
            let flanked = core.flanked(config.flanking, reference_len);
            UnmappedRegion {
                name: flanked.name(&config.prefix),
                core: *core,
                flanked,
                sequence: flanked.extract(&reference_seq).to_vec(),
            }
        })
        .collect();

    write_records(
        &config.mapped_fasta(),
        regions
            .mapped
            .iter()
            .map(|r| (r.name(&config.prefix), r.extract(&reference_seq))),
    )?;
    write_records(
        &config.unmapped_fasta(),
        unmapped
            .iter()
            .map(|r| (r.name.clone(), r.sequence.as_slice())),
    )?;

    // Conflict coordinates refer to the draft, laid out as Mauve concatenates it
    let (_, draft_seq) = read_concatenated(&config.draft)
        .with_context(|| format!("Failed to read draft {}", config.draft.display()))?;
    write_records(
        &config.conflict_fasta(),
        regions
            .conflict
            .iter()
            .map(|r| (r.name(&config.prefix), r.extract(&draft_seq))),
    )?;

    let reference_summary = ReferenceSummary::compute(&reference_seq, &regions);
    write_summaries(config, &reference_summary, &unmapped)?;

    Ok(Extraction {
        regions,
        unmapped,
        reference_summary,
    })
}

fn write_summaries(
    config: &RunConfig,
    reference_summary: &ReferenceSummary,
    unmapped: &[UnmappedRegion],
) -> anyhow::Result<()> {
    let dir = config.summary_dir();
    create_dir(&dir)?;

    let path = config.prefixed(&dir, "_referencesummary.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.serialize(reference_summary)?;
    writer.flush()?;

    let path = config.prefixed(&dir, "_unmapsummary.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let mut header = vec![
        "Region".to_string(),
        "GCContent".to_string(),
        "Length".to_string(),
    ];
    header.extend(AMINO_ACIDS.iter().map(|&aa| char::from(aa).to_string()));
    header.push("Stop".to_string());
    writer.write_record(&header)?;

    for region in unmapped {
        let composition = SixFrameComposition::compute(&region.sequence);
        let mut record = vec![
            region.name.clone(),
            gc_content(&region.sequence).to_string(),
            region.sequence.len().to_string(),
        ];
        record.extend(composition.amino_acids.iter().map(ToString::to_string));
        record.push(composition.stop.to_string());
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}
