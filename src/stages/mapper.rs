//! Reference normalization and whole-genome alignment with progressiveMauve.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::{debug, info, warn};

use crate::core::config::RunConfig;
use crate::core::contig::{Contig, ContigLayout};
use crate::parsing::fasta::read_records;
use crate::tools::requirements::{PROGRESSIVE_MAUVE, UNION};
use crate::tools::{Invocation, ToolRunner};
use crate::utils::outdir::create_dir;

/// The reference as handed to the aligner
#[derive(Debug, Clone)]
pub struct NormalizedReference {
    /// Single-record FASTA used for alignment and extraction
    pub path: PathBuf,
    /// Contigs of the reference as supplied by the user
    pub layout: ContigLayout,
    pub concatenated: bool,
}

/// Make sure the reference is a single sequence, concatenating a multi-contig
/// reference with EMBOSS `union`.
///
/// # Errors
///
/// Fails if the reference cannot be read or `union` fails.
pub fn normalize_reference(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    reference: &Path,
) -> anyhow::Result<NormalizedReference> {
    let records = read_records(reference)
        .with_context(|| format!("Failed to read reference {}", reference.display()))?;
    let layout = ContigLayout::new(
        records
            .iter()
            .map(|r| Contig::new(r.name.clone(), r.sequence.len() as u64))
            .collect(),
    );

    if layout.len() == 1 {
        debug!("Reference {} is a single contig", reference.display());
        return Ok(NormalizedReference {
            path: reference.to_path_buf(),
            layout,
            concatenated: false,
        });
    }

    let concatenated = config.concatenated_reference_path();
    info!(
        "Reference contains {} contigs, concatenating them to {}",
        layout.len(),
        concatenated.display()
    );
    runner.run(
        &Invocation::new(UNION)
            .arg("-sequence")
            .arg(reference)
            .arg("-outseq")
            .arg(&concatenated),
    )?;

    Ok(NormalizedReference {
        path: concatenated,
        layout,
        concatenated: true,
    })
}

/// Files written by one progressiveMauve run
#[derive(Debug, Clone)]
pub struct Alignment {
    pub alignment: PathBuf,
    pub backbone: PathBuf,
}

/// Align the reference against the draft and collect the outputs in
/// `<outdir>/alignment`.
///
/// # Errors
///
/// Fails if progressiveMauve fails or produces no backbone file.
pub fn align(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    reference: &Path,
) -> anyhow::Result<Alignment> {
    let dir = config.alignment_dir();
    create_dir(&dir)?;
    let alignment = config.prefixed(&dir, ".alignment");
    let backbone = config.backbone_path();

    info!(
        "Aligning {} against {}",
        config.draft.display(),
        reference.display()
    );
    runner.run(
        &Invocation::new(PROGRESSIVE_MAUVE)
            .joined("--output=", &alignment)
            .joined("--backbone-output=", &backbone)
            .arg(reference)
            .arg(&config.draft),
    )?;

    if !backbone.is_file() {
        bail!(
            "{PROGRESSIVE_MAUVE} finished without writing {}",
            backbone.display()
        );
    }

    // progressiveMauve leaves sequence lists beside its inputs
    for input in [reference, config.draft.as_path()] {
        collect_sslist(input, &dir);
    }

    Ok(Alignment {
        alignment,
        backbone,
    })
}

fn collect_sslist(input: &Path, dir: &Path) {
    let mut sslist = input.as_os_str().to_os_string();
    sslist.push(".sslist");
    let sslist = PathBuf::from(sslist);
    let Some(name) = sslist.file_name() else {
        return;
    };
    if !sslist.is_file() {
        return;
    }

    let target = dir.join(name);
    let moved = std::fs::rename(&sslist, &target).or_else(|_| {
        std::fs::copy(&sslist, &target).and_then(|_| std::fs::remove_file(&sslist))
    });
    if let Err(e) = moved {
        warn!("Could not move {} to {}: {e}", sslist.display(), dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::FakeRunner;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> RunConfig {
        let mut config = RunConfig::new(dir.join("draft.fasta"), dir.join("out"));
        config.prefix = "A".to_string();
        std::fs::create_dir_all(&config.outdir).unwrap();
        config
    }

    #[test]
    fn test_single_contig_reference_is_used_directly() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let reference = dir.path().join("ref.fasta");
        std::fs::write(&reference, ">chr\nACGTACGT\n").unwrap();

        let runner = FakeRunner::new();
        let normalized = normalize_reference(&config, &runner, &reference).unwrap();
        assert!(!normalized.concatenated);
        assert_eq!(normalized.path, reference);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_multi_contig_reference_is_concatenated() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let reference = dir.path().join("ref.fasta");
        std::fs::write(&reference, ">chr\nACGTACGT\n>plasmid\nGGCC\n").unwrap();

        let runner = FakeRunner::new();
        let normalized = normalize_reference(&config, &runner, &reference).unwrap();
        assert!(normalized.concatenated);
        assert_eq!(normalized.path, config.concatenated_reference_path());
        assert_eq!(normalized.layout.total_length(), 12);
        assert_eq!(runner.tools(), vec![UNION]);
        let call = &runner.calls.borrow()[0];
        assert_eq!(
            FakeRunner::arg_value(call, "-outseq"),
            Some(config.concatenated_reference_path().display().to_string())
        );
    }

    #[test]
    fn test_align_collects_backbone() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let reference = dir.path().join("ref.fasta");
        let sslist = dir.path().join("ref.fasta.sslist");
        std::fs::write(&sslist, "").unwrap();

        let runner = FakeRunner::with_hook(|inv| {
            let backbone = FakeRunner::arg_value(inv, "--backbone-output=").unwrap();
            std::fs::write(backbone, "seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend\n")
                .unwrap();
            Ok(())
        });

        let alignment = align(&config, &runner, &reference).unwrap();
        assert_eq!(alignment.backbone, config.backbone_path());
        assert!(alignment.backbone.is_file());
        assert!(!sslist.exists());
        assert!(config.alignment_dir().join("ref.fasta.sslist").is_file());

        let call = &runner.calls.borrow()[0];
        assert_eq!(call.tool, PROGRESSIVE_MAUVE);
        assert_eq!(call.args[2], reference.as_os_str());
    }

    #[test]
    fn test_align_without_backbone_fails() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = FakeRunner::new();
        let err = align(&config, &runner, Path::new("ref.fasta")).unwrap_err();
        assert!(err.to_string().contains("without writing"));
    }
}
