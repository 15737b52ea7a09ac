//! Automatic reference selection from a mash sketch.
//!
//! `mash dist` ranks every genome in the sketch against the draft; the closest
//! one becomes the reference. pyani then computes ANIm between the draft and
//! the chosen genome so the choice can be checked afterwards.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tracing::info;

use crate::core::config::RunConfig;
use crate::parsing::mash::{closest, parse_mash_file, MashHit};
use crate::tools::requirements::{MASH, PYANI};
use crate::tools::{Invocation, ToolRunner};
use crate::utils::outdir::create_dir;

#[derive(Debug, Clone)]
pub struct Selection {
    pub reference: PathBuf,
    pub hit: MashHit,
    pub ani_dir: PathBuf,
}

/// Sketch entries usually hold the path used when the sketch was built; a
/// relative one is tried against the working directory first, then the
/// sketch's directory.
fn resolve_sketch_entry(entry: &str, sketch: &Path) -> Option<PathBuf> {
    let candidate = PathBuf::from(entry);
    if candidate.is_file() {
        return Some(candidate);
    }
    if candidate.is_relative() {
        let beside = sketch.parent()?.join(&candidate);
        if beside.is_file() {
            return Some(beside);
        }
    }
    None
}

/// Pick the sketch genome closest to the draft and run ANI against it.
///
/// # Errors
///
/// Fails if mash or pyani exit unsuccessfully, if mash reports no hit, or if
/// the selected genome cannot be found on disk.
pub fn select_reference(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    sketch: &Path,
) -> anyhow::Result<Selection> {
    let mash_dir = config.subdir("mash");
    create_dir(&mash_dir)?;
    let dist_path = config.prefixed(&mash_dir, "_mash_dist.tsv");

    info!("Selecting reference from sketch {}", sketch.display());
    runner.run(
        &Invocation::new(MASH)
            .arg("dist")
            .arg(sketch)
            .arg(&config.draft)
            .stdout_to(&dist_path),
    )?;

    let hits = parse_mash_file(&dist_path)
        .with_context(|| format!("Failed to read mash distances from {}", dist_path.display()))?;
    let Some(best) = closest(&hits) else {
        bail!("mash reported no distances against {}", sketch.display());
    };

    let Some(reference) = resolve_sketch_entry(&best.reference, sketch) else {
        bail!(
            "selected reference '{}' is not readable; sketch entries must point to FASTA files",
            best.reference
        );
    };
    info!(
        "Selected reference {} (mash distance {:.4}, {:.1}% shared hashes)",
        reference.display(),
        best.distance,
        best.shared_fraction().unwrap_or(0.0) * 100.0
    );

    let ani_dir = run_ani(config, runner, &reference)?;

    Ok(Selection {
        reference,
        hit: best.clone(),
        ani_dir,
    })
}

fn run_ani(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    reference: &Path,
) -> anyhow::Result<PathBuf> {
    // pyani compares every FASTA file in one input directory
    let input_dir = config.subdir("ani_input");
    create_dir(&input_dir)?;
    // Role prefixes keep a draft and reference with the same file name apart
    for (role, genome) in [("draft", config.draft.as_path()), ("reference", reference)] {
        let name = genome
            .file_name()
            .with_context(|| format!("{} has no file name", genome.display()))?;
        let mut staged = OsString::from(format!("{role}_"));
        staged.push(name);
        std::fs::copy(genome, input_dir.join(staged))
            .with_context(|| format!("Failed to stage {} for ANI", genome.display()))?;
    }

    let ani_dir = config.subdir("ani");
    runner.run(
        &Invocation::new(PYANI)
            .arg("-i")
            .arg(&input_dir)
            .arg("-o")
            .arg(&ani_dir)
            .args(["-m", "ANIm"]),
    )?;
    Ok(ani_dir)
}
