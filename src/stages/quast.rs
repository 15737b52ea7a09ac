//! QUAST statistics of the unmapped regions against the reference.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::core::config::RunConfig;
use crate::tools::requirements::QUAST;
use crate::tools::{Invocation, ToolRunner};

/// Run `quast.py` with the unmapped regions as assembly and the reference the
/// draft was aligned to.
///
/// Returns the QUAST output directory, `<outdir>/quast`, which QUAST creates,
/// or `None` when there is no unmapped region to assess.
///
/// # Errors
///
/// Fails if `quast.py` exits unsuccessfully.
pub fn assess(
    config: &RunConfig,
    runner: &dyn ToolRunner,
    unmapped_fasta: &Path,
    unmapped_count: usize,
    reference: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    if unmapped_count == 0 {
        warn!("No unmapped regions, skipping QUAST");
        return Ok(None);
    }

    let dir = config.subdir("quast");
    info!("Assessing {} unmapped regions with QUAST", unmapped_count);
    runner.run(
        &Invocation::new(QUAST)
            .arg(unmapped_fasta)
            .arg("-r")
            .arg(reference)
            .arg("-o")
            .arg(&dir),
    )?;

    let report = dir.join("report.tsv");
    if report.is_file() {
        info!("QUAST report written to {}", report.display());
    }
    Ok(Some(dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::testing::FakeRunner;
    use crate::tools::ToolError;

    #[test]
    fn test_quast_runs_on_unmapped_regions() {
        let mut config = RunConfig::new("draft.fasta", "out");
        config.prefix = "Q".to_string();
        let runner = FakeRunner::new();

        let dir = assess(&config, &runner, &config.unmapped_fasta(), 2, Path::new("ref.fasta"))
            .unwrap();
        assert_eq!(dir, Some(PathBuf::from("out/quast")));

        let call = &runner.calls.borrow()[0];
        assert_eq!(call.tool, QUAST);
        assert_eq!(call.args[0], config.unmapped_fasta().as_os_str());
        let args: Vec<String> = call
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            ["out/Q_unmappedregions.fasta", "-r", "ref.fasta", "-o", "out/quast"]
        );
    }

    #[test]
    fn test_skips_without_unmapped_regions() {
        let config = RunConfig::new("draft.fasta", "out");
        let runner = FakeRunner::new();

        let dir = assess(&config, &runner, &config.unmapped_fasta(), 0, Path::new("ref.fasta"))
            .unwrap();
        assert!(dir.is_none());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_quast_failure_propagates() {
        let config = RunConfig::new("draft.fasta", "out");
        let runner = FakeRunner::with_hook(|inv| {
            Err(ToolError::Failed {
                tool: inv.tool.clone(),
                code: Some(4),
                stderr: "ERROR! Reference file is empty".to_string(),
            })
        });

        let err = assess(&config, &runner, &config.unmapped_fasta(), 1, Path::new("ref.fasta"))
            .unwrap_err();
        assert!(err.to_string().contains("Reference file is empty"));
    }
}
