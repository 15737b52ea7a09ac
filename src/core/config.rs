use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

/// Placeholder `--proteindb` value inherited from earlier releases, which used
/// it as the default when no database was bundled.
pub const PROTEINDB_PLACEHOLDER: &str = "nodb";

/// Bases added on each side of an unmapped region unless `--flanking` says otherwise
pub const DEFAULT_FLANKING: u64 = 100;

/// Default run prefix: today's date as `YYYYMMDD`
#[must_use]
pub fn default_prefix() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Everything one pipeline run needs, resolved from the command line.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub draft: PathBuf,
    pub reference: Option<PathBuf>,
    pub prefix: String,
    pub outdir: PathBuf,
    pub force: bool,
    pub flanking: u64,
    pub proteindb: Option<PathBuf>,
    pub tandem_repeats: bool,
    pub mash_selection: Option<PathBuf>,
    pub kmers: Option<usize>,
    pub quast: bool,
    pub coverage: Option<PathBuf>,
}

impl RunConfig {
    /// A configuration with only the mandatory inputs set and every optional
    /// stage disabled.
    pub fn new(draft: impl Into<PathBuf>, outdir: impl Into<PathBuf>) -> Self {
        Self {
            draft: draft.into(),
            reference: None,
            prefix: default_prefix(),
            outdir: outdir.into(),
            force: false,
            flanking: DEFAULT_FLANKING,
            proteindb: None,
            tandem_repeats: false,
            mash_selection: None,
            kmers: None,
            quast: false,
            coverage: None,
        }
    }

    /// Join a file name below the output directory, prefixed with the run prefix
    #[must_use]
    pub fn prefixed(&self, dir: &Path, suffix: &str) -> PathBuf {
        dir.join(format!("{}{suffix}", self.prefix))
    }

    #[must_use]
    pub fn subdir(&self, name: &str) -> PathBuf {
        self.outdir.join(name)
    }

    #[must_use]
    pub fn alignment_dir(&self) -> PathBuf {
        self.subdir("alignment")
    }

    #[must_use]
    pub fn summary_dir(&self) -> PathBuf {
        self.subdir("summary")
    }

    #[must_use]
    pub fn backbone_path(&self) -> PathBuf {
        self.prefixed(&self.alignment_dir(), ".backbone")
    }

    #[must_use]
    pub fn concatenated_reference_path(&self) -> PathBuf {
        self.prefixed(&self.outdir, "_concatenated.fasta")
    }

    #[must_use]
    pub fn mapped_fasta(&self) -> PathBuf {
        self.prefixed(&self.outdir, "_mappedregions.fasta")
    }

    #[must_use]
    pub fn unmapped_fasta(&self) -> PathBuf {
        self.prefixed(&self.outdir, "_unmappedregions.fasta")
    }

    #[must_use]
    pub fn conflict_fasta(&self) -> PathBuf {
        self.prefixed(&self.outdir, "_conflictregions.fasta")
    }
}
