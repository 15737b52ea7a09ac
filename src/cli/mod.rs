//! Command-line interface for saspector.
//!
//! ## Usage
//!
//! ```text
//! # Compare a draft assembly with a known reference
//! saspector --draft draft.fasta --reference PAO1.fasta --outdir results
//!
//! # Let mash pick the reference, search proteins and look for repeats
//! saspector -d draft.fasta --mash_selection refseq.msh --proteindb card.faa \
//!     --tandem_repeats -o results --force
//!
//! # Read depth over the unmapped regions
//! saspector -d draft.fasta -r PAO1.fasta -c reads_vs_PAO1.bam -o results
//! ```

use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{default_prefix, RunConfig, DEFAULT_FLANKING};

#[derive(Parser, Debug)]
#[command(name = "saspector")]
#[command(version)]
#[command(about = "Inspect what a draft bacterial assembly misses against a reference")]
#[command(
    long_about = "SASpector aligns a draft assembly to a closed reference genome and extracts the reference regions the draft does not contain.\n\nThe unmapped regions are written as FASTA and summarized (GC content, six-frame amino acid composition), annotated with prokka and optionally searched against a protein database, compared by k-mer content, scanned for tandem repeats and checked for read coverage."
)]
pub struct Cli {
    /// Draft assembly (FASTA)
    #[arg(short, long)]
    pub draft: PathBuf,

    /// Reference genome (FASTA); multi-contig references are concatenated
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Prefix for output files [default: current date as YYYYMMDD]
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output directory; must not exist unless --force is given
    #[arg(short, long)]
    pub outdir: PathBuf,

    /// Remove an existing output directory before running
    #[arg(short, long)]
    pub force: bool,

    /// Bases added on each side of the unmapped regions
    #[arg(long, default_value_t = DEFAULT_FLANKING)]
    pub flanking: u64,

    /// Protein FASTA searched with blastx against the unmapped regions
    #[arg(long)]
    pub proteindb: Option<PathBuf>,

    /// Search the unmapped regions for tandem repeats with trf
    #[arg(short, long = "tandem_repeats")]
    pub tandem_repeats: bool,

    /// Mash sketch of candidate references; the closest one is used
    #[arg(short, long = "mash_selection")]
    pub mash_selection: Option<PathBuf>,

    /// Compare the unmapped regions by k-mers of this length
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=32))]
    pub kmers: Option<u8>,

    /// Assess the draft against the reference with QUAST
    #[arg(short, long)]
    pub quast: bool,

    /// BAM of reads mapped to the reference; reports depth over unmapped regions
    #[arg(short, long)]
    pub coverage: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve the parsed arguments into a run configuration
    #[must_use]
    pub fn into_config(self) -> RunConfig {
        RunConfig {
            draft: self.draft,
            reference: self.reference,
            prefix: self.prefix.unwrap_or_else(default_prefix),
            outdir: self.outdir,
            force: self.force,
            flanking: self.flanking,
            proteindb: self.proteindb,
            tandem_repeats: self.tandem_repeats,
            mash_selection: self.mash_selection,
            kmers: self.kmers.map(usize::from),
            quast: self.quast,
            coverage: self.coverage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["saspector", "-d", "draft.fasta", "-o", "out"]).unwrap();
        let config = cli.into_config();
        assert_eq!(config.flanking, DEFAULT_FLANKING);
        assert_eq!(config.prefix, default_prefix());
        assert!(config.reference.is_none());
        assert!(!config.tandem_repeats);
        assert!(config.kmers.is_none());
    }

    #[test]
    fn test_underscore_flags() {
        let cli = Cli::try_parse_from([
            "saspector",
            "--draft",
            "draft.fasta",
            "--outdir",
            "out",
            "--mash_selection",
            "refs.msh",
            "--tandem_repeats",
            "--kmers",
            "21",
            "--prefix",
            "PA01",
        ])
        .unwrap();
        let config = cli.into_config();
        assert_eq!(config.mash_selection, Some(PathBuf::from("refs.msh")));
        assert!(config.tandem_repeats);
        assert_eq!(config.kmers, Some(21));
        assert_eq!(config.prefix, "PA01");
    }

    #[test]
    fn test_kmer_range() {
        for k in ["0", "33"] {
            let result =
                Cli::try_parse_from(["saspector", "-d", "d.fa", "-o", "out", "--kmers", k]);
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_required_arguments() {
        assert!(Cli::try_parse_from(["saspector", "-o", "out"]).is_err());
        assert!(Cli::try_parse_from(["saspector", "-d", "draft.fasta"]).is_err());
    }
}
