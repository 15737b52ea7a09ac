//! Readers and writers for the files exchanged with external tools.
//!
//! - **FASTA**: reference, draft and region files ([`fasta`])
//! - **Mauve backbone**: collinear block coordinates ([`backbone`])
//! - **mash dist**: sketch distances for reference selection ([`mash`])
//! - **TRF `-ngs`**: tandem repeats per region ([`trf`])
//! - **BLAST tabular**: blastx hits ([`blast`])
//! - **samtools bedcov**: summed depth per interval ([`bedcov`])

use std::path::PathBuf;

use thiserror::Error;

pub mod backbone;
pub mod bedcov;
pub mod blast;
pub mod fasta;
pub mod mash;
pub mod trf;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Malformed table: {0}")]
    Csv(#[from] csv::Error),
}
