//! Presence checks for the external programs a run depends on.

use std::ffi::OsStr;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::core::config::RunConfig;

pub const PROGRESSIVE_MAUVE: &str = "progressiveMauve";
pub const PROKKA: &str = "prokka";
pub const BLASTX: &str = "blastx";
pub const UNION: &str = "union";
pub const SAMTOOLS: &str = "samtools";
pub const TRF: &str = "trf";
pub const QUAST: &str = "quast.py";
pub const MASH: &str = "mash";
pub const PYANI: &str = "average_nucleotide_identity.py";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RequirementsError {
    #[error("required program(s) not found in $PATH: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// Programs needed for the stages this configuration enables, mandatory ones first.
#[must_use]
pub fn required_tools(config: &RunConfig) -> Vec<&'static str> {
    let mut tools = vec![PROGRESSIVE_MAUVE, PROKKA, BLASTX, UNION];
    if config.coverage.is_some() {
        tools.push(SAMTOOLS);
    }
    if config.tandem_repeats {
        tools.push(TRF);
    }
    if config.quast {
        tools.push(QUAST);
    }
    if config.mash_selection.is_some() {
        tools.push(MASH);
        tools.push(PYANI);
    }
    tools
}

/// Look each program up on `search_path` (or `$PATH` when `None`) and return
/// the ones that cannot be found.
#[must_use]
pub fn missing_tools<P: AsRef<OsStr>>(tools: &[&str], search_path: Option<P>) -> Vec<String> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let search_path = search_path
        .map(|p| p.as_ref().to_os_string())
        .or_else(|| std::env::var_os("PATH"));

    tools
        .iter()
        .filter(|tool| {
            match which::which_in(tool, search_path.as_ref(), &cwd) {
                Ok(found) => {
                    debug!("Found {} at {}", tool, found.display());
                    false
                }
                Err(_) => true,
            }
        })
        .map(|tool| (*tool).to_string())
        .collect()
}

/// Fail if any program required by `config` is missing from `$PATH`.
///
/// # Errors
///
/// Returns `RequirementsError::Missing` naming every absent program.
pub fn check_requirements(config: &RunConfig) -> Result<(), RequirementsError> {
    let missing = missing_tools::<&OsStr>(&required_tools(config), None);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RequirementsError::Missing(missing))
    }
}
