//! Option validation, evaluated before any external program runs.
//!
//! Each rule is a plain function over [`RunConfig`] so the incompatible-flag
//! checks can be exercised without touching the filesystem or `$PATH`.

use std::path::Path;

use crate::core::config::{RunConfig, PROTEINDB_PLACEHOLDER};

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no reference genome: provide --reference or --mash_selection")]
    MissingReference,
    #[error("--reference and --mash_selection are incompatible options")]
    ReferenceAndMashSelection,
    #[error("--coverage requires the reference the reads were mapped to and cannot be combined with --mash_selection")]
    CoverageWithMashSelection,
    #[error("--proteindb is set to the placeholder '{PROTEINDB_PLACEHOLDER}': provide a protein FASTA database")]
    ProteinDbPlaceholder,
    #[error("{option} file not found: {path}")]
    InputNotFound { option: &'static str, path: String },
    #[error("--prefix must not be empty or contain path separators: '{0}'")]
    InvalidPrefix(String),
}

/// A named check over the run configuration
pub struct Rule {
    pub name: &'static str,
    pub check: fn(&RunConfig) -> Result<(), ValidationError>,
}

/// Every rule, in the order failures are reported
pub const RULES: &[Rule] = &[
    Rule {
        name: "reference_source",
        check: reference_source,
    },
    Rule {
        name: "reference_exclusive",
        check: reference_exclusive,
    },
    Rule {
        name: "coverage_needs_reference",
        check: coverage_needs_reference,
    },
    Rule {
        name: "proteindb_placeholder",
        check: proteindb_placeholder,
    },
    Rule {
        name: "prefix_is_file_name",
        check: prefix_is_file_name,
    },
    Rule {
        name: "inputs_exist",
        check: inputs_exist,
    },
];

/// A reference must come from somewhere.
///
/// # Errors
///
/// Returns `ValidationError::MissingReference` when neither `--reference`
/// nor `--mash_selection` is given.
pub fn reference_source(config: &RunConfig) -> Result<(), ValidationError> {
    if config.reference.is_none() && config.mash_selection.is_none() {
        return Err(ValidationError::MissingReference);
    }
    Ok(())
}

/// # Errors
///
/// Returns `ValidationError::ReferenceAndMashSelection` when both are given.
pub fn reference_exclusive(config: &RunConfig) -> Result<(), ValidationError> {
    if config.reference.is_some() && config.mash_selection.is_some() {
        return Err(ValidationError::ReferenceAndMashSelection);
    }
    Ok(())
}

/// A BAM file is tied to the reference it was mapped against, which an
/// automatic selection cannot guarantee.
///
/// # Errors
///
/// Returns `ValidationError::CoverageWithMashSelection`.
pub fn coverage_needs_reference(config: &RunConfig) -> Result<(), ValidationError> {
    if config.coverage.is_some() && config.mash_selection.is_some() {
        return Err(ValidationError::CoverageWithMashSelection);
    }
    Ok(())
}

/// # Errors
///
/// Returns `ValidationError::ProteinDbPlaceholder`.
pub fn proteindb_placeholder(config: &RunConfig) -> Result<(), ValidationError> {
    match &config.proteindb {
        Some(db) if db.as_os_str() == PROTEINDB_PLACEHOLDER => {
            Err(ValidationError::ProteinDbPlaceholder)
        }
        _ => Ok(()),
    }
}

/// The prefix names files inside the output directory.
///
/// # Errors
///
/// Returns `ValidationError::InvalidPrefix`.
pub fn prefix_is_file_name(config: &RunConfig) -> Result<(), ValidationError> {
    let prefix = config.prefix.trim();
    if prefix.is_empty() || prefix.contains('/') || prefix.contains('\\') || prefix == ".." {
        return Err(ValidationError::InvalidPrefix(config.prefix.clone()));
    }
    Ok(())
}

/// # Errors
///
/// Returns `ValidationError::InputNotFound` for the first missing input file.
pub fn inputs_exist(config: &RunConfig) -> Result<(), ValidationError> {
    let inputs: [(&'static str, Option<&Path>); 5] = [
        ("--draft", Some(config.draft.as_path())),
        ("--reference", config.reference.as_deref()),
        ("--proteindb", config.proteindb.as_deref()),
        ("--mash_selection", config.mash_selection.as_deref()),
        ("--coverage", config.coverage.as_deref()),
    ];

    for (option, path) in inputs {
        let Some(path) = path else { continue };
        if option == "--proteindb" && path.as_os_str() == PROTEINDB_PLACEHOLDER {
            continue;
        }
        if !path.is_file() {
            return Err(ValidationError::InputNotFound {
                option,
                path: path.display().to_string(),
            });
        }
    }
    Ok(())
}

/// Evaluate every rule and collect all failures.
#[must_use]
pub fn validate(config: &RunConfig) -> Vec<(&'static str, ValidationError)> {
    RULES
        .iter()
        .filter_map(|rule| (rule.check)(config).err().map(|e| (rule.name, e)))
        .collect()
}
