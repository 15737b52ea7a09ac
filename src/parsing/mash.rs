//! Parser for `mash dist` tabular output.
//!
//! Each line holds: reference ID, query ID, Mash distance, p-value and shared
//! hashes (`matching/total`). Reference IDs are the file paths recorded when
//! the sketch was built.

use std::path::Path;

use serde::Deserialize;

use crate::parsing::ParseError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MashHit {
    pub reference: String,
    pub query: String,
    pub distance: f64,
    pub p_value: f64,
    pub shared_hashes: String,
}

impl MashHit {
    /// Fraction of shared sketch hashes, if the field parses as `n/m`
    #[must_use]
    pub fn shared_fraction(&self) -> Option<f64> {
        let (shared, total) = self.shared_hashes.split_once('/')?;
        let shared: f64 = shared.trim().parse().ok()?;
        let total: f64 = total.trim().parse().ok()?;
        (total > 0.0).then(|| shared / total)
    }
}

/// Parse `mash dist` output text
///
/// # Errors
///
/// Returns `ParseError::Csv` if a line does not have the five expected columns.
pub fn parse_mash_text(text: &str) -> Result<Vec<MashHit>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut hits = Vec::new();
    for result in reader.deserialize() {
        hits.push(result?);
    }
    Ok(hits)
}

/// Parse a `mash dist` output file
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be read, otherwise as
/// [`parse_mash_text`].
pub fn parse_mash_file(path: &Path) -> Result<Vec<MashHit>, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mash_text(&text)
}

/// The hit with the smallest distance; the first one wins ties.
#[must_use]
pub fn closest(hits: &[MashHit]) -> Option<&MashHit> {
    hits.iter()
        .reduce(|best, hit| if hit.distance < best.distance { hit } else { best })
}
