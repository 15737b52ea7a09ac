//! Parser for BLAST tabular output (`-outfmt 6`).

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::parsing::ParseError;

/// One row of the default twelve-column tabular format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlastHit {
    pub qseqid: String,
    pub sseqid: String,
    pub pident: f64,
    pub length: u64,
    pub mismatch: u64,
    pub gapopen: u64,
    pub qstart: i64,
    pub qend: i64,
    pub sstart: i64,
    pub send: i64,
    pub evalue: f64,
    pub bitscore: f64,
}

/// Parse tabular BLAST output
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be read or `ParseError::Csv`
/// if a row does not have twelve well-formed columns.
pub fn parse_blast_tabular(path: &Path) -> Result<Vec<BlastHit>, ParseError> {
    let file = std::fs::File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_reader(file);

    let mut hits = Vec::new();
    for result in reader.deserialize() {
        hits.push(result?);
    }
    Ok(hits)
}

/// Highest-bitscore hit for each query, in order of first appearance.
#[must_use]
pub fn best_hits(hits: &[BlastHit]) -> Vec<BlastHit> {
    let mut order: Vec<&str> = Vec::new();
    let mut best: HashMap<&str, &BlastHit> = HashMap::new();

    for hit in hits {
        match best.get(hit.qseqid.as_str()) {
            Some(current) if current.bitscore >= hit.bitscore => {}
            Some(_) => {
                best.insert(&hit.qseqid, hit);
            }
            None => {
                order.push(&hit.qseqid);
                best.insert(&hit.qseqid, hit);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|q| best.get(q).map(|h| (*h).clone()))
        .collect()
}
