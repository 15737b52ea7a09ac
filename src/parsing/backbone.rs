//! Parser for progressiveMauve `.backbone` files.
//!
//! A backbone file is a tab-separated table with one row per locally collinear
//! block and a pair of columns per genome:
//!
//! ```text
//! seq0_leftend	seq0_rightend	seq1_leftend	seq1_rightend
//! 1	2900	1	2900
//! 2901	3500	0	0
//! -3501	-4200	2901	3600
//! ```
//!
//! Genome 0 is the reference and genome 1 the draft. A `0` pair means the block
//! is absent from that genome; negative values mark reverse-complement
//! orientation.

use std::path::Path;

use serde::Deserialize;

use crate::core::region::{Region, RegionKind, RegionSets};
use crate::parsing::ParseError;

/// One row of a two-genome backbone file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BackboneRow {
    pub seq0_leftend: i64,
    pub seq0_rightend: i64,
    pub seq1_leftend: i64,
    pub seq1_rightend: i64,
}

impl BackboneRow {
    fn reference_absent(&self) -> bool {
        self.seq0_leftend == 0 && self.seq0_rightend == 0
    }

    fn draft_absent(&self) -> bool {
        self.seq1_leftend == 0 && self.seq1_rightend == 0
    }

    fn reference_forward(&self) -> bool {
        self.seq0_leftend > 0 && self.seq0_rightend > 0
    }

    fn draft_forward(&self) -> bool {
        self.seq1_leftend > 0 && self.seq1_rightend > 0
    }

    /// Classify the row and return the region in the coordinates that matter
    /// for its category, or `None` if neither genome holds the block.
    #[must_use]
    pub fn classify(&self) -> Option<(RegionKind, Region)> {
        let reference = Region::from_signed(self.seq0_leftend, self.seq0_rightend);
        let draft = Region::from_signed(self.seq1_leftend, self.seq1_rightend);

        match (self.reference_absent(), self.draft_absent()) {
            (true, true) => None,
            (false, true) => Some((RegionKind::Unmapped, reference)),
            (true, false) => Some((RegionKind::Conflict, draft)),
            (false, false) if self.reference_forward() == self.draft_forward() => {
                Some((RegionKind::Mapped, reference))
            }
            (false, false) => Some((RegionKind::Reverse, reference)),
        }
    }
}

/// Parse a backbone file from disk.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened or `ParseError::Csv`
/// if the header or a row is malformed.
pub fn parse_backbone_file(path: &Path) -> Result<Vec<BackboneRow>, ParseError> {
    let file = std::fs::File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_backbone_reader(file)
}

/// Parse backbone text already in memory
///
/// # Errors
///
/// Returns `ParseError::Csv` if the header or a row is malformed.
pub fn parse_backbone_text(text: &str) -> Result<Vec<BackboneRow>, ParseError> {
    parse_backbone_reader(text.as_bytes())
}

fn parse_backbone_reader<R: std::io::Read>(reader: R) -> Result<Vec<BackboneRow>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Sort backbone rows into the four region categories, keeping file order.
#[must_use]
pub fn classify_rows(rows: &[BackboneRow]) -> RegionSets {
    let mut sets = RegionSets::default();
    for (kind, region) in rows.iter().filter_map(BackboneRow::classify) {
        sets.push(kind, region);
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKBONE: &str = "seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend
1\t2900\t1\t2900
2901\t3500\t0\t0
-3501\t-4200\t2901\t3600
0\t0\t3601\t3700
4201\t5000\t-3701\t-4500
5001\t5400\t0\t0
0\t0\t0\t0
";

    #[test]
    fn test_parse_backbone_text() {
        let rows = parse_backbone_text(BACKBONE).unwrap();
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[2].seq0_leftend, -3501);
        assert_eq!(rows[3].seq1_rightend, 3700);
    }

    #[test]
    fn test_classify_rows() {
        let rows = parse_backbone_text(BACKBONE).unwrap();
        let sets = classify_rows(&rows);

        assert_eq!(sets.mapped, vec![Region { start: 1, end: 2900 }]);
        assert_eq!(
            sets.unmapped,
            vec![
                Region { start: 2901, end: 3500 },
                Region { start: 5001, end: 5400 }
            ]
        );
        assert_eq!(sets.conflict, vec![Region { start: 3601, end: 3700 }]);
        assert_eq!(
            sets.reverse,
            vec![
                Region { start: 3501, end: 4200 },
                Region { start: 4201, end: 5000 }
            ]
        );
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let text = "seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend\n1\tabc\t1\t2\n";
        assert!(matches!(parse_backbone_text(text), Err(ParseError::Csv(_))));
    }

    #[test]
    fn test_parse_header_only() {
        let text = "seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend\n";
        let rows = parse_backbone_text(text).unwrap();
        assert!(rows.is_empty());
        assert_eq!(classify_rows(&rows), RegionSets::default());
    }
}
