//! Parser for `samtools bedcov` output: the input BED columns followed by
//! the sum of per-base read depth over the interval.

use csv::StringRecord;
use serde::Deserialize;

use crate::parsing::ParseError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BedCoverage {
    pub contig: String,
    pub start: u64,
    pub end: u64,
    pub name: Option<String>,
    pub depth_sum: u64,
}

impl BedCoverage {
    /// Mean depth over the interval, 0 for an empty interval
    #[must_use]
    pub fn mean_depth(&self) -> f64 {
        let len = self.end.saturating_sub(self.start);
        if len == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.depth_sum as f64 / len as f64;
        mean
    }
}

/// Parse `samtools bedcov` text
///
/// The BED input may carry any number of columns; the fourth is taken as the
/// interval name when present and the depth sum is always the last column.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than four columns,
/// or `ParseError::Csv` for non-numeric coordinates or depth.
pub fn parse_bedcov_text(text: &str) -> Result<Vec<BedCoverage>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() < 4 {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} of bedcov output has fewer than 4 fields"
            )));
        }

        let name = if record.len() > 4 { &record[3] } else { "" };
        let columns = StringRecord::from(vec![
            &record[0],
            &record[1],
            &record[2],
            name,
            &record[record.len() - 1],
        ]);
        rows.push(columns.deserialize(None)?);
    }

    Ok(rows)
}
