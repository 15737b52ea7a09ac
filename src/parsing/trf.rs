//! Parser for Tandem Repeats Finder `-ngs` output.
//!
//! ```text
//! @PA01_2801:3600
//! 120 160 4 10.2 4 95 0 73 25 25 25 25 2.00 ACGT ACGTACGT... GATT... CCAT...
//! ```
//!
//! A line starting with `@` names the sequence; every following line until the
//! next `@` describes one repeat: start, end, period, copy number, consensus
//! size, percent matches, percent indels, score, A/C/G/T composition, entropy,
//! consensus pattern, repeat sequence and (optionally) the flanks.

use crate::parsing::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub struct TandemRepeat {
    pub start: u64,
    pub end: u64,
    pub period: u32,
    pub copies: f64,
    pub score: u32,
    pub consensus: String,
}

/// Repeats reported for one input sequence
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceRepeats {
    pub name: String,
    pub repeats: Vec<TandemRepeat>,
}

impl SequenceRepeats {
    /// Bases covered by at least one repeat
    #[must_use]
    pub fn covered_bases(&self) -> u64 {
        let mut intervals: Vec<(u64, u64)> = self
            .repeats
            .iter()
            .map(|r| (r.start.min(r.end), r.start.max(r.end)))
            .collect();
        intervals.sort_unstable();

        let mut covered = 0;
        let mut current: Option<(u64, u64)> = None;
        for (start, end) in intervals {
            current = match current {
                Some((cs, ce)) if start <= ce + 1 => Some((cs, ce.max(end))),
                Some((cs, ce)) => {
                    covered += ce - cs + 1;
                    Some((start, end))
                }
                None => Some((start, end)),
            };
        }
        if let Some((cs, ce)) = current {
            covered += ce - cs + 1;
        }
        covered
    }

    /// Highest alignment score, 0 without repeats
    #[must_use]
    pub fn max_score(&self) -> u32 {
        self.repeats.iter().map(|r| r.score).max().unwrap_or(0)
    }
}

fn field<T: std::str::FromStr>(fields: &[&str], idx: usize, line_num: usize) -> Result<T, ParseError> {
    fields
        .get(idx)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Invalid or missing field {} on line {line_num} of TRF output",
                idx + 1
            ))
        })
}

/// Parse TRF `-ngs` text. Sequences without repeats do not appear in TRF
/// output and therefore not in the result.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a repeat line before any `@` header
/// or with fewer than 14 well-formed fields.
pub fn parse_trf_ngs(text: &str) -> Result<Vec<SequenceRepeats>, ParseError> {
    let mut sequences: Vec<SequenceRepeats> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line_num = i + 1;

        if let Some(name) = line.strip_prefix('@') {
            sequences.push(SequenceRepeats {
                name: name.trim().to_string(),
                repeats: Vec::new(),
            });
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 14 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} of TRF output has {} fields, expected at least 14",
                fields.len()
            )));
        }

        let repeat = TandemRepeat {
            start: field(&fields, 0, line_num)?,
            end: field(&fields, 1, line_num)?,
            period: field(&fields, 2, line_num)?,
            copies: field(&fields, 3, line_num)?,
            score: field(&fields, 7, line_num)?,
            consensus: fields[13].to_string(),
        };

        let current = sequences.last_mut().ok_or_else(|| {
            ParseError::InvalidFormat(format!(
                "Repeat on line {line_num} of TRF output precedes any sequence header"
            ))
        })?;
        current.repeats.push(repeat);
    }

    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NGS: &str = "@PA01_2801:3600
10 49 4 10.0 4 100 0 80 25 25 25 25 2.00 ACGT ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT AAAA CCCC
40 69 2 15.0 2 96 0 52 50 0 0 50 1.00 AT ATATATATATATATATATATATATATATAT GGGG TTTT
100 120 3 7.0 3 90 5 30 33 33 33 0 1.58 ACG ACGACGACGACGACGACGACG NNNN NNNN
@PA01_6001:6900
5 30 13 2.0 13 88 4 31 30 20 20 30 1.97 ACGTTGCAAGCTA ACGTTGCAAGCTAACGTTGCAAGCT
";

    #[test]
    fn test_parse_trf_ngs() {
        let parsed = parse_trf_ngs(NGS).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "PA01_2801:3600");
        assert_eq!(parsed[0].repeats.len(), 3);
        assert_eq!(parsed[0].repeats[1].consensus, "AT");
        assert_eq!(parsed[1].repeats[0].period, 13);
        assert!((parsed[0].repeats[0].copies - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_covered_bases_merges_overlaps() {
        let parsed = parse_trf_ngs(NGS).unwrap();
        // 10..=69 merged (60 bases) plus 100..=120 (21 bases)
        assert_eq!(parsed[0].covered_bases(), 81);
        assert_eq!(parsed[0].max_score(), 80);
        assert_eq!(parsed[1].covered_bases(), 26);
    }

    #[test]
    fn test_repeat_before_header() {
        let text = "10 49 4 10.0 4 100 0 80 25 25 25 25 2.00 ACGT\n";
        assert!(parse_trf_ngs(text).is_err());
    }

    #[test]
    fn test_short_line() {
        assert!(parse_trf_ngs("@seq\n1 2 3\n").is_err());
    }
}
