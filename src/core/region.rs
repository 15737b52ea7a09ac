use std::fmt;

use serde::{Deserialize, Serialize};

/// How a backbone interval relates the reference to the draft assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Present in both genomes with the same orientation
    Mapped,
    /// Present in the reference only
    Unmapped,
    /// Present in the draft only
    Conflict,
    /// Present in both genomes with opposite orientation
    Reverse,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mapped => "mapped",
            Self::Unmapped => "unmapped",
            Self::Conflict => "conflict",
            Self::Reverse => "reverse",
        };
        f.write_str(name)
    }
}

/// A genomic interval, 1-based and inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub start: u64,
    pub end: u64,
}

impl Region {
    /// Build a region from two (possibly negative) backbone coordinates.
    ///
    /// The sign only carries orientation, so absolute values are kept and the
    /// bounds are ordered.
    #[must_use]
    pub fn from_signed(left: i64, right: i64) -> Self {
        let (a, b) = (left.unsigned_abs(), right.unsigned_abs());
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Number of bases covered
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    /// Distance between the two ends, the measure used for genome fractions
    #[must_use]
    pub fn span(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    /// Extend by `flanking` bases on each side, clamped to `1..=sequence_len`.
    ///
    /// The result never has `start > end`, even for a region lying past the
    /// end of the sequence.
    #[must_use]
    pub fn flanked(&self, flanking: u64, sequence_len: u64) -> Self {
        let end = self.end.saturating_add(flanking).min(sequence_len.max(1));
        Self {
            start: self.start.saturating_sub(flanking).max(1).min(end),
            end,
        }
    }

    /// Slice the bases of this region out of `sequence`.
    ///
    /// Coordinates past the end of the sequence are clamped, so a region lying
    /// entirely outside yields an empty slice.
    #[must_use]
    pub fn extract<'a>(&self, sequence: &'a [u8]) -> &'a [u8] {
        let len = sequence.len();
        let lo = usize::try_from(self.start.saturating_sub(1)).map_or(len, |v| v.min(len));
        let hi = usize::try_from(self.end).map_or(len, |v| v.min(len));
        if lo >= hi {
            &[]
        } else {
            &sequence[lo..hi]
        }
    }

    /// FASTA identifier used for every region file: `<prefix>_<start>:<end>`
    #[must_use]
    pub fn name(&self, prefix: &str) -> String {
        format!("{prefix}_{}:{}", self.start, self.end)
    }
}

/// The four region categories extracted from one alignment.
///
/// Mapped, unmapped and reverse regions are in reference coordinates; conflict
/// regions are in draft coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSets {
    pub mapped: Vec<Region>,
    pub unmapped: Vec<Region>,
    pub conflict: Vec<Region>,
    pub reverse: Vec<Region>,
}

impl RegionSets {
    #[must_use]
    pub fn get(&self, kind: RegionKind) -> &[Region] {
        match kind {
            RegionKind::Mapped => &self.mapped,
            RegionKind::Unmapped => &self.unmapped,
            RegionKind::Conflict => &self.conflict,
            RegionKind::Reverse => &self.reverse,
        }
    }

    pub fn push(&mut self, kind: RegionKind, region: Region) {
        match kind {
            RegionKind::Mapped => self.mapped.push(region),
            RegionKind::Unmapped => self.unmapped.push(region),
            RegionKind::Conflict => self.conflict.push(region),
            RegionKind::Reverse => self.reverse.push(region),
        }
    }

    /// Sum of [`Region::span`] over one category
    #[must_use]
    pub fn total_span(&self, kind: RegionKind) -> u64 {
        self.get(kind).iter().map(Region::span).sum()
    }

    /// Regions aligned in some form: mapped, reverse and conflict
    #[must_use]
    pub fn aligned_count(&self) -> usize {
        self.mapped.len() + self.reverse.len() + self.conflict.len()
    }
}
