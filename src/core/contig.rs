use serde::{Deserialize, Serialize};

/// A single contig of a FASTA input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contig {
    /// Sequence name (first word of the FASTA definition line)
    pub name: String,

    /// Sequence length in bases
    pub length: u64,
}

impl Contig {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            length,
        }
    }
}

/// A piece of a concatenated-coordinate interval located on one original contig.
///
/// `start` is 0-based and `end` exclusive, the convention BED files use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContigSpan {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

/// Position of every contig inside the concatenation of a multi-record FASTA.
///
/// EMBOSS `union` and progressiveMauve both lay contigs end to end in file
/// order without separators, so offset `i` is the sum of the lengths of
/// contigs `0..i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContigLayout {
    contigs: Vec<Contig>,
    offsets: Vec<u64>,
}

impl ContigLayout {
    #[must_use]
    pub fn new(contigs: Vec<Contig>) -> Self {
        let mut offsets = Vec::with_capacity(contigs.len());
        let mut total = 0;
        for contig in &contigs {
            offsets.push(total);
            total += contig.length;
        }
        Self { contigs, offsets }
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    /// Total length of the concatenated sequence
    #[must_use]
    pub fn total_length(&self) -> u64 {
        self.contigs.iter().map(|c| c.length).sum()
    }

    /// Translate a 1-based inclusive interval on the concatenated sequence into
    /// 0-based half-open spans on the original contigs.
    ///
    /// Intervals crossing a contig boundary are split; parts beyond the end of
    /// the last contig are dropped.
    #[must_use]
    pub fn locate(&self, start: u64, end: u64) -> Vec<ContigSpan> {
        let (lo, hi) = (start.min(end).saturating_sub(1), start.max(end));
        let mut spans = Vec::new();

        for (contig, &offset) in self.contigs.iter().zip(&self.offsets) {
            let contig_end = offset + contig.length;
            if hi <= offset || lo >= contig_end {
                continue;
            }
            spans.push(ContigSpan {
                contig: contig.name.clone(),
                start: lo.max(offset) - offset,
                end: hi.min(contig_end) - offset,
            });
        }

        spans
    }
}
