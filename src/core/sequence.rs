//! Nucleotide sequence statistics used by the region summaries.

/// Amino acid columns of the unmapped-region summary, in output order
pub const AMINO_ACIDS: [u8; 20] = [
    b'A', b'D', b'E', b'G', b'F', b'L', b'Y', b'C', b'W', b'P', b'H', b'Q', b'I', b'M', b'T',
    b'N', b'S', b'K', b'R', b'V',
];

/// NCBI translation table 11 (bacterial, archaeal and plant plastid code),
/// codons ordered T, C, A, G at each position.
const TABLE_11: &[u8; 64] = b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// GC percentage (0-100). `S` (G or C) counts towards GC; an empty sequence
/// yields 0.
#[must_use]
pub fn gc_content(seq: &[u8]) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq
        .iter()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C' | b'S'))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let pct = gc as f64 / seq.len() as f64 * 100.0;
    pct
}

#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            b'a' => b't',
            b't' => b'a',
            b'c' => b'g',
            b'g' => b'c',
            other => other,
        })
        .collect()
}

/// Translate with table 11, dropping a trailing partial codon.
/// Codons containing ambiguous bases translate to `X`.
#[must_use]
pub fn translate(seq: &[u8]) -> Vec<u8> {
    seq.chunks_exact(3)
        .map(|codon| {
            match (
                base_index(codon[0]),
                base_index(codon[1]),
                base_index(codon[2]),
            ) {
                (Some(a), Some(b), Some(c)) => TABLE_11[a * 16 + b * 4 + c],
                _ => b'X',
            }
        })
        .collect()
}

/// Residue composition over the six reading frames of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SixFrameComposition {
    /// Percentage of each residue in [`AMINO_ACIDS`] order
    pub amino_acids: [f64; 20],
    /// Percentage of stop codons
    pub stop: f64,
}

impl SixFrameComposition {
    /// Translate the three forward and three reverse frames and report each
    /// residue as a percentage of all translated positions.
    #[must_use]
    pub fn compute(seq: &[u8]) -> Self {
        let mut counts = [0usize; 256];
        let mut total = 0usize;

        let reverse = reverse_complement(seq);
        for strand in [seq, reverse.as_slice()] {
            for frame in 0..3 {
                if frame >= strand.len() {
                    continue;
                }
                let protein = translate(&strand[frame..]);
                total += protein.len();
                for residue in protein {
                    counts[usize::from(residue)] += 1;
                }
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64 * 100.0
            }
        };

        let mut amino_acids = [0.0; 20];
        for (slot, residue) in amino_acids.iter_mut().zip(AMINO_ACIDS) {
            *slot = pct(counts[usize::from(residue)]);
        }

        Self {
            amino_acids,
            stop: pct(counts[usize::from(b'*')]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gc_content() {
        assert!((gc_content(b"GGCC") - 100.0).abs() < f64::EPSILON);
        assert!((gc_content(b"ACGT") - 50.0).abs() < f64::EPSILON);
        assert!((gc_content(b"atat")).abs() < f64::EPSILON);
        assert!((gc_content(b"")).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"AACGTN"), b"NACGTT");
    }

    #[test]
    fn test_translate_table_11() {
        assert_eq!(translate(b"ATGTTTTAA"), b"MF*");
        assert_eq!(translate(b"TGGGGGCC"), b"WG");
        assert_eq!(translate(b"ANGAAA"), b"XK");
    }

    #[test]
    fn test_six_frame_composition_sums_to_hundred() {
        let comp = SixFrameComposition::compute(b"ATGAAACCCGGGTTTTAGCAT");
        let total: f64 = comp.amino_acids.iter().sum::<f64>() + comp.stop;
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_six_frame_composition_homopolymer() {
        // AAAAAA: forward frames give K, reverse frames give F
        let comp = SixFrameComposition::compute(b"AAAAAA");
        let lys = AMINO_ACIDS.iter().position(|&a| a == b'K').unwrap();
        let phe = AMINO_ACIDS.iter().position(|&a| a == b'F').unwrap();
        assert!((comp.amino_acids[lys] - 50.0).abs() < 1e-9);
        assert!((comp.amino_acids[phe] - 50.0).abs() < 1e-9);
        assert!(comp.stop.abs() < f64::EPSILON);
    }

    #[test]
    fn test_six_frame_composition_short_sequence() {
        let comp = SixFrameComposition::compute(b"AC");
        assert!(comp.amino_acids.iter().all(|v| *v == 0.0));
    }
}
