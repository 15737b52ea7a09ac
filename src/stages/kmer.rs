//! K-mer comparison of the unmapped regions.
//!
//! Each region is reduced to its set of canonical k-mers. Regions are compared
//! pairwise with the Jaccard index and grouped by single linkage; each region
//! is also checked against the draft to see how much of its sequence is
//! present there in fragments too short to align.

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::core::config::RunConfig;
use crate::parsing::fasta::read_records;
use crate::stages::extract::UnmappedRegion;
use crate::utils::outdir::create_dir;

/// Jaccard index at or above which two regions join the same cluster
pub const CLUSTER_THRESHOLD: f64 = 0.5;

/// Largest k that fits a 2-bit packed `u64`
pub const MAX_K: usize = 32;

fn encode(base: u8) -> Option<u64> {
    match base.to_ascii_uppercase() {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Visit every canonical k-mer of `seq`, skipping windows with non-ACGT bases.
pub fn for_each_kmer(seq: &[u8], k: usize, mut f: impl FnMut(u64)) {
    if k == 0 || k > MAX_K {
        return;
    }
    let mask = if k == MAX_K { u64::MAX } else { (1u64 << (2 * k)) - 1 };
    let shift = 2 * (k as u64 - 1);
    let mut forward = 0u64;
    let mut reverse = 0u64;
    let mut valid = 0usize;

    for &base in seq {
        let Some(code) = encode(base) else {
            valid = 0;
            forward = 0;
            reverse = 0;
            continue;
        };
        forward = ((forward << 2) | code) & mask;
        reverse = (reverse >> 2) | ((3 - code) << shift);
        valid += 1;
        if valid >= k {
            f(forward.min(reverse));
        }
    }
}

#[must_use]
pub fn kmer_set(seq: &[u8], k: usize) -> HashSet<u64> {
    let mut set = HashSet::new();
    for_each_kmer(seq, k, |kmer| {
        set.insert(kmer);
    });
    set
}

/// Jaccard index of two k-mer sets; two empty sets compare as 0
#[must_use]
pub fn jaccard(a: &HashSet<u64>, b: &HashSet<u64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let shared = small.iter().filter(|k| large.contains(k)).count();
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let index = shared as f64 / union as f64;
    index
}

/// Single-linkage clustering over a similarity matrix.
///
/// Returns a cluster number per row, numbered from 1 in order of first
/// appearance.
#[must_use]
pub fn single_linkage(matrix: &[Vec<f64>], threshold: f64) -> Vec<usize> {
    let n = matrix.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if matrix[i][j] >= threshold {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    let mut labels = vec![0; n];
    let mut roots: Vec<usize> = Vec::new();
    for (i, label) in labels.iter_mut().enumerate() {
        let root = find(&mut parent, i);
        let id = match roots.iter().position(|&r| r == root) {
            Some(pos) => pos,
            None => {
                roots.push(root);
                roots.len() - 1
            }
        };
        *label = id + 1;
    }
    labels
}

#[derive(Debug, Clone)]
pub struct KmerReport {
    pub names: Vec<String>,
    pub similarity: Vec<Vec<f64>>,
    pub clusters: Vec<usize>,
    /// Fraction of each region's k-mers also found in the draft
    pub draft_containment: Vec<f64>,
    pub similarity_path: PathBuf,
    pub clusters_path: PathBuf,
}

/// Compare the unmapped regions by k-mer content and write
/// `kmers/<prefix>_kmer_similarity.tsv` and `kmers/<prefix>_kmer_clusters.tsv`.
///
/// # Errors
///
/// Fails if the draft cannot be read or a table cannot be written.
pub fn compare_regions(
    config: &RunConfig,
    unmapped: &[UnmappedRegion],
    k: usize,
) -> anyhow::Result<KmerReport> {
    info!("Comparing {} unmapped regions with k={}", unmapped.len(), k);
    let sets: Vec<HashSet<u64>> = unmapped.iter().map(|r| kmer_set(&r.sequence, k)).collect();

    let n = sets.len();
    let mut similarity = vec![vec![0.0; n]; n];
    for i in 0..n {
        similarity[i][i] = if sets[i].is_empty() { 0.0 } else { 1.0 };
        for j in (i + 1)..n {
            let index = jaccard(&sets[i], &sets[j]);
            similarity[i][j] = index;
            similarity[j][i] = index;
        }
    }
    let clusters = single_linkage(&similarity, CLUSTER_THRESHOLD);

    // Only k-mers of the regions are tracked while streaming the draft
    let wanted: HashSet<u64> = sets.iter().flatten().copied().collect();
    let mut found = HashSet::new();
    let records = read_records(&config.draft)
        .with_context(|| format!("Failed to read draft {}", config.draft.display()))?;
    for record in &records {
        for_each_kmer(&record.sequence, k, |kmer| {
            if wanted.contains(&kmer) {
                found.insert(kmer);
            }
        });
    }
    #[allow(clippy::cast_precision_loss)]
    let draft_containment: Vec<f64> = sets
        .iter()
        .map(|set| {
            if set.is_empty() {
                0.0
            } else {
                set.iter().filter(|k| found.contains(k)).count() as f64 / set.len() as f64
            }
        })
        .collect();

    let names: Vec<String> = unmapped.iter().map(|r| r.name.clone()).collect();
    let dir = config.subdir("kmers");
    create_dir(&dir)?;

    let similarity_path = config.prefixed(&dir, "_kmer_similarity.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&similarity_path)
        .with_context(|| format!("Failed to create {}", similarity_path.display()))?;
    let mut header = vec!["Region".to_string()];
    header.extend(names.iter().cloned());
    writer.write_record(&header)?;
    for (name, row) in names.iter().zip(&similarity) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|v| format!("{v:.4}")));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    let clusters_path = config.prefixed(&dir, "_kmer_clusters.tsv");
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&clusters_path)
        .with_context(|| format!("Failed to create {}", clusters_path.display()))?;
    writer.write_record(["Region", "Cluster", "Kmers", "DraftContainment"])?;
    for (i, name) in names.iter().enumerate() {
        writer.write_record([
            name.clone(),
            clusters[i].to_string(),
            sets[i].len().to_string(),
            format!("{:.4}", draft_containment[i]),
        ])?;
    }
    writer.flush()?;

    let cluster_count = clusters.iter().max().copied().unwrap_or(0);
    info!("{} unmapped regions form {} k-mer clusters", n, cluster_count);

    Ok(KmerReport {
        names,
        similarity,
        clusters,
        draft_containment,
        similarity_path,
        clusters_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::region::Region;
    use tempfile::tempdir;

    #[test]
    fn test_kmers_are_canonical() {
        let forward = kmer_set(b"ACGTTGCA", 3);
        let reverse = kmer_set(b"TGCAACGT", 3);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_kmers_skip_ambiguous_bases() {
        assert_eq!(kmer_set(b"ACGNACG", 3).len(), 1);
        assert!(kmer_set(b"ACNNT", 3).is_empty());
        assert!(kmer_set(b"ACGT", 0).is_empty());
        assert!(kmer_set(b"ACGT", 33).is_empty());
    }

    #[test]
    fn test_max_k() {
        let seq = b"ACGTACGTACGTACGTACGTACGTACGTACGTA";
        assert_eq!(kmer_set(seq, MAX_K).len(), 2);
    }

    #[test]
    fn test_jaccard() {
        let a = kmer_set(b"AAAACCCC", 4);
        assert!((jaccard(&a, &a) - 1.0).abs() < f64::EPSILON);
        let b = kmer_set(b"GGGGTTTTAGAG", 4);
        assert!(jaccard(&a, &b) < 1.0);
        assert!(jaccard(&HashSet::new(), &HashSet::new()).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_linkage_chains() {
        let m = vec![
            vec![1.0, 0.6, 0.0, 0.0],
            vec![0.6, 1.0, 0.7, 0.0],
            vec![0.0, 0.7, 1.0, 0.1],
            vec![0.0, 0.0, 0.1, 1.0],
        ];
        assert_eq!(single_linkage(&m, 0.5), vec![1, 1, 1, 2]);
        assert_eq!(single_linkage(&m, 0.65), vec![1, 2, 2, 3]);
    }

    fn region(name: &str, seq: &[u8]) -> UnmappedRegion {
        UnmappedRegion {
            name: name.to_string(),
            core: Region { start: 1, end: seq.len() as u64 },
            flanked: Region { start: 1, end: seq.len() as u64 },
            sequence: seq.to_vec(),
        }
    }

    #[test]
    fn test_compare_regions_writes_tables() {
        let dir = tempdir().unwrap();
        let draft = dir.path().join("draft.fasta");
        std::fs::write(&draft, ">c1\nACGTACGGTCAGTT\n").unwrap();
        let mut config = RunConfig::new(&draft, dir.path().join("out"));
        config.prefix = "K".to_string();

        let regions = vec![
            region("K_1:14", b"ACGTACGGTCAGTT"),
            region("K_20:33", b"ACGTACGGTCAGTT"),
            region("K_50:63", b"GGGGGGGGGGGGGG"),
        ];
        let report = compare_regions(&config, &regions, 5).unwrap();

        assert_eq!(report.clusters, vec![1, 1, 2]);
        assert!((report.similarity[0][1] - 1.0).abs() < f64::EPSILON);
        assert!((report.draft_containment[0] - 1.0).abs() < f64::EPSILON);
        assert!(report.draft_containment[2].abs() < f64::EPSILON);

        let clusters = std::fs::read_to_string(&report.clusters_path).unwrap();
        assert!(clusters.starts_with("Region\tCluster\tKmers\tDraftContainment\n"));
        assert!(clusters.contains("K_50:63\t2\t1\t0.0000"));

        let similarity = std::fs::read_to_string(&report.similarity_path).unwrap();
        assert_eq!(similarity.lines().count(), 4);
    }
}
