//! End-to-end tests of the saspector binary.
//!
//! The external programs are replaced by small shell scripts placed first on
//! `PATH`; they write just enough output for the following stage to proceed.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const REFERENCE: &str = ">chr\nACGTACGTACGTACGTACGTGGGGGGGGGGACGTACGTAC\n";
const DRAFT: &str = ">c1\nACGTACGTACGTACGTACGT\n";

struct Fixture {
    dir: TempDir,
    draft: PathBuf,
    reference: PathBuf,
    outdir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let draft = dir.path().join("draft.fasta");
        let reference = dir.path().join("ref.fasta");
        fs::write(&draft, DRAFT).unwrap();
        fs::write(&reference, REFERENCE).unwrap();
        let outdir = dir.path().join("results");
        Self {
            dir,
            draft,
            reference,
            outdir,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("saspector").unwrap();
        cmd.arg("--draft").arg(&self.draft).arg("--outdir").arg(&self.outdir);
        cmd
    }
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Install stand-ins for the mandatory programs and return a `PATH` value
/// that finds them first.
#[cfg(unix)]
fn fake_tools(dir: &Path) -> String {
    let bin = dir.join("fakebin");
    fs::create_dir_all(&bin).unwrap();

    write_script(
        &bin,
        "progressiveMauve",
        r#"for a in "$@"; do
  case "$a" in
    --backbone-output=*) bb="${a#--backbone-output=}" ;;
    --output=*) out="${a#--output=}" ;;
  esac
done
printf 'seq0_leftend\tseq0_rightend\tseq1_leftend\tseq1_rightend\n1\t20\t1\t20\n21\t30\t0\t0\n' > "$bb"
: > "$out""#,
    );
    write_script(
        &bin,
        "prokka",
        r#"while [ $# -gt 0 ]; do
  if [ "$1" = "--outdir" ]; then mkdir -p "$2"; fi
  shift
done"#,
    );
    write_script(
        &bin,
        "blastx",
        r#"while [ $# -gt 0 ]; do
  if [ "$1" = "-out" ]; then : > "$2"; fi
  shift
done"#,
    );
    write_script(&bin, "union", "exit 0");

    format!("{}:/usr/bin:/bin", bin.display())
}

#[test]
fn test_missing_reference_fails_before_any_tool() {
    let fixture = Fixture::new();
    fixture
        .command()
        .env("PATH", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--reference or --mash_selection"));
    assert!(!fixture.outdir.exists());
}

#[test]
fn test_reference_and_mash_selection_are_incompatible() {
    let fixture = Fixture::new();
    let sketch = fixture.dir.path().join("refs.msh");
    fs::write(&sketch, "").unwrap();

    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .arg("--mash_selection")
        .arg(&sketch)
        .assert()
        .failure()
        .stderr(predicate::str::contains("incompatible"));
    assert!(!fixture.outdir.exists());
}

#[test]
fn test_coverage_with_mash_selection_fails() {
    let fixture = Fixture::new();
    let sketch = fixture.dir.path().join("refs.msh");
    let bam = fixture.dir.path().join("reads.bam");
    fs::write(&sketch, "").unwrap();
    fs::write(&bam, "").unwrap();

    fixture
        .command()
        .arg("--mash_selection")
        .arg(&sketch)
        .arg("--coverage")
        .arg(&bam)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--coverage"));
    assert!(!fixture.outdir.exists());
}

#[test]
fn test_proteindb_placeholder_fails() {
    let fixture = Fixture::new();
    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .args(["--proteindb", "nodb"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("placeholder"));
}

#[test]
fn test_missing_program_is_reported() {
    let fixture = Fixture::new();
    let empty = fixture.dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();

    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .env("PATH", &empty)
        .assert()
        .failure()
        .stderr(predicate::str::contains("progressiveMauve"));
    assert!(!fixture.outdir.exists());
}

#[test]
fn test_invalid_kmer_length_is_rejected() {
    let fixture = Fixture::new();
    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .args(["--kmers", "40"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn test_existing_outdir_without_force_is_untouched() {
    let fixture = Fixture::new();
    let path = fake_tools(fixture.dir.path());
    fs::create_dir_all(&fixture.outdir).unwrap();
    let marker = fixture.outdir.join("keep.txt");
    fs::write(&marker, "previous run").unwrap();

    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .env("PATH", path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    assert_eq!(fs::read_to_string(&marker).unwrap(), "previous run");
}

#[cfg(unix)]
#[test]
fn test_force_recreates_outdir() {
    let fixture = Fixture::new();
    let path = fake_tools(fixture.dir.path());
    fs::create_dir_all(&fixture.outdir).unwrap();
    let marker = fixture.outdir.join("stale.txt");
    fs::write(&marker, "stale").unwrap();

    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .args(["--prefix", "PA01", "--force"])
        .env("PATH", path)
        .assert()
        .success();

    assert!(!marker.exists());
    assert!(fixture.outdir.join("PA01_run.json").is_file());
}

#[cfg(unix)]
#[test]
fn test_end_to_end_with_default_prefix() {
    let fixture = Fixture::new();
    let path = fake_tools(fixture.dir.path());
    let db = fixture.dir.path().join("proteins.faa");
    fs::write(&db, ">p1\nMKV\n").unwrap();

    fixture
        .command()
        .arg("--reference")
        .arg(&fixture.reference)
        .arg("--proteindb")
        .arg(&db)
        .args(["--flanking", "2", "--kmers", "5"])
        .env("PATH", path)
        .assert()
        .success()
        .stderr(predicate::str::contains("SASpector finished"));

    let prefix = chrono::Local::now().format("%Y%m%d").to_string();
    let out = &fixture.outdir;

    let unmapped = fs::read_to_string(out.join(format!("{prefix}_unmappedregions.fasta"))).unwrap();
    assert!(unmapped.starts_with(&format!(">{prefix}_19:32\n")));
    assert!(out.join(format!("{prefix}_mappedregions.fasta")).is_file());
    assert!(out.join(format!("{prefix}_conflictregions.fasta")).is_file());
    assert!(out
        .join("summary")
        .join(format!("{prefix}_referencesummary.tsv"))
        .is_file());
    assert!(out
        .join("summary")
        .join(format!("{prefix}_unmapsummary.tsv"))
        .is_file());
    assert!(out.join("prokka").is_dir());
    assert!(out
        .join("blastx")
        .join(format!("{prefix}_blastx_besthits.tsv"))
        .is_file());
    assert!(out
        .join("kmers")
        .join(format!("{prefix}_kmer_clusters.tsv"))
        .is_file());

    let json = fs::read_to_string(out.join(format!("{prefix}_run.json"))).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(summary["unmapped_regions"], 1);
    assert_eq!(summary["mapped_regions"], 1);
    assert_eq!(summary["regions_with_protein_hits"], 0);
}
