//! Command-line tests for the amr-predict binary

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Deterministic xorshift nucleotide sequence
fn random_sequence(seed: u64, len: usize) -> String {
    let mut state = seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            ['A', 'C', 'G', 'T'][((state >> 32) % 4) as usize]
        })
        .collect()
}

/// A database directory with one beta-lactamase and one tetracycline gene,
/// plus a genome carrying the beta-lactamase
struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("db");
        fs::create_dir(&db).unwrap();

        let bla = random_sequence(1, 800);
        fs::write(
            db.join("beta-lactam.fsa"),
            format!(">blaTEM:1:AY458016\n{bla}\n"),
        )
        .unwrap();
        fs::write(
            db.join("tetracycline.fsa"),
            format!(">tetA:1:X00006\n{}\n", random_sequence(7, 1000)),
        )
        .unwrap();
        fs::write(
            db.join("notes.txt"),
            "blaTEM:Beta-lactam resistance:\ntetA:Tetracycline resistance:\n",
        )
        .unwrap();

        let genome = format!(
            ">chr complete genome\n{}{bla}{}\n",
            random_sequence(100, 1500),
            random_sequence(200, 1000)
        );
        fs::write(dir.path().join("isolate1.fasta"), genome).unwrap();
        fs::write(
            dir.path().join("isolate2.fasta"),
            format!(">chr\n{}\n", random_sequence(300, 2000)),
        )
        .unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn db(&self) -> PathBuf {
        self.path("db")
    }
}

fn amr_predict() -> Command {
    Command::cargo_bin("amr-predict").unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_predict_json() {
    let fixture = Fixture::new();
    amr_predict()
        .args(["predict", "--database", arg(&fixture.db())])
        .arg(fixture.path("isolate1.fasta"))
        .arg(fixture.path("isolate2.fasta"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"genome_id\": \"isolate1\""))
        .stdout(predicate::str::contains("\"allele_id\": \"blaTEM_1\""))
        .stdout(predicate::str::contains("\"beta-lactam\""))
        .stdout(predicate::str::contains("\"genome_id\": \"isolate2\""))
        .stdout(predicate::str::contains("tetracycline").not());
}

#[test]
fn test_predict_tsv() {
    let fixture = Fixture::new();
    amr_predict()
        .args(["predict", "--format", "tsv", "--database", arg(&fixture.db())])
        .arg(fixture.path("isolate1.fasta"))
        .arg(fixture.path("isolate2.fasta"))
        .assert()
        .success()
        .stdout(predicate::str::contains("isolate1\tok\tchr\t1500\t2300\t+\tblaTEM_1"))
        .stdout(predicate::str::contains("isolate2\tsusceptible"));
}

#[test]
fn test_predict_reports_failed_genome() {
    let fixture = Fixture::new();
    let broken = fixture.path("broken.fasta");
    fs::write(&broken, ">chr\nACGT12\n").unwrap();

    amr_predict()
        .args(["predict", "--database", arg(&fixture.db())])
        .arg(fixture.path("isolate1.fasta"))
        .arg(&broken)
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"status\": \"failed\""))
        .stdout(predicate::str::contains("malformed_input"))
        .stdout(predicate::str::contains("\"status\": \"ok\""))
        .stderr(predicate::str::contains("1 of 2 genome(s) failed"));
}

#[test]
fn test_predict_threshold_override() {
    let fixture = Fixture::new();
    amr_predict()
        .args(["predict", "--database", arg(&fixture.db()), "--min-identity", "1.5"])
        .arg(fixture.path("isolate1.fasta"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("min_identity"));
}

#[test]
fn test_predict_requires_catalog_source() {
    let fixture = Fixture::new();
    amr_predict()
        .arg("predict")
        .arg(fixture.path("isolate1.fasta"))
        .assert()
        .failure();
}

#[test]
fn test_catalog_list_and_show() {
    let fixture = Fixture::new();
    amr_predict()
        .args(["catalog", "list", "--database", arg(&fixture.db())])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"family\": \"blaTEM\""))
        .stdout(predicate::str::contains("\"family\": \"tetA\""));

    amr_predict()
        .args(["catalog", "list", "--class", "tetracycline", "--format", "tsv"])
        .args(["--database", arg(&fixture.db())])
        .assert()
        .success()
        .stdout(predicate::str::contains("tetA\t1\t0\ttetracycline"))
        .stdout(predicate::str::contains("blaTEM").not());

    amr_predict()
        .args(["catalog", "show", "blaTEM_1", "--database", arg(&fixture.db())])
        .assert()
        .success()
        .stdout(predicate::str::contains("AY458016"))
        .stdout(predicate::str::contains("\"length\": 800"));

    amr_predict()
        .args(["catalog", "show", "mcr-1_1", "--database", arg(&fixture.db())])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mcr-1_1"));
}

#[test]
fn test_exported_catalog_can_be_used_for_prediction() {
    let fixture = Fixture::new();
    let exported = fixture.path("catalog.json");

    amr_predict()
        .args(["catalog", "export", arg(&exported), "--database", arg(&fixture.db())])
        .assert()
        .success()
        .stderr(predicate::str::contains("Exported 2 alleles"));

    amr_predict()
        .args(["predict", "--catalog", arg(&exported)])
        .arg(fixture.path("isolate1.fasta"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"allele_id\": \"blaTEM_1\""));
}
