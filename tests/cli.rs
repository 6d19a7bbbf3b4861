use assert_cmd::Command;
use predicates::prelude::*;

const CHAIN_GFA: &str = "H\tVN:Z:1.0\n\
    S\t1\tAAAATT\n\
    S\t2\tTTGGGG\n\
    S\t3\tGGCCCC\n\
    S\t9\tACGT\n\
    L\t1\t+\t2\t+\t2M\n\
    L\t2\t+\t3\t+\t2M\n";

fn write_gfa(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("test.gfa");
    std::fs::write(&path, CHAIN_GFA).unwrap();
    path
}

#[test]
fn stats_reports_components() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .arg("stats")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("total components:\t2"))
        .stdout(predicate::str::contains("circular:\tfalse"));
}

#[test]
fn stats_can_emit_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .args(["stats", "--json"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"node_count\": 3"));
}

#[test]
fn linear_renders_the_longest_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .arg("linear")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(">1+,2+,3+"))
        .stdout(predicate::str::contains("AAAATTGGGGCCCC"));
}

#[test]
fn path_renders_a_user_supplied_walk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .args(["path", "--walk", "1+,2+"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(">1+,2+\nAAAATTGGGG"));

    // a junction with no matching declared link is rejected
    Command::cargo_bin("asmtk")
        .unwrap()
        .args(["path", "--walk", "1+,3+"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid walk"));
}

#[test]
fn trim_drops_isolated_segments() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .arg("trim")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("S\t1\tAAAATT"))
        .stdout(predicate::str::contains("S\t9").not());
}

#[test]
fn fasta_reads_stdin_when_no_file_is_given() {
    Command::cargo_bin("asmtk")
        .unwrap()
        .arg("fasta")
        .write_stdin(CHAIN_GFA)
        .assert()
        .success()
        .stdout(predicate::str::contains(">1\nAAAATT"));
}

#[test]
fn extract_prints_the_neighborhood_subgraph() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_gfa(&dir);

    Command::cargo_bin("asmtk")
        .unwrap()
        .args(["extract", "--segment", "1", "--iterations", "1"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("S\t2\tTTGGGG"))
        .stdout(predicate::str::contains("S\t3").not());
}

#[test]
fn bad_gfa_fails_with_an_error() {
    Command::cargo_bin("asmtk")
        .unwrap()
        .arg("stats")
        .write_stdin("S\tnot_a_number\tACGT\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
