mod common;

use assert_cmd::Command;
use tempfile::TempDir;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("labelstage 0.3.0\n");
}

#[test]
fn prepare_train_reports_split() {
    let source = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    for i in 0..5 {
        common::write_capture_pair(
            source.path(),
            &format!("cap_{i}"),
            (320, 240),
            true,
            &[("cat", 1, 1, 9, 9)],
        );
    }

    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.args(["prepare-train", "--seed", "3"])
        .arg("--source")
        .arg(source.path())
        .arg("--root")
        .arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Staged 5 pair(s): 4 train, 1 valid."));
}

#[test]
fn prepare_train_emits_json_report() {
    let source = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    common::write_capture_pair(source.path(), "cap", (320, 240), true, &[("cat", 1, 1, 9, 9)]);

    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.args(["prepare-train", "--seed", "0", "--output", "json"])
        .arg("--source")
        .arg(source.path())
        .arg("--root")
        .arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("\"classes\": 1"));
}

#[test]
fn prepare_test_fails_without_training_manifest() {
    let source = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.arg("prepare-test")
        .arg("--source")
        .arg(source.path())
        .arg("--root")
        .arg(root.path())
        .arg("--manifest")
        .arg(root.path().join("data.yaml"));
    cmd.assert().failure();
}

#[test]
fn move_verified_summarizes_sweep() {
    let source = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    common::write_capture_pair(source.path(), "done", (320, 240), true, &[("cat", 1, 1, 9, 9)]);
    common::write_capture_pair(source.path(), "todo", (320, 240), false, &[("cat", 1, 1, 9, 9)]);

    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.arg("move-verified")
        .arg("--source")
        .arg(source.path())
        .arg("--dest")
        .arg(dest.path());
    cmd.assert().success().stdout(predicates::str::contains(
        "1 verified annotation file(s) and associated images were moved",
    ));
}

#[test]
fn rejects_invalid_config() {
    let source = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let config = root.path().join("config.yaml");
    std::fs::write(&config, "training:\n  img_input_size: 100\n").unwrap();

    let mut cmd = Command::cargo_bin("labelstage").unwrap();
    cmd.arg("prepare-train")
        .arg("--source")
        .arg(source.path())
        .arg("--root")
        .arg(root.path())
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("multiple of 32"));
}
