mod common;

use std::fs;

use tempfile::TempDir;

use labelstage::error::LabelstageError;
use labelstage::layout;
use labelstage::pipeline;

#[test]
fn test_split_reuses_training_class_indices() {
    let source = TempDir::new().expect("create source dir");
    let root = TempDir::new().expect("create dataset root");

    // Training catalog deliberately NOT in sorted order: "zebra" first.
    let training_manifest = root.path().join(layout::TRAIN_MANIFEST);
    fs::write(
        &training_manifest,
        "train: /staged/images/train\nval: /staged/images/valid\nnc: 2\nnames:\n- zebra\n- ant\n",
    )
    .expect("write training manifest");

    // The test capture only contains "ant" boxes; if the catalog were
    // rebuilt from the test data, "ant" would get index 0.
    common::write_capture_pair(source.path(), "t0", (640, 480), true, &[("ant", 10, 10, 50, 50)]);

    let (manifest_path, report) =
        pipeline::prepare_test_set(source.path(), root.path(), &training_manifest)
            .expect("prepare test set");

    assert_eq!(report.pairs, 1);
    assert_eq!(report.labels_written, 1);
    assert_eq!(report.classes, 2);
    assert_eq!(manifest_path, root.path().join(layout::TEST_MANIFEST));

    let label = fs::read_to_string(root.path().join("labels").join("test").join("t0.txt"))
        .expect("read test label");
    let class_index = label.split_whitespace().next().expect("class token");
    assert_eq!(class_index, "1");

    let manifest = fs::read_to_string(&manifest_path).expect("read test manifest");
    assert!(manifest.contains("nc: 2"));
    assert!(manifest.contains("zebra"));
}

#[test]
fn missing_manifest_fields_abort_before_staging() {
    let source = TempDir::new().expect("create source dir");
    let root = TempDir::new().expect("create dataset root");

    common::write_capture_pair(source.path(), "t0", (640, 480), true, &[("ant", 10, 10, 50, 50)]);

    let truncated = root.path().join("data.yaml");
    fs::write(&truncated, "train: /staged/images/train\n").expect("write truncated manifest");

    let err = pipeline::prepare_test_set(source.path(), root.path(), &truncated)
        .expect_err("truncated manifest must fail");
    match err {
        LabelstageError::MissingManifestFields { missing, .. } => {
            assert!(missing.contains("nc"));
            assert!(missing.contains("names"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Nothing was staged.
    assert!(!root.path().join("images").join("test").exists());
}

#[test]
fn out_of_catalog_class_skips_only_that_annotation() {
    let source = TempDir::new().expect("create source dir");
    let root = TempDir::new().expect("create dataset root");

    let training_manifest = root.path().join(layout::TRAIN_MANIFEST);
    fs::write(&training_manifest, "nc: 1\nnames:\n- cat\n").expect("write training manifest");

    common::write_capture_pair(source.path(), "known", (320, 240), true, &[("cat", 1, 1, 9, 9)]);
    common::write_capture_pair(source.path(), "novel", (320, 240), true, &[("fox", 1, 1, 9, 9)]);

    let (_, report) = pipeline::prepare_test_set(source.path(), root.path(), &training_manifest)
        .expect("prepare test set");

    assert_eq!(report.pairs, 2);
    assert_eq!(report.labels_written, 1);
    assert_eq!(report.labels_skipped.len(), 1);
    assert!(root.path().join("labels").join("test").join("known.txt").is_file());
    assert!(!root.path().join("labels").join("test").join("novel.txt").exists());
}
