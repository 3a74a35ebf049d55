mod common;

use std::fs;

use tempfile::TempDir;

use labelstage::transfer;

#[test]
fn moves_only_verified_complete_pairs() {
    let source = TempDir::new().expect("create source dir");
    let dest = TempDir::new().expect("create dest dir");

    common::write_capture_pair(source.path(), "done", (320, 240), true, &[("cat", 1, 1, 9, 9)]);
    common::write_capture_pair(source.path(), "pending", (320, 240), false, &[("cat", 1, 1, 9, 9)]);
    // Verified but its image is missing.
    common::write_voc_xml(
        &source.path().join("orphan.xml"),
        "orphan.bmp",
        (320, 240),
        true,
        &[],
    );

    let report = transfer::move_verified(source.path(), dest.path(), None)
        .expect("verified sweep");

    assert_eq!(report.xml_before, 3);
    assert_eq!(report.moved, 1);
    assert_eq!(report.xml_after, 2);
    assert!(report.skipped.is_empty());
    assert!(report.copied_to.is_none());

    assert!(dest.path().join("done.xml").is_file());
    assert!(dest.path().join("done.bmp").is_file());
    assert!(source.path().join("pending.xml").is_file());
    assert!(source.path().join("orphan.xml").is_file());
    // No half-moved leftovers.
    assert!(!dest.path().join("orphan.xml").exists());
    assert!(fs::read_dir(dest.path())
        .expect("read dest")
        .all(|e| !e
            .expect("dir entry")
            .file_name()
            .to_string_lossy()
            .ends_with(".part")));
}

#[test]
fn copy_dir_receives_a_second_copy() {
    let source = TempDir::new().expect("create source dir");
    let dest = TempDir::new().expect("create dest dir");
    let backup = TempDir::new().expect("create backup parent");
    let copy_dir = backup.path().join("mirror");

    common::write_capture_pair(source.path(), "done", (320, 240), true, &[("cat", 1, 1, 9, 9)]);

    let report = transfer::move_verified(source.path(), dest.path(), Some(&copy_dir))
        .expect("verified sweep");

    assert_eq!(report.moved, 1);
    assert_eq!(report.copied_to.as_deref(), Some(copy_dir.as_path()));
    assert!(dest.path().join("done.xml").is_file());
    assert!(copy_dir.join("done.xml").is_file());
    assert!(copy_dir.join("done.bmp").is_file());
}

#[test]
fn unparsable_annotation_is_skipped_and_reported() {
    let source = TempDir::new().expect("create source dir");
    let dest = TempDir::new().expect("create dest dir");

    fs::write(source.path().join("broken.xml"), "<annotation").expect("write broken xml");
    common::write_capture_pair(source.path(), "done", (320, 240), true, &[("cat", 1, 1, 9, 9)]);

    let report = transfer::move_verified(source.path(), dest.path(), None)
        .expect("verified sweep");

    assert_eq!(report.moved, 1);
    assert_eq!(report.skipped.len(), 1);
    assert!(source.path().join("broken.xml").is_file());
}
