use dupsweep::actions::{ActionConfig, ActionExecutor, ActionReport, Decision};
use dupsweep::duplicates::DuplicateFinder;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_keep_first_then_rescan_is_clean() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"remove me twice").unwrap();
    }
    fs::write(dir.path().join("other"), b"unrelated").unwrap();
    let roots = [dir.path().to_path_buf()];

    let (groups, summary) = DuplicateFinder::with_defaults().find_duplicates(&roots).unwrap();
    assert_eq!(groups.len(), 1);

    let executor = ActionExecutor::new(ActionConfig::permanent());
    let mut total = ActionReport::default();
    for group in &groups {
        total.merge(executor.apply(group, &Decision::Delete).unwrap());
    }

    assert_eq!(total.removed.len(), 2);
    assert_eq!(total.bytes_freed, summary.reclaimable_space);
    assert!(dir.path().join("a").exists());

    let (groups, summary) = DuplicateFinder::with_defaults().find_duplicates(&roots).unwrap();
    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_move_first_into_directory() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let archive = dir.path().join("archive");
    fs::create_dir(&data).unwrap();
    fs::create_dir(&archive).unwrap();
    fs::write(data.join("one.bin"), b"archive me").unwrap();
    fs::write(data.join("two.bin"), b"archive me").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[data.clone()])
        .unwrap();
    let report = ActionExecutor::new(ActionConfig::permanent())
        .apply(&groups[0], &Decision::MoveAndDeleteRest(archive.clone()))
        .unwrap();

    assert!(report.all_succeeded());
    assert_eq!(fs::read(archive.join("one.bin")).unwrap(), b"archive me");
    assert!(fs::read_dir(&data).unwrap().next().is_none());
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("x"), b"stay").unwrap();
    fs::write(dir.path().join("y"), b"stay").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();
    let report = ActionExecutor::new(ActionConfig::trash().with_dry_run(true))
        .apply(&groups[0], &Decision::KeepChosen(groups[0].files[1].path.clone()))
        .unwrap();

    assert!(report.dry_run);
    assert_eq!(report.removed, vec![groups[0].files[0].path.clone()]);
    assert!(dir.path().join("x").exists());
    assert!(dir.path().join("y").exists());
}

#[test]
fn test_moving_groups_with_same_first_name_loses_nothing() {
    let dir = tempdir().unwrap();
    let x = dir.path().join("x");
    let y = dir.path().join("y");
    let archive = dir.path().join("archive");
    for sub in [&x, &y, &archive] {
        fs::create_dir(sub).unwrap();
    }
    fs::write(x.join("notes.txt"), b"AAAA").unwrap();
    fs::write(x.join("zcopy.txt"), b"AAAA").unwrap();
    fs::write(y.join("notes.txt"), b"BBBBB").unwrap();
    fs::write(y.join("zcopy.txt"), b"BBBBB").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[x.clone(), y.clone()])
        .unwrap();
    assert_eq!(groups.len(), 2);

    let executor = ActionExecutor::new(ActionConfig::permanent());
    let decision = Decision::MoveAndDeleteRest(archive.clone());
    let mut total = ActionReport::default();
    for group in &groups {
        total.merge(executor.apply(group, &decision).unwrap());
    }

    // Larger group goes first, so "BBBBB" lands in the archive.
    assert_eq!(fs::read(archive.join("notes.txt")).unwrap(), b"BBBBB");
    assert_eq!(total.failure_count(), 1);
    assert_eq!(fs::read(x.join("notes.txt")).unwrap(), b"AAAA");
    assert_eq!(fs::read(x.join("zcopy.txt")).unwrap(), b"AAAA");
}
