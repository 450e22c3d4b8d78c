use dupsweep::duplicates::DuplicateFinder;
use dupsweep::progress::ScanReporter;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[derive(Default)]
struct InvalidRoots(Mutex<Vec<PathBuf>>);

impl ScanReporter for InvalidRoots {
    fn on_invalid_root(&self, path: &Path) {
        self.0.lock().unwrap().push(path.to_path_buf());
    }

    fn on_fatal_io(&self, _error: &dyn std::error::Error) {}

    fn on_progress(&self, _processed: usize, _total: usize) {}
}

#[test]
fn test_scan_two_non_overlapping_directories() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();

    File::create(dir1.path().join("a.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();
    File::create(dir2.path().join("b.txt"))
        .unwrap()
        .write_all(b"dup")
        .unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.total_files, 2);
}

#[test]
fn test_root_order_decides_member_order() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    let first = fs::canonicalize(dir1.path()).unwrap();
    let second = fs::canonicalize(dir2.path()).unwrap();
    fs::write(first.join("z.txt"), b"order").unwrap();
    fs::write(second.join("a.txt"), b"order").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[second.clone(), first.clone()])
        .unwrap();

    assert_eq!(groups[0].paths(), vec![second.join("a.txt"), first.join("z.txt")]);
}

#[test]
fn test_scan_overlapping_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(dir.path().join("a.txt"), b"content").unwrap();
    fs::write(sub.join("b.txt"), b"content").unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf(), sub.clone()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
fn test_invalid_root_plus_valid_root() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), b"payload").unwrap();
    fs::write(dir.path().join("two"), b"payload").unwrap();
    let missing = dir.path().join("does-not-exist");

    let recorder = Arc::new(InvalidRoots::default());
    let finder = DuplicateFinder::new(
        dupsweep::duplicates::FinderConfig::default().with_reporter(recorder.clone()),
    );
    let (groups, summary) = finder
        .find_duplicates(&[missing.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(*recorder.0.lock().unwrap(), vec![missing]);
    assert_eq!(summary.invalid_roots, 1);
    assert_eq!(summary.total_files, 2);
    assert_eq!(groups.len(), 1);
}

#[test]
fn test_file_given_as_root_is_invalid() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();

    let recorder = Arc::new(InvalidRoots::default());
    let finder = DuplicateFinder::new(
        dupsweep::duplicates::FinderConfig::default().with_reporter(recorder.clone()),
    );
    let (groups, summary) = finder.find_duplicates(&[file.clone()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.invalid_roots, 1);
    assert_eq!(*recorder.0.lock().unwrap(), vec![file]);
}
