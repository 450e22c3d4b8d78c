use dupsweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupsweep::progress::ScanReporter;
use dupsweep::scanner::{CompareError, FileRecord};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

#[derive(Default)]
struct Recorder {
    fatal: AtomicUsize,
    messages: Mutex<Vec<String>>,
    progress: AtomicUsize,
}

impl ScanReporter for Recorder {
    fn on_invalid_root(&self, _path: &Path) {}

    fn on_fatal_io(&self, error: &dyn std::error::Error) {
        self.fatal.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(error.to_string());
    }

    fn on_progress(&self, processed: usize, _total: usize) {
        self.progress.store(processed, Ordering::SeqCst);
    }
}

fn finder(recorder: &Arc<Recorder>, threads: usize) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_threads(threads)
            .with_reporter(recorder.clone()),
    )
}

#[test]
fn test_vanished_file_voids_whole_run() {
    let dir = tempdir().unwrap();
    let mut files = Vec::new();
    // Plenty of healthy buckets around the broken one.
    for size in 1..=30usize {
        let content = vec![b'h'; size];
        for suffix in ["a", "b"] {
            let path = dir.path().join(format!("{}{}", size, suffix));
            fs::write(&path, &content).unwrap();
            files.push(FileRecord::new(path, size as u64));
        }
    }
    let vanished = dir.path().join("vanished");
    fs::write(dir.path().join("survivor"), b"0123456789abcdef").unwrap();
    files.push(FileRecord::new(dir.path().join("survivor"), 16));
    files.push(FileRecord::new(vanished.clone(), 16));

    let recorder = Arc::new(Recorder::default());
    let result = finder(&recorder, 4).find_duplicates_from_files(files);

    match result {
        Err(FinderError::Compare(CompareError::NotFound(path))) => assert_eq!(path, vanished),
        other => panic!("expected NotFound failure, got {:?}", other.map(|(g, _)| g.len())),
    }
    assert_eq!(recorder.fatal.load(Ordering::SeqCst), 1);
    assert!(recorder.messages.lock().unwrap()[0].contains("vanished"));
}

#[test]
fn test_several_broken_buckets_reported_once() {
    let dir = tempdir().unwrap();
    let files: Vec<_> = (1..=8u64)
        .flat_map(|size| {
            [
                FileRecord::new(dir.path().join(format!("ghost-{}-a", size)), size),
                FileRecord::new(dir.path().join(format!("ghost-{}-b", size)), size),
            ]
        })
        .collect();

    for threads in [1, 4] {
        let recorder = Arc::new(Recorder::default());
        let result = finder(&recorder, threads).find_duplicates_from_files(files.clone());

        assert!(matches!(result, Err(FinderError::Compare(_))));
        assert_eq!(recorder.fatal.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_file_removed_after_walk() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let walker = dupsweep::scanner::Walker::new(dir.path(), Default::default());
    let files: Vec<_> = walker.walk().collect::<Result<_, _>>().unwrap();
    fs::remove_file(dir.path().join("b")).unwrap();

    let recorder = Arc::new(Recorder::default());
    let result = finder(&recorder, 2).find_duplicates_from_files(files);

    assert!(result.is_err());
    assert_eq!(recorder.fatal.load(Ordering::SeqCst), 1);
}

#[test]
fn test_healthy_run_reports_no_failure() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let recorder = Arc::new(Recorder::default());
    let (groups, _) = finder(&recorder, 2)
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(recorder.fatal.load(Ordering::SeqCst), 0);
    assert_eq!(recorder.progress.load(Ordering::SeqCst), 2);
}
