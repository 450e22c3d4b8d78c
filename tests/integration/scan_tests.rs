use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
use dupsweep::scanner::WalkerConfig;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(&path).unwrap().write_all(content).unwrap();
    path
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"content a");
    write(dir.path(), "b.txt", b"content b");
    write(dir.path(), "c.txt", b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.candidate_files, 3);
}

#[test]
fn test_hello_world_layout() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    write(&root, "a/1.txt", b"hello");
    write(&root, "a/2.txt", b"hello");
    write(&root, "b/3.txt", b"world");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[root.clone()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(
        groups[0].paths(),
        vec![root.join("a").join("1.txt"), root.join("a").join("2.txt")]
    );
    assert_eq!(summary.reclaimable_space, 5);
}

#[test]
fn test_transitive_equality_single_group() {
    let dir = tempdir().unwrap();
    for name in ["x", "y", "z", "w"] {
        write(dir.path(), name, b"transitive");
    }

    let (groups, _) = DuplicateFinder::new(FinderConfig::default().with_buffer_size(3))
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn test_difference_in_last_chunk() {
    let dir = tempdir().unwrap();
    let mut a = vec![7u8; 10_000];
    let b = a.clone();
    write(dir.path(), "a", &a);
    write(dir.path(), "b", &b);
    a[9_999] = 8;
    write(dir.path(), "c", &a);

    let (groups, _) = DuplicateFinder::new(FinderConfig::default().with_buffer_size(4096))
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_no_file_in_two_groups() {
    let dir = tempdir().unwrap();
    for i in 0..12 {
        let class = i % 3;
        write(dir.path(), &format!("f{:02}", i), format!("class-{}", class).as_bytes());
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 3);
    let mut all: Vec<_> = groups.iter().flat_map(|g| g.paths()).collect();
    let before = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), before);
    assert_eq!(before, 12);
    assert_eq!(summary.duplicate_files, 9);
}

#[test]
fn test_hidden_files_and_directories_excluded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.txt", b"same bytes");
    write(dir.path(), ".dotfile", b"same bytes");
    write(dir.path(), ".cache/inner.txt", b"same bytes");
    write(dir.path(), "sub/.also_hidden", b"same bytes");

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_hidden_files_included_when_configured() {
    let dir = tempdir().unwrap();
    write(dir.path(), "keep.txt", b"same bytes");
    write(dir.path(), ".dotfile", b"same bytes");

    let config = FinderConfig::default().with_walker_config(WalkerConfig { skip_hidden: false });
    let (groups, _) = DuplicateFinder::new(config)
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(groups.len(), 1);
}

#[test]
fn test_single_thread_matches_many_threads() {
    let dir = tempdir().unwrap();
    for size in 1..=20usize {
        let content = vec![b'k'; size];
        write(dir.path(), &format!("{:02}-a", size), &content);
        write(dir.path(), &format!("{:02}-b", size), &content);
    }

    let run = |threads| {
        DuplicateFinder::new(FinderConfig::default().with_threads(threads))
            .find_duplicates(&[dir.path().to_path_buf()])
            .unwrap()
            .0
            .iter()
            .map(|g| g.paths())
            .collect::<Vec<_>>()
    };

    let single = run(1);
    assert_eq!(single.len(), 20);
    assert_eq!(single, run(8));
}
