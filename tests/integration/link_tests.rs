use dupsweep::duplicates::DuplicateFinder;
use dupsweep::scanner::StorageIdentity;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_hardlinked_pair_alone_yields_no_group() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    let hardlink = dir.path().join("hardlink.txt");
    fs::write(&original, b"identical content").unwrap();

    if let Err(e) = fs::hard_link(&original, &hardlink) {
        eprintln!("Skipping hardlink test: failed to create hardlink: {}", e);
        return;
    }

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    if StorageIdentity::is_supported() {
        assert!(groups.is_empty());
        assert_eq!(summary.hardlinks_collapsed, 1);
    } else {
        assert_eq!(groups.len(), 1);
    }
}

#[test]
fn test_hardlinked_pair_with_independent_copy() {
    let dir = tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let a = root.join("a.txt");
    let b = root.join("b.txt");
    let c = root.join("c.txt");
    fs::write(&a, b"shared data").unwrap();
    if fs::hard_link(&a, &b).is_err() {
        return;
    }
    fs::write(&c, b"shared data").unwrap();

    let (groups, _) = DuplicateFinder::with_defaults()
        .find_duplicates(&[root.clone()])
        .unwrap();

    assert_eq!(groups.len(), 1);
    if StorageIdentity::is_supported() {
        assert_eq!(groups[0].paths(), vec![a, c]);
    } else {
        assert_eq!(groups[0].len(), 3);
    }
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("original.txt");
    fs::write(&original, b"content").unwrap();
    std::os::unix::fs::symlink(&original, dir.path().join("symlink.txt")).unwrap();

    let target_dir = tempdir().unwrap();
    fs::write(target_dir.path().join("elsewhere.txt"), b"content").unwrap();
    std::os::unix::fs::symlink(target_dir.path(), dir.path().join("linked_dir")).unwrap();

    let (groups, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&[dir.path().to_path_buf()])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}
