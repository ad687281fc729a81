#![allow(clippy::unwrap_used)]

use std::io;
use std::path::Path;

use pretty_assertions::assert_eq;

use super::{DirEntry, FileSystem, MemoryFileSystem, OsFileSystem};

#[test]
fn test_memory_directories_are_implicit() {
    let fs = MemoryFileSystem::new();
    fs.insert("/repo/pkg/BUCK", "");
    fs.insert("/repo/pkg/src/a.c", "");
    fs.insert("/repo/pkg/src/deep/b.c", "");

    let entries = fs.list_dir(Path::new("/repo/pkg")).unwrap();
    assert_eq!(
        entries,
        vec![
            DirEntry {
                name: "BUCK".to_string(),
                is_dir: false
            },
            DirEntry {
                name: "src".to_string(),
                is_dir: true
            },
        ]
    );
    assert!(fs.exists(Path::new("/repo/pkg/src")));
    assert!(!fs.exists(Path::new("/repo/other")));
    assert_eq!(
        fs.list_dir(Path::new("/repo/other")).unwrap_err().kind(),
        io::ErrorKind::NotFound
    );
}

#[test]
fn test_memory_reads_are_counted() {
    let fs = MemoryFileSystem::new();
    fs.insert("/a", "x = 1\n");
    assert_eq!(fs.read(Path::new("/a")).unwrap(), "x = 1\n");
    assert_eq!(
        fs.read(Path::new("/b")).unwrap_err().kind(),
        io::ErrorKind::NotFound
    );
    assert_eq!(fs.reads(), 2);
}

#[test]
fn test_os_list_dir_sorted() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.txt"), "").unwrap();
    std::fs::write(dir.path().join("a.txt"), "").unwrap();
    std::fs::create_dir(dir.path().join("c")).unwrap();

    let names: Vec<_> = OsFileSystem
        .list_dir(dir.path())
        .unwrap()
        .into_iter()
        .map(|e| (e.name, e.is_dir))
        .collect();
    assert_eq!(
        names,
        vec![
            ("a.txt".to_string(), false),
            ("b.txt".to_string(), false),
            ("c".to_string(), true),
        ]
    );
    assert_eq!(
        OsFileSystem.read(&dir.path().join("missing")).unwrap_err().kind(),
        io::ErrorKind::NotFound
    );
}
