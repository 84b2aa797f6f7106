mod common;

use common::ScriptedFs;
use vfs::{DirEntryType, FileSystem, FsError, ReadDir};

#[test]
fn test_read_dir_stops_at_end_marker() {
    let fs = ScriptedFs::new(&[("a", DirEntryType::File), ("sub", DirEntryType::Directory)]);
    let mut dir = fs.opendir("/").unwrap();

    let entries: Vec<_> = ReadDir::new(&fs, &mut dir)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a");
    assert_eq!(entries[0].kind, DirEntryType::File);
    assert_eq!(entries[1].kind, DirEntryType::Directory);

    // 迭代器结束后不再调用后端
    let calls = *fs.readdir_calls.lock();
    assert_eq!(calls, 3);

    // 句柄仍可用，结束标记可重复读取
    assert!(fs.readdir(&mut dir).unwrap().is_end());
    assert!(fs.readdir(&mut dir).unwrap().is_end());
    fs.closedir(dir).unwrap();
}

#[test]
fn test_read_dir_yields_error_once() {
    let fs = ScriptedFs::new(&[("a", DirEntryType::File), ("b", DirEntryType::File)]).failing_at(1);
    let mut dir = fs.opendir("/").unwrap();

    let mut iter = ReadDir::new(&fs, &mut dir);
    assert_eq!(iter.next().unwrap().unwrap().name, "a");
    assert_eq!(iter.next().unwrap(), Err(FsError::Engine(-84)));
    assert!(iter.next().is_none());
}

#[test]
fn test_interleaved_handles_do_not_share_entries() {
    let fs = ScriptedFs::new(&[("first", DirEntryType::File), ("second", DirEntryType::File)]);
    let mut a = fs.opendir("/").unwrap();
    let mut b = fs.opendir("/").unwrap();

    let from_a = fs.readdir(&mut a).unwrap();
    let from_b = fs.readdir(&mut b).unwrap();
    let again_a = fs.readdir(&mut a).unwrap();

    // 之前拿到的目录项不会被后续调用覆盖
    assert_eq!(from_a.name, "first");
    assert_eq!(from_b.name, "first");
    assert_eq!(again_a.name, "second");

    fs.closedir(a).unwrap();
    fs.closedir(b).unwrap();
}
