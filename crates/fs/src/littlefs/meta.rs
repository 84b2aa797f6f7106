//! 元数据翻译

use lfs::{LfsInfo, LfsType};
use vfs::{DirEntry, DirEntryType, FileMode, FsError, Stat};

/// 引擎条目信息 → stat 记录
///
/// 引擎没有权限模型，权限位固定为 0o777。
pub(super) fn to_stat(info: &LfsInfo) -> Stat {
    let kind = match info.kind {
        LfsType::Dir => FileMode::S_IFDIR,
        _ => FileMode::S_IFREG,
    };
    Stat {
        size: info.size as usize,
        mode: kind | FileMode::ALL_ACCESS,
    }
}

/// 引擎目录条目 → VFS 目录项
///
/// `None`（没有剩余条目）对应结束标记。名称长度必须严格小于 `max_name`。
pub(super) fn to_dir_entry(info: Option<LfsInfo>, max_name: usize) -> Result<DirEntry, FsError> {
    let Some(info) = info else {
        return Ok(DirEntry::end());
    };

    if info.name.len() >= max_name {
        log::warn!(
            "lfs: entry name of {} bytes exceeds limit {}",
            info.name.len(),
            max_name
        );
        return Err(FsError::NameTooLong);
    }

    let kind = match info.kind {
        LfsType::Reg => DirEntryType::File,
        _ => DirEntryType::Directory,
    };
    Ok(DirEntry {
        name: info.name,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(kind: LfsType, size: u32, name: &str) -> LfsInfo {
        LfsInfo {
            kind,
            size,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_stat_mode_bits() {
        let dir = to_stat(&info(LfsType::Dir, 0, "d"));
        assert!(dir.is_dir());
        assert_eq!(dir.mode.permissions(), 0o777);

        let file = to_stat(&info(LfsType::Reg, 10, "f"));
        assert!(file.is_file());
        assert_eq!(file.size, 10);
        assert_eq!(file.mode.bits(), 0o100777);
    }

    #[test]
    fn test_dir_entry_end_marker() {
        let entry = to_dir_entry(None, 512).unwrap();
        assert!(entry.is_end());
        assert!(entry.name.is_empty());
    }

    #[test]
    fn test_dir_entry_types() {
        let entry = to_dir_entry(Some(info(LfsType::Reg, 3, "f")), 512).unwrap();
        assert_eq!(entry.kind, DirEntryType::File);
        assert_eq!(entry.name, "f");

        let entry = to_dir_entry(Some(info(LfsType::Dir, 0, "d")), 512).unwrap();
        assert_eq!(entry.kind, DirEntryType::Directory);
    }

    #[test]
    fn test_dir_entry_name_limit() {
        // 名称长度必须严格小于上限
        assert!(to_dir_entry(Some(info(LfsType::Reg, 0, "abc")), 4).is_ok());
        assert_eq!(
            to_dir_entry(Some(info(LfsType::Reg, 0, "abcd")), 4),
            Err(FsError::NameTooLong)
        );
    }
}
