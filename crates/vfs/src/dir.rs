//! 目录项与目录遍历
//!
//! `readdir` 每次调用都返回一个调用方独占的 [`DirEntry`]，
//! 不存在跨句柄共享的暂存记录，因此多个目录句柄可以交错遍历。

use crate::{DirHandle, FileSystem, FsError};

/// 目录项名称的默认上限（字节，含结尾空间）
///
/// 名称长度必须严格小于该值。
pub const VFS_MAX_NAME_LEN: usize = 512;

/// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirEntryType {
    /// 遍历结束标记
    End,
    /// 普通文件
    File,
    /// 目录
    Directory,
}

/// 目录项（readdir 返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 文件名
    pub name: String,
    /// 类型
    pub kind: DirEntryType,
}

impl DirEntry {
    /// 遍历结束标记：空名称 + [`DirEntryType::End`]
    pub fn end() -> Self {
        Self {
            name: String::new(),
            kind: DirEntryType::End,
        }
    }

    /// 是否为结束标记
    pub fn is_end(&self) -> bool {
        self.kind == DirEntryType::End
    }
}

/// 目录遍历迭代器
///
/// 将 [`FileSystem::readdir`] 包装为有限的惰性序列：遇到结束标记即停止，
/// 遇到错误时产出该错误后停止。迭代器只借用句柄，结束后句柄仍需调用方关闭。
pub struct ReadDir<'a> {
    fs: &'a dyn FileSystem,
    dir: &'a mut DirHandle,
    finished: bool,
}

impl<'a> ReadDir<'a> {
    /// 在已打开的目录句柄上创建迭代器
    pub fn new(fs: &'a dyn FileSystem, dir: &'a mut DirHandle) -> Self {
        Self {
            fs,
            dir,
            finished: false,
        }
    }
}

impl Iterator for ReadDir<'_> {
    type Item = Result<DirEntry, FsError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.fs.readdir(self.dir) {
            Ok(entry) if entry.is_end() => {
                self.finished = true;
                None
            }
            Ok(entry) => Some(Ok(entry)),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
