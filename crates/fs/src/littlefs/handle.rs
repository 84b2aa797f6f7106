//! 句柄翻译
//!
//! 句柄中保存的原生记录带有产生它的挂载代数，卸载后重新挂载会使旧句柄失效。

use lfs::{LfsOpenFlags, LfsWhence};
use vfs::{FsError, OpenFlags, SeekWhence};

/// 文件句柄中保存的原生记录
pub(super) struct LfsFile<F> {
    pub(super) generation: u64,
    pub(super) file: F,
}

/// 目录句柄中保存的原生记录
pub(super) struct LfsDir<D> {
    pub(super) generation: u64,
    pub(super) dir: D,
}

/// 将 VFS 打开标志翻译为引擎标志
pub(super) fn to_lfs_flags(flags: OpenFlags) -> Result<LfsOpenFlags, FsError> {
    let flags = flags.validate()?;

    let mut lfs_flags = match (flags.readable(), flags.writable()) {
        (true, true) => LfsOpenFlags::RDWR,
        (true, false) => LfsOpenFlags::RDONLY,
        (false, true) => LfsOpenFlags::WRONLY,
        (false, false) => return Err(FsError::InvalidArgument),
    };

    if flags.contains(OpenFlags::CREATE) {
        lfs_flags |= LfsOpenFlags::CREAT;
    }
    if flags.contains(OpenFlags::EXCLUSIVE) {
        lfs_flags |= LfsOpenFlags::EXCL;
    }
    if flags.contains(OpenFlags::TRUNCATE) {
        lfs_flags |= LfsOpenFlags::TRUNC;
    }
    if flags.contains(OpenFlags::APPEND) {
        lfs_flags |= LfsOpenFlags::APPEND;
    }

    Ok(lfs_flags)
}

pub(super) fn to_lfs_whence(whence: SeekWhence) -> LfsWhence {
    match whence {
        SeekWhence::Set => LfsWhence::Set,
        SeekWhence::Cur => LfsWhence::Cur,
        SeekWhence::End => LfsWhence::End,
    }
}
