//! 引擎错误到 VFS 错误的映射

use lfs::LfsError;
use vfs::FsError;

/// 记录失败的操作，并将引擎错误码原样透传
pub(super) fn engine_error(op: &str, err: LfsError) -> FsError {
    log::warn!("lfs: {}() failed: {}", op, err.code());
    FsError::Engine(err.code())
}

/// 引擎配置校验失败
pub(super) fn config_error(err: LfsError) -> FsError {
    log::warn!("lfs: invalid volume geometry: {}", err.code());
    FsError::InvalidArgument
}
