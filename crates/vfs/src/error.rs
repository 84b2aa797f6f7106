//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的文件系统错误码，可通过 [`FsError::to_errno()`] 转换为负数错误码。
//! 后端引擎自身报告的错误码通过 [`FsError::Engine`] 原样透传，不做重新解释。

use core::fmt;

/// VFS 错误类型
///
/// 除 [`FsError::Engine`] 外，各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 参数相关
    /// 无效参数 (-EINVAL)，例如空路径、非法的打开标志组合
    InvalidArgument,
    /// 文件名过长 (-ENAMETOOLONG)
    NameTooLong,

    // 状态相关
    /// 卷已挂载 (-EBUSY)
    AlreadyMounted,
    /// 卷未挂载 (-EINVAL)
    NotMounted,
    /// 无效的句柄 (-EBADF)：句柄不属于该后端，或跨越了卸载/挂载周期
    BadFileDescriptor,

    // 宿主侧
    /// I/O 错误 (-EIO)
    IoError,

    // 引擎
    /// 引擎返回的原始错误码（负数）
    Engine(i32),
}

impl FsError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::IoError => -5,
            FsError::BadFileDescriptor => -9,
            FsError::AlreadyMounted => -16,
            FsError::InvalidArgument => -22,
            FsError::NotMounted => -22,
            FsError::NameTooLong => -36,
            FsError::Engine(code) => *code as isize,
        }
    }

    /// 是否为引擎报告的错误
    pub fn is_engine(&self) -> bool {
        matches!(self, FsError::Engine(_))
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FsError::InvalidArgument => write!(f, "invalid argument"),
            FsError::NameTooLong => write!(f, "file name too long"),
            FsError::AlreadyMounted => write!(f, "volume already mounted"),
            FsError::NotMounted => write!(f, "volume not mounted"),
            FsError::BadFileDescriptor => write!(f, "bad handle"),
            FsError::IoError => write!(f, "I/O error"),
            FsError::Engine(code) => write!(f, "engine error {}", code),
        }
    }
}

impl std::error::Error for FsError {}

impl From<std::io::Error> for FsError {
    fn from(_: std::io::Error) -> Self {
        FsError::IoError
    }
}
