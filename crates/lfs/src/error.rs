//! 引擎错误码

use core::fmt;

/// 引擎错误码（负数，取值与 errno 对齐）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LfsError(i32);

impl LfsError {
    /// 块设备 I/O 错误
    pub const IO: LfsError = LfsError(-5);
    /// 存储内容损坏
    pub const CORRUPT: LfsError = LfsError(-84);
    /// 条目不存在
    pub const NOENT: LfsError = LfsError(-2);
    /// 条目已存在
    pub const EXIST: LfsError = LfsError(-17);
    /// 不是目录
    pub const NOTDIR: LfsError = LfsError(-20);
    /// 是目录
    pub const ISDIR: LfsError = LfsError(-21);
    /// 目录非空
    pub const NOTEMPTY: LfsError = LfsError(-39);
    /// 错误的文件号
    pub const BADF: LfsError = LfsError(-9);
    /// 文件过大
    pub const FBIG: LfsError = LfsError(-27);
    /// 无效参数
    pub const INVAL: LfsError = LfsError(-22);
    /// 设备空间不足
    pub const NOSPC: LfsError = LfsError(-28);
    /// 内存不足
    pub const NOMEM: LfsError = LfsError(-12);
    /// 名称过长
    pub const NAMETOOLONG: LfsError = LfsError(-36);

    /// 从原始错误码构造；非负数不是错误，折算为 [`LfsError::INVAL`]
    pub const fn from_code(code: i32) -> Self {
        if code < 0 { LfsError(code) } else { LfsError::INVAL }
    }

    /// 原始错误码
    pub const fn code(self) -> i32 {
        self.0
    }
}

impl fmt::Display for LfsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lfs error {}", self.0)
    }
}

impl std::error::Error for LfsError {}
