//! 元数据：模式位与 stat 记录

use uapi::stat::*;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件权限和类型（与 POSIX 兼容）
    pub struct FileMode: u32 {
        /// 文件类型掩码
        const S_IFMT   = S_IFMT;
        /// 普通文件
        const S_IFREG  = S_IFREG;
        /// 目录
        const S_IFDIR  = S_IFDIR;

        /// 用户读写执行
        const S_IRWXU  = S_IRWXU;
        /// 用户读
        const S_IRUSR  = S_IRUSR;
        /// 用户写
        const S_IWUSR  = S_IWUSR;
        /// 用户执行
        const S_IXUSR  = S_IXUSR;

        /// 组读写执行
        const S_IRWXG  = S_IRWXG;
        /// 组读
        const S_IRGRP  = S_IRGRP;
        /// 组写
        const S_IWGRP  = S_IWGRP;
        /// 组执行
        const S_IXGRP  = S_IXGRP;

        /// 其他用户读写执行
        const S_IRWXO  = S_IRWXO;
        /// 其他读
        const S_IROTH  = S_IROTH;
        /// 其他写
        const S_IWOTH  = S_IWOTH;
        /// 其他执行
        const S_IXOTH  = S_IXOTH;
    }
}

impl FileMode {
    /// 所有用户的全部访问权限（0o777）
    pub const ALL_ACCESS: FileMode = FileMode::S_IRWXU
        .union(FileMode::S_IRWXG)
        .union(FileMode::S_IRWXO);

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.bits() & S_IFMT == S_IFDIR
    }

    /// 是否为普通文件
    pub fn is_file(&self) -> bool {
        self.bits() & S_IFMT == S_IFREG
    }

    /// 权限位部分
    pub fn permissions(&self) -> u32 {
        self.bits() & 0o7777
    }
}

/// 文件元数据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// 文件大小（字节）
    pub size: usize,
    /// 类型位 | 权限位
    pub mode: FileMode,
}

impl Stat {
    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    /// 是否为普通文件
    pub fn is_file(&self) -> bool {
        self.mode.is_file()
    }
}
