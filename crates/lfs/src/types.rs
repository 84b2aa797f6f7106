//! 引擎原生的标志与记录

bitflags::bitflags! {
    /// 引擎的文件打开标志
    ///
    /// 访问模式占低两位：RDONLY=1，WRONLY=2，RDWR=3。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LfsOpenFlags: u32 {
        /// 只读
        const RDONLY = 0x001;
        /// 只写
        const WRONLY = 0x002;
        /// 读写
        const RDWR   = 0x003;
        /// 不存在时创建
        const CREAT  = 0x100;
        /// 已存在则失败
        const EXCL   = 0x200;
        /// 截断为 0
        const TRUNC  = 0x400;
        /// 追加写
        const APPEND = 0x800;
    }
}

impl LfsOpenFlags {
    /// 是否带读权限
    pub fn can_read(self) -> bool {
        self.bits() & LfsOpenFlags::RDONLY.bits() != 0
    }

    /// 是否带写权限
    pub fn can_write(self) -> bool {
        self.bits() & LfsOpenFlags::WRONLY.bits() != 0
    }
}

/// 引擎的定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfsWhence {
    /// 绝对位置
    Set = 0,
    /// 相对当前位置
    Cur = 1,
    /// 相对文件末尾
    End = 2,
}

/// 引擎的条目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LfsType {
    /// 普通文件
    Reg = 0x001,
    /// 目录
    Dir = 0x002,
}

/// 引擎的条目信息（stat / dir_read 返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LfsInfo {
    /// 类型
    pub kind: LfsType,
    /// 大小（仅对普通文件有意义）
    pub size: u32,
    /// 名称
    pub name: String,
}
