//! 文件系统能力表
//!
//! [`FileSystem`] 是一组固定的操作槽位，任何后端都必须全部实现。
//! 调用方只通过该 trait（通常是 `Arc<dyn FileSystem>`）访问后端，从不依赖具体后端类型。

use crate::{DirEntry, DirHandle, FileHandle, FsError, OpenFlags, SeekWhence, Stat};

/// 文件系统 trait
///
/// 所有后端实现都必须实现此 trait。路径操作在卷未挂载时返回 [`FsError::NotMounted`]；
/// 句柄操作在卷未挂载时返回 [`FsError::BadFileDescriptor`]，因为此时不可能存在有效句柄。
pub trait FileSystem: Send + Sync {
    /// 文件系统类型名称
    fn fs_type(&self) -> &'static str;

    // ========== 卷生命周期 ==========

    /// 格式化后端存储（不需要预先挂载）
    fn format(&self) -> Result<(), FsError>;

    /// 挂载卷；已挂载时返回 [`FsError::AlreadyMounted`]
    fn mount(&self) -> Result<(), FsError>;

    /// 卸载卷；未挂载时返回 [`FsError::NotMounted`]
    ///
    /// 调用前应关闭所有句柄，之后再使用旧句柄会得到 [`FsError::BadFileDescriptor`]。
    fn unmount(&self) -> Result<(), FsError>;

    // ========== 路径操作 ==========

    /// 删除文件或空目录
    fn remove(&self, path: &str) -> Result<(), FsError>;

    /// 重命名/移动
    fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError>;

    /// 查询元数据
    fn stat(&self, path: &str) -> Result<Stat, FsError>;

    /// 创建目录；目录已存在视为成功
    fn mkdir(&self, path: &str) -> Result<(), FsError>;

    // ========== 文件句柄 ==========

    /// 打开文件
    fn open(&self, path: &str, flags: OpenFlags) -> Result<FileHandle, FsError>;

    /// 关闭文件；无论结果如何句柄都被释放
    fn close(&self, file: FileHandle) -> Result<(), FsError>;

    /// 从当前位置读取，返回读取的字节数
    fn read(&self, file: &mut FileHandle, buf: &mut [u8]) -> Result<usize, FsError>;

    /// 在当前位置写入，返回写入的字节数
    fn write(&self, file: &mut FileHandle, buf: &[u8]) -> Result<usize, FsError>;

    /// 将文件数据同步到存储
    fn fsync(&self, file: &mut FileHandle) -> Result<(), FsError>;

    /// 设置偏移量，返回新的偏移量
    fn seek(&self, file: &mut FileHandle, offset: isize, whence: SeekWhence)
    -> Result<usize, FsError>;

    /// 获取当前偏移量
    fn tell(&self, file: &mut FileHandle) -> Result<usize, FsError>;

    // ========== 目录句柄 ==========

    /// 打开目录
    fn opendir(&self, path: &str) -> Result<DirHandle, FsError>;

    /// 关闭目录；无论结果如何句柄都被释放
    fn closedir(&self, dir: DirHandle) -> Result<(), FsError>;

    /// 读取下一个目录项
    ///
    /// 遍历结束时返回 [`DirEntry::end`]，重复调用仍返回结束标记。
    fn readdir(&self, dir: &mut DirHandle) -> Result<DirEntry, FsError>;
}
