//! 引擎的路径级 API

use crate::{Config, LfsError, LfsInfo, LfsOpenFlags, LfsWhence};

/// 块结构文件系统引擎
///
/// 引擎值本身就是挂载后的运行时记录：[`Engine::mount`] 产生它，[`Engine::unmount`] 消费它。
/// 文件与目录记录由引擎按值返回，调用方负责保存并在关闭时交还。
/// 所有方法都是同步的，调用方负责串行化。
pub trait Engine: Sized + Send + 'static {
    /// 打开文件的原生记录
    type File: Send + 'static;

    /// 打开目录的原生记录
    type Dir: Send + 'static;

    /// 在配置描述的存储上创建空文件系统
    fn format(config: &Config) -> Result<(), LfsError>;

    /// 挂载；失败时不产生任何运行时记录
    fn mount(config: &Config) -> Result<Self, LfsError>;

    /// 卸载并释放运行时记录
    fn unmount(self) -> Result<(), LfsError>;

    /// 删除文件或空目录
    fn remove(&mut self, path: &str) -> Result<(), LfsError>;

    /// 重命名/移动
    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), LfsError>;

    /// 查询条目信息
    fn stat(&mut self, path: &str) -> Result<LfsInfo, LfsError>;

    /// 创建目录；已存在时返回 [`LfsError::EXIST`]
    fn mkdir(&mut self, path: &str) -> Result<(), LfsError>;

    /// 打开文件
    fn file_open(&mut self, path: &str, flags: LfsOpenFlags) -> Result<Self::File, LfsError>;

    /// 关闭文件（隐含同步）
    fn file_close(&mut self, file: Self::File) -> Result<(), LfsError>;

    /// 读取，返回读取的字节数
    fn file_read(&mut self, file: &mut Self::File, buf: &mut [u8]) -> Result<usize, LfsError>;

    /// 写入，返回写入的字节数
    fn file_write(&mut self, file: &mut Self::File, buf: &[u8]) -> Result<usize, LfsError>;

    /// 将文件的挂起修改写入存储
    fn file_sync(&mut self, file: &mut Self::File) -> Result<(), LfsError>;

    /// 设置位置，返回新位置
    fn file_seek(
        &mut self,
        file: &mut Self::File,
        offset: i64,
        whence: LfsWhence,
    ) -> Result<u64, LfsError>;

    /// 当前位置
    fn file_tell(&mut self, file: &mut Self::File) -> Result<u64, LfsError>;

    /// 打开目录
    fn dir_open(&mut self, path: &str) -> Result<Self::Dir, LfsError>;

    /// 关闭目录
    fn dir_close(&mut self, dir: Self::Dir) -> Result<(), LfsError>;

    /// 读取下一个条目；没有剩余条目时返回 `None`
    fn dir_read(&mut self, dir: &mut Self::Dir) -> Result<Option<LfsInfo>, LfsError>;
}
