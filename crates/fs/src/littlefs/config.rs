//! 卷配置

use std::sync::Arc;

use device::BlockDriver;
use vfs::VFS_MAX_NAME_LEN;

/// 默认块大小（字节）
pub const BLOCK_SIZE: usize = 4096;

/// 默认读/编程粒度（字节）
pub const IO_SIZE: usize = 256;

/// 调用方未指定块数时使用的块数
pub const DEFAULT_BLOCK_COUNT: usize = 4059;

/// 镜像文件的打开方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    /// 创建（或截断）镜像，填充擦除值并格式化
    Create,
    /// 以读写方式打开已有镜像
    Open,
    /// 以只读方式打开已有镜像
    ReadOnly,
}

/// 卷配置
///
/// 取值为 0 的几何参数使用默认值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeConfig {
    /// 引擎的文件名长度上限，0 表示由引擎决定
    pub name_max: usize,
    /// 读/编程粒度，同时用作缓存与前瞻缓冲区大小
    pub io_size: usize,
    /// 块大小
    pub block_size: usize,
    /// 块数
    pub block_count: usize,
    /// 擦除周期上限，`None` 表示不限
    pub block_cycles: Option<u32>,
    /// readdir 返回的名称上限（名称长度必须严格小于该值）
    pub max_entry_name: usize,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            name_max: 0,
            io_size: IO_SIZE,
            block_size: BLOCK_SIZE,
            block_count: DEFAULT_BLOCK_COUNT,
            block_cycles: None,
            max_entry_name: VFS_MAX_NAME_LEN,
        }
    }
}

impl VolumeConfig {
    /// 将为 0 的字段替换为默认值
    pub fn resolved(&self) -> Self {
        fn or(value: usize, default: usize) -> usize {
            if value == 0 { default } else { value }
        }

        Self {
            name_max: self.name_max,
            io_size: or(self.io_size, IO_SIZE),
            block_size: or(self.block_size, BLOCK_SIZE),
            block_count: or(self.block_count, DEFAULT_BLOCK_COUNT),
            block_cycles: self.block_cycles,
            max_entry_name: or(self.max_entry_name, VFS_MAX_NAME_LEN),
        }
    }

    /// 解析默认值后的几何参数（不涉及设备）
    pub fn geometry(&self) -> lfs::Geometry {
        let cfg = self.resolved();
        lfs::Geometry {
            read_size: cfg.io_size,
            prog_size: cfg.io_size,
            block_size: cfg.block_size,
            block_count: cfg.block_count,
            cache_size: cfg.io_size,
            lookahead_size: cfg.io_size,
        }
    }

    /// 生成引擎配置，块级回调指向 `device`
    pub fn to_engine_config(&self, device: Arc<dyn BlockDriver>) -> lfs::Config {
        let cfg = self.resolved();
        lfs::Config {
            device,
            read_size: cfg.io_size,
            prog_size: cfg.io_size,
            block_size: cfg.block_size,
            block_count: cfg.block_count,
            cache_size: cfg.io_size,
            lookahead_size: cfg.io_size,
            block_cycles: cfg.block_cycles,
            name_max: cfg.name_max,
        }
    }
}
