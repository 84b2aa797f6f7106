//! 块设备模块
//!
//! 包含块设备相关的驱动接口和实现

mod image_file;
mod ram_disk;

use core::fmt;

use crate::driver::Driver;

pub use image_file::ImageFile;
pub use ram_disk::RamDisk;

/// 擦除后的字节值
pub const ERASED_BYTE: u8 = 0xFF;

/// 块设备错误
///
/// 引擎只需要知道操作失败；具体的宿主错误在设备内部记录日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    /// 访问超出设备几何范围
    OutOfRange,
    /// 宿主 I/O 失败（定位失败、短读写、刷新失败）
    Io,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockError::OutOfRange => write!(f, "block access out of range"),
            BlockError::Io => write!(f, "block I/O failed"),
        }
    }
}

impl std::error::Error for BlockError {}

/// 块设备驱动程序接口
///
/// 地址由（块号，块内偏移）给出。所有方法都取 `&self`，实现负责内部互斥。
pub trait BlockDriver: Driver {
    /// 从 `block` 的 `offset` 处读取 `buf.len()` 字节
    fn read_block(&self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError>;

    /// 向 `block` 的 `offset` 处编程（写入）`buf.len()` 字节
    fn prog_block(&self, block: u32, offset: u32, buf: &[u8]) -> Result<(), BlockError>;

    /// 擦除整个块，擦除后全部字节为 [`ERASED_BYTE`]
    fn erase_block(&self, block: u32) -> Result<(), BlockError>;

    /// 刷新到存储
    fn sync(&self) -> Result<(), BlockError>;

    /// 块大小（字节）
    fn block_size(&self) -> usize;

    /// 总块数
    fn block_count(&self) -> usize;
}

/// 检查一次访问是否落在设备几何范围内，返回对应的字节偏移
pub fn check_range(
    block_size: usize,
    block_count: usize,
    block: u32,
    offset: u32,
    len: usize,
) -> Result<u64, BlockError> {
    let block = block as usize;
    let offset = offset as usize;
    if block >= block_count || offset.checked_add(len).is_none_or(|end| end > block_size) {
        return Err(BlockError::OutOfRange);
    }
    block_size
        .checked_mul(block)
        .and_then(|start| start.checked_add(offset))
        .map(|pos| pos as u64)
        .ok_or(BlockError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_range() {
        assert_eq!(check_range(4096, 4, 0, 0, 4096), Ok(0));
        assert_eq!(check_range(4096, 4, 2, 256, 256), Ok(2 * 4096 + 256));
        assert_eq!(check_range(4096, 4, 3, 4000, 96), Ok(3 * 4096 + 4000));

        assert_eq!(check_range(4096, 4, 4, 0, 1), Err(BlockError::OutOfRange));
        assert_eq!(check_range(4096, 4, 0, 4000, 97), Err(BlockError::OutOfRange));
        assert_eq!(check_range(4096, 4, 0, 4096, 1), Err(BlockError::OutOfRange));

        // 几何参数本身溢出地址空间
        assert_eq!(
            check_range(usize::MAX / 2, 4, 3, 0, 1),
            Err(BlockError::OutOfRange)
        );
    }
}
