//! 内存模拟块设备

use std::sync::Arc;

use parking_lot::Mutex;

use super::{BlockDriver, BlockError, ERASED_BYTE, check_range};
use crate::driver::Driver;

/// 内存模拟的块设备
///
/// 用于测试和开发；新建时处于已擦除状态
pub struct RamDisk {
    /// 存储数据
    data: Mutex<Vec<u8>>,

    /// 块大小
    block_size: usize,

    /// 设备 ID
    device_id: usize,
}

impl RamDisk {
    /// 创建 `block_count` 个块的内存磁盘
    pub fn new(block_size: usize, block_count: usize, device_id: usize) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(vec![ERASED_BYTE; block_size * block_count]),
            block_size,
            device_id,
        })
    }

    /// 从字节数组创建，多余的不足一块的尾部不可寻址
    pub fn from_bytes(data: Vec<u8>, block_size: usize, device_id: usize) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(data),
            block_size,
            device_id,
        })
    }

    /// 获取原始数据（用于调试）
    pub fn raw_data(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    /// 获取设备 ID
    pub fn device_id(&self) -> usize {
        self.device_id
    }
}

impl Driver for RamDisk {
    fn get_id(&self) -> String {
        format!("ramdisk_{}", self.device_id)
    }

    fn as_block(&self) -> Option<&dyn BlockDriver> {
        Some(self)
    }
}

impl BlockDriver for RamDisk {
    fn read_block(&self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        let data = self.data.lock();
        let blocks = data.len() / self.block_size;
        let start = check_range(self.block_size, blocks, block, offset, buf.len())? as usize;
        buf.copy_from_slice(&data[start..start + buf.len()]);
        Ok(())
    }

    fn prog_block(&self, block: u32, offset: u32, buf: &[u8]) -> Result<(), BlockError> {
        let mut data = self.data.lock();
        let blocks = data.len() / self.block_size;
        let start = check_range(self.block_size, blocks, block, offset, buf.len())? as usize;
        data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }

    fn erase_block(&self, block: u32) -> Result<(), BlockError> {
        let mut data = self.data.lock();
        let blocks = data.len() / self.block_size;
        let start = check_range(self.block_size, blocks, block, 0, self.block_size)? as usize;
        data[start..start + self.block_size].fill(ERASED_BYTE);
        Ok(())
    }

    fn sync(&self) -> Result<(), BlockError> {
        Ok(()) // 内存设备无需 flush
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.data.lock().len() / self.block_size
    }
}
