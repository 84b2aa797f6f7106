//! 引擎配置与块设备回调

use core::fmt;
use std::sync::Arc;

use device::BlockDriver;

use crate::LfsError;

/// 引擎配置
///
/// 挂载或格式化之前构造，之后不再变化。块级回调统一通过此结构访问底层设备，
/// 任何设备错误都折算为单一的 [`LfsError::IO`] 交给引擎。
#[derive(Clone)]
pub struct Config {
    /// 底层块设备（块级回调的上下文）
    pub device: Arc<dyn BlockDriver>,
    /// 最小读取粒度
    pub read_size: usize,
    /// 最小编程粒度
    pub prog_size: usize,
    /// 擦除块大小
    pub block_size: usize,
    /// 块数
    pub block_count: usize,
    /// 每个缓存的大小
    pub cache_size: usize,
    /// 前瞻缓冲区大小
    pub lookahead_size: usize,
    /// 擦除周期上限，`None` 表示不做块轮换
    pub block_cycles: Option<u32>,
    /// 文件名长度上限，0 表示由引擎决定
    pub name_max: usize,
}

/// 最小读取/编程粒度
pub const MIN_IO_SIZE: usize = 8;

/// 最小块大小
pub const MIN_BLOCK_SIZE: usize = 128;

/// 卷的几何参数
///
/// 与设备无关，可以在打开或创建存储之前校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// 最小读取粒度
    pub read_size: usize,
    /// 最小编程粒度
    pub prog_size: usize,
    /// 擦除块大小
    pub block_size: usize,
    /// 块数
    pub block_count: usize,
    /// 每个缓存的大小
    pub cache_size: usize,
    /// 前瞻缓冲区大小
    pub lookahead_size: usize,
}

impl Geometry {
    /// 检查几何参数
    ///
    /// 各粒度为 2 的幂且不小于 [`MIN_IO_SIZE`]，并整除块大小；块大小不小于
    /// [`MIN_BLOCK_SIZE`]；前瞻缓冲区为 8 的非零倍数；总容量不溢出。
    pub fn validate(&self) -> Result<(), LfsError> {
        let sizes = [
            self.read_size,
            self.prog_size,
            self.block_size,
            self.cache_size,
        ];
        if sizes.iter().any(|size| !size.is_power_of_two()) {
            return Err(LfsError::INVAL);
        }
        if self.read_size < MIN_IO_SIZE
            || self.prog_size < MIN_IO_SIZE
            || self.cache_size < MIN_IO_SIZE
            || self.block_size < MIN_BLOCK_SIZE
        {
            return Err(LfsError::INVAL);
        }
        if self.block_size % self.read_size != 0
            || self.block_size % self.prog_size != 0
            || self.block_size % self.cache_size != 0
        {
            return Err(LfsError::INVAL);
        }
        if self.lookahead_size == 0 || self.lookahead_size % 8 != 0 {
            return Err(LfsError::INVAL);
        }
        if self.block_count == 0 || u32::try_from(self.block_count).is_err() {
            return Err(LfsError::INVAL);
        }
        if self.block_size.checked_mul(self.block_count).is_none() {
            return Err(LfsError::INVAL);
        }
        Ok(())
    }
}

impl Config {
    /// 几何参数
    pub fn geometry(&self) -> Geometry {
        Geometry {
            read_size: self.read_size,
            prog_size: self.prog_size,
            block_size: self.block_size,
            block_count: self.block_count,
            cache_size: self.cache_size,
            lookahead_size: self.lookahead_size,
        }
    }

    /// 检查几何参数，并确认设备能容纳整个卷
    pub fn validate(&self) -> Result<(), LfsError> {
        self.geometry().validate()?;
        if self.device.block_size() != self.block_size
            || self.device.block_count() < self.block_count
        {
            return Err(LfsError::INVAL);
        }
        Ok(())
    }

    /// 块级回调：读
    pub fn read(&self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), LfsError> {
        self.device.read_block(block, offset, buf).map_err(|e| {
            log::warn!("lfs: read block {} off {} failed: {}", block, offset, e);
            LfsError::IO
        })
    }

    /// 块级回调：编程
    pub fn prog(&self, block: u32, offset: u32, buf: &[u8]) -> Result<(), LfsError> {
        self.device.prog_block(block, offset, buf).map_err(|e| {
            log::warn!("lfs: prog block {} off {} failed: {}", block, offset, e);
            LfsError::IO
        })
    }

    /// 块级回调：擦除
    pub fn erase(&self, block: u32) -> Result<(), LfsError> {
        self.device.erase_block(block).map_err(|e| {
            log::warn!("lfs: erase block {} failed: {}", block, e);
            LfsError::IO
        })
    }

    /// 块级回调：同步
    pub fn sync(&self) -> Result<(), LfsError> {
        self.device.sync().map_err(|e| {
            log::warn!("lfs: sync failed: {}", e);
            LfsError::IO
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("device", &self.device.get_id())
            .field("read_size", &self.read_size)
            .field("prog_size", &self.prog_size)
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .field("cache_size", &self.cache_size)
            .field("lookahead_size", &self.lookahead_size)
            .field("block_cycles", &self.block_cycles)
            .field("name_max", &self.name_max)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::RamDisk;

    fn config(block_size: usize, io_size: usize) -> Config {
        Config {
            device: RamDisk::new(block_size, 8, 0),
            read_size: io_size,
            prog_size: io_size,
            block_size,
            block_count: 8,
            cache_size: io_size,
            lookahead_size: io_size,
            block_cycles: None,
            name_max: 255,
        }
    }

    #[test]
    fn test_validate_geometry() {
        assert!(config(4096, 256).validate().is_ok());
        assert!(config(512, 512).validate().is_ok());
        assert_eq!(config(4096, 300).validate(), Err(LfsError::INVAL));
        assert_eq!(config(4096, 8192).validate(), Err(LfsError::INVAL));

        let mut cfg = config(4096, 256);
        cfg.block_count = 16; // 设备只有 8 块
        assert_eq!(cfg.validate(), Err(LfsError::INVAL));
    }

    #[test]
    fn test_lookahead_and_io_lower_bounds() {
        // io 粒度 1/2/4 同时也会成为前瞻缓冲区大小
        for io in [1, 2, 4] {
            assert_eq!(config(512, io).validate(), Err(LfsError::INVAL));
        }
        assert!(config(512, 8).validate().is_ok());

        let mut cfg = config(512, 64);
        cfg.lookahead_size = 12;
        assert_eq!(cfg.validate(), Err(LfsError::INVAL));
        cfg.lookahead_size = 0;
        assert_eq!(cfg.validate(), Err(LfsError::INVAL));
        cfg.lookahead_size = 16;
        assert!(cfg.validate().is_ok());

        // 块大小下限
        assert_eq!(config(64, 8).validate(), Err(LfsError::INVAL));
    }

    #[test]
    fn test_geometry_capacity_overflow() {
        let geometry = Geometry {
            read_size: 256,
            prog_size: 256,
            block_size: 1usize << (usize::BITS - 1),
            block_count: u32::MAX as usize,
            cache_size: 256,
            lookahead_size: 256,
        };
        assert_eq!(geometry.validate(), Err(LfsError::INVAL));

        let geometry = Geometry {
            block_size: 4096,
            block_count: 4059,
            ..geometry
        };
        assert!(geometry.validate().is_ok());
    }

    #[test]
    fn test_device_errors_become_io() {
        let cfg = config(512, 128);
        let mut buf = [0u8; 16];
        assert_eq!(cfg.read(8, 0, &mut buf), Err(LfsError::IO));
        assert_eq!(cfg.prog(0, 510, &buf), Err(LfsError::IO));
        assert_eq!(cfg.erase(100), Err(LfsError::IO));

        cfg.prog(1, 0, b"ok").unwrap();
        cfg.read(1, 0, &mut buf[..2]).unwrap();
        assert_eq!(&buf[..2], b"ok");
        cfg.sync().unwrap();
    }
}
