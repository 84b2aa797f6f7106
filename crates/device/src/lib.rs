//! 块设备层
//!
//! 此 crate 为文件系统引擎提供块设备语义，包括：
//!
//! - [`Driver`] trait - 设备基础接口
//! - [`BlockDriver`] trait - 按块寻址的读、编程、擦除、同步
//! - [`ImageFile`] - 以单个宿主文件模拟的块设备
//! - [`RamDisk`] - 内存模拟的块设备
//!
//! 擦除后的字节值为 [`ERASED_BYTE`]（`0xFF`）。

pub mod block;
pub mod driver;

// Re-export driver
pub use driver::Driver;

// Re-export block
pub use block::{BlockDriver, BlockError, ERASED_BYTE, ImageFile, RamDisk, check_range};
