//! Mock 实现模块
//!
//! 提供引擎与块设备的 Mock 实现，用于测试

pub mod device;
pub mod engine;
