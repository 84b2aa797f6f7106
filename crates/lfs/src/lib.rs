//! 文件系统引擎绑定接口
//!
//! 引擎是外部协作者：它实现分配、目录索引与块轮换算法，本 crate 只定义如何与它交互：
//!
//! - [`Engine`] trait - 引擎的路径级 API（格式化、挂载、文件/目录操作）
//! - [`Config`] - 引擎配置，携带块设备回调与几何参数
//! - 引擎原生词汇：[`LfsError`]、[`LfsOpenFlags`]、[`LfsWhence`]、[`LfsType`]、[`LfsInfo`]
//!
//! 启用 `littlefs` 特性后，`LittleFs` 提供基于 littlefs C 实现的引擎。
//!
//! 引擎只能通过 [`Config`] 上的四个块级原语（读、编程、擦除、同步）访问存储。

mod config;
mod engine;
mod error;
#[cfg(feature = "littlefs")]
mod littlefs;
mod types;

pub use config::{Config, Geometry, MIN_BLOCK_SIZE, MIN_IO_SIZE};
pub use engine::Engine;
pub use error::LfsError;
#[cfg(feature = "littlefs")]
pub use littlefs::{LittleFs, LittleFsDir, LittleFsFile};
pub use types::{LfsInfo, LfsOpenFlags, LfsType, LfsWhence};
