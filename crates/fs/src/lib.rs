//! # 文件系统模块 (FS)
//!
//! 本模块提供具体的文件系统后端，通过实现 VFS 的 `FileSystem` trait 与虚拟文件系统层集成。
//!
//! ## 支持的文件系统
//!
//! - **[littlefs]**: 由外部 littlefs 引擎驱动的块镜像卷

#![doc = "文件系统实现"]

pub mod littlefs;

pub use littlefs::{
    BLOCK_SIZE, DEFAULT_BLOCK_COUNT, IO_SIZE, ImageMode, LfsFileSystem, VolumeConfig,
};

/// 由 littlefs C 实现驱动的卷
#[cfg(feature = "littlefs")]
pub type LittleFsVolume = LfsFileSystem<lfs::LittleFs>;
