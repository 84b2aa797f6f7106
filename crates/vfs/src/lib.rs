//! 虚拟文件系统能力表
//!
//! 此 crate 提供与具体后端无关的文件系统抽象，包括：
//!
//! - [`FileSystem`] trait - 后端必须实现的固定操作集合
//! - [`FileHandle`] / [`DirHandle`] - 调用方独占的不透明句柄
//! - [`DirEntry`] / [`ReadDir`] - 目录项与目录遍历
//! - [`Stat`] / [`FileMode`] - 元数据
//! - [`FsRegistry`] - 按名称登记多个后端
//! - 卷内路径规范化

pub mod error;

mod dir;
mod file;
mod file_system;
mod handle;
mod path;
mod registry;
mod stat;

// Re-export error
pub use error::FsError;

// Re-export file
pub use file::{OpenFlags, SeekWhence};

// Re-export handle
pub use handle::{BackendId, DirHandle, FileHandle};

// Re-export dir
pub use dir::{DirEntry, DirEntryType, ReadDir, VFS_MAX_NAME_LEN};

// Re-export stat
pub use stat::{FileMode, Stat};

// Re-export file_system
pub use file_system::FileSystem;

// Re-export registry
pub use registry::FsRegistry;

// Re-export path
pub use path::{normalize_path, path_components, split_path};
