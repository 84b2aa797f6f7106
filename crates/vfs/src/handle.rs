//! 不透明句柄
//!
//! 句柄持有后端分配的原生记录（类型被擦除为 `dyn Any`），并标记产生它的后端实例。
//! 句柄不可克隆；关闭操作按值消费句柄，因此关闭后无法再次使用。

use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::FsError;

static NEXT_BACKEND_ID: AtomicU64 = AtomicU64::new(1);

/// 后端实例标识
///
/// 每个后端实例在创建时分配一个唯一的标识，用于拒绝来自其他实例的句柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendId(u64);

impl BackendId {
    /// 分配一个新的、进程内唯一的标识
    pub fn next() -> Self {
        Self(NEXT_BACKEND_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Handle {
    owner: BackendId,
    record: Box<dyn Any + Send>,
}

impl Handle {
    fn new<T: Any + Send>(owner: BackendId, record: T) -> Self {
        Self {
            owner,
            record: Box::new(record),
        }
    }

    fn record_mut<T: Any>(&mut self, owner: BackendId) -> Result<&mut T, FsError> {
        if self.owner != owner {
            return Err(FsError::BadFileDescriptor);
        }
        self.record
            .downcast_mut::<T>()
            .ok_or(FsError::BadFileDescriptor)
    }

    fn into_record<T: Any>(self, owner: BackendId) -> Result<T, FsError> {
        if self.owner != owner {
            return Err(FsError::BadFileDescriptor);
        }
        let record: Box<dyn Any> = self.record;
        record
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| FsError::BadFileDescriptor)
    }
}

/// 打开的文件句柄
///
/// 由 [`crate::FileSystem::open`] 产生，由 [`crate::FileSystem::close`] 消费。
pub struct FileHandle(Handle);

impl FileHandle {
    /// 用后端的原生文件记录构造句柄（供后端实现使用）
    pub fn new<T: Any + Send>(owner: BackendId, record: T) -> Self {
        Self(Handle::new(owner, record))
    }

    /// 产生该句柄的后端实例
    pub fn owner(&self) -> BackendId {
        self.0.owner
    }

    /// 取出原生记录的可变引用
    ///
    /// 所属实例或记录类型不匹配时返回 [`FsError::BadFileDescriptor`]
    pub fn record_mut<T: Any>(&mut self, owner: BackendId) -> Result<&mut T, FsError> {
        self.0.record_mut(owner)
    }

    /// 消费句柄并取回原生记录
    pub fn into_record<T: Any>(self, owner: BackendId) -> Result<T, FsError> {
        self.0.into_record(owner)
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("owner", &self.0.owner)
            .finish_non_exhaustive()
    }
}

/// 打开的目录句柄
///
/// 由 [`crate::FileSystem::opendir`] 产生，由 [`crate::FileSystem::closedir`] 消费。
pub struct DirHandle(Handle);

impl DirHandle {
    /// 用后端的原生目录记录构造句柄（供后端实现使用）
    pub fn new<T: Any + Send>(owner: BackendId, record: T) -> Self {
        Self(Handle::new(owner, record))
    }

    /// 产生该句柄的后端实例
    pub fn owner(&self) -> BackendId {
        self.0.owner
    }

    /// 取出原生记录的可变引用
    pub fn record_mut<T: Any>(&mut self, owner: BackendId) -> Result<&mut T, FsError> {
        self.0.record_mut(owner)
    }

    /// 消费句柄并取回原生记录
    pub fn into_record<T: Any>(self, owner: BackendId) -> Result<T, FsError> {
        self.0.into_record(owner)
    }
}

impl fmt::Debug for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirHandle")
            .field("owner", &self.0.owner)
            .finish_non_exhaustive()
    }
}
