//! 后端注册表
//!
//! 以名称登记多个能力表实现，调用方按名称取回 `Arc<dyn FileSystem>`。

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{FileSystem, FsError};

/// 后端注册表
pub struct FsRegistry {
    backends: RwLock<BTreeMap<String, Arc<dyn FileSystem>>>,
}

impl FsRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self {
            backends: RwLock::new(BTreeMap::new()),
        }
    }

    /// 以 `name` 登记后端；名称为空返回 [`FsError::InvalidArgument`]，
    /// 名称已被占用返回 [`FsError::AlreadyMounted`]
    pub fn register(&self, name: &str, fs: Arc<dyn FileSystem>) -> Result<(), FsError> {
        if name.is_empty() {
            return Err(FsError::InvalidArgument);
        }
        let mut backends = self.backends.write();
        if backends.contains_key(name) {
            log::warn!("registry: backend {} already registered", name);
            return Err(FsError::AlreadyMounted);
        }
        log::debug!("registry: register {} ({})", name, fs.fs_type());
        backends.insert(String::from(name), fs);
        Ok(())
    }

    /// 移除登记，返回被移除的后端
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn FileSystem>> {
        self.backends.write().remove(name)
    }

    /// 按名称查找
    pub fn get(&self, name: &str) -> Option<Arc<dyn FileSystem>> {
        self.backends.read().get(name).cloned()
    }

    /// 已登记的名称（按字典序）
    pub fn names(&self) -> Vec<String> {
        self.backends.read().keys().cloned().collect()
    }
}

impl Default for FsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
