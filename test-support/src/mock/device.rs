//! 故障注入块设备
//!
//! 包装任意块设备，按需让指定类型的操作失败，用于验证 I/O 错误的传播路径。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use device::{BlockDriver, BlockError, Driver};

/// 可注入故障的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// 读
    Read,
    /// 编程
    Prog,
    /// 擦除
    Erase,
    /// 同步
    Sync,
}

impl Fault {
    fn index(self) -> usize {
        match self {
            Fault::Read => 0,
            Fault::Prog => 1,
            Fault::Erase => 2,
            Fault::Sync => 3,
        }
    }
}

/// 故障注入块设备
pub struct FaultyDevice {
    inner: Arc<dyn BlockDriver>,
    faults: [AtomicBool; 4],
    /// 已注入的失败次数
    failures: AtomicUsize,
}

impl FaultyDevice {
    /// 包装一个块设备，初始不注入任何故障
    pub fn new(inner: Arc<dyn BlockDriver>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            faults: Default::default(),
            failures: AtomicUsize::new(0),
        })
    }

    /// 开启或关闭某类操作的故障
    pub fn set_fault(&self, fault: Fault, enabled: bool) {
        self.faults[fault.index()].store(enabled, Ordering::SeqCst);
    }

    /// 关闭全部故障
    pub fn clear(&self) {
        for fault in &self.faults {
            fault.store(false, Ordering::SeqCst);
        }
    }

    /// 已注入的失败次数
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    fn check(&self, fault: Fault) -> Result<(), BlockError> {
        if self.faults[fault.index()].load(Ordering::SeqCst) {
            self.failures.fetch_add(1, Ordering::SeqCst);
            return Err(BlockError::Io);
        }
        Ok(())
    }
}

impl Driver for FaultyDevice {
    fn get_id(&self) -> String {
        format!("faulty:{}", self.inner.get_id())
    }

    fn as_block(&self) -> Option<&dyn BlockDriver> {
        Some(self)
    }
}

impl BlockDriver for FaultyDevice {
    fn read_block(&self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        self.check(Fault::Read)?;
        self.inner.read_block(block, offset, buf)
    }

    fn prog_block(&self, block: u32, offset: u32, buf: &[u8]) -> Result<(), BlockError> {
        self.check(Fault::Prog)?;
        self.inner.prog_block(block, offset, buf)
    }

    fn erase_block(&self, block: u32) -> Result<(), BlockError> {
        self.check(Fault::Erase)?;
        self.inner.erase_block(block)
    }

    fn sync(&self) -> Result<(), BlockError> {
        self.check(Fault::Sync)?;
        self.inner.sync()
    }

    fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    fn block_count(&self) -> usize {
        self.inner.block_count()
    }
}
