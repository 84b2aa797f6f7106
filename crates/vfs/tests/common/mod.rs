#![allow(dead_code)]

//! 测试用的最小后端：只实现目录遍历，其余操作返回 InvalidArgument

use parking_lot::Mutex;
use vfs::{
    BackendId, DirEntry, DirEntryType, DirHandle, FileHandle, FileSystem, FsError, OpenFlags,
    SeekWhence, Stat,
};

pub struct ScriptedFs {
    id: BackendId,
    entries: Vec<DirEntry>,
    fail_at: Option<usize>,
    pub readdir_calls: Mutex<usize>,
}

impl ScriptedFs {
    pub fn new(names: &[(&str, DirEntryType)]) -> Self {
        Self {
            id: BackendId::next(),
            entries: names
                .iter()
                .map(|(name, kind)| DirEntry {
                    name: name.to_string(),
                    kind: *kind,
                })
                .collect(),
            fail_at: None,
            readdir_calls: Mutex::new(0),
        }
    }

    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl FileSystem for ScriptedFs {
    fn fs_type(&self) -> &'static str {
        "scripted"
    }

    fn format(&self) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn mount(&self) -> Result<(), FsError> {
        Ok(())
    }

    fn unmount(&self) -> Result<(), FsError> {
        Ok(())
    }

    fn remove(&self, _path: &str) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn rename(&self, _old_path: &str, _new_path: &str) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn stat(&self, _path: &str) -> Result<Stat, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn mkdir(&self, _path: &str) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn open(&self, _path: &str, _flags: OpenFlags) -> Result<FileHandle, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn close(&self, _file: FileHandle) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn read(&self, _file: &mut FileHandle, _buf: &mut [u8]) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn write(&self, _file: &mut FileHandle, _buf: &[u8]) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn fsync(&self, _file: &mut FileHandle) -> Result<(), FsError> {
        Err(FsError::InvalidArgument)
    }

    fn seek(
        &self,
        _file: &mut FileHandle,
        _offset: isize,
        _whence: SeekWhence,
    ) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn tell(&self, _file: &mut FileHandle) -> Result<usize, FsError> {
        Err(FsError::InvalidArgument)
    }

    fn opendir(&self, _path: &str) -> Result<DirHandle, FsError> {
        Ok(DirHandle::new(self.id, 0usize))
    }

    fn closedir(&self, dir: DirHandle) -> Result<(), FsError> {
        dir.into_record::<usize>(self.id).map(|_| ())
    }

    fn readdir(&self, dir: &mut DirHandle) -> Result<DirEntry, FsError> {
        *self.readdir_calls.lock() += 1;
        let pos = dir.record_mut::<usize>(self.id)?;
        if self.fail_at == Some(*pos) {
            return Err(FsError::Engine(-84));
        }
        let entry = self.entries.get(*pos).cloned().unwrap_or_else(DirEntry::end);
        if !entry.is_end() {
            *pos += 1;
        }
        Ok(entry)
    }
}
