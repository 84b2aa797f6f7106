//! littlefs 引擎
//!
//! 通过 `littlefs2-sys` 调用 littlefs 的 C 实现。块级回调经由 [`Config`] 转发到块设备，
//! 因此卷的磁盘布局与其他 littlefs 实现互通。
//!
//! `lfs_t`、C 配置、缓存以及打开的文件/目录记录都放在固定地址的 `Box` 中：
//! littlefs 保存指向它们的指针（配置、缓冲区、打开记录链表），直到卸载才释放。
//! 文件与目录记录留在引擎的槽位表里，调用方只拿到槽位号，
//! 因此调用方丢弃句柄而不关闭也不会留下悬空指针。

use core::ffi::c_void;
use core::mem;
use std::ffi::{CStr, CString};

use littlefs2_sys as sys;

use crate::{Config, Engine, LfsError, LfsInfo, LfsOpenFlags, LfsType, LfsWhence};

/// 卷的固定地址状态
struct Volume {
    lfs: sys::lfs_t,
    cfg: sys::lfs_config,
    /// 回调上下文，`cfg.context` 指向它
    config: Config,
    read_buffer: Vec<u8>,
    prog_buffer: Vec<u8>,
    lookahead_buffer: Vec<u8>,
}

impl Volume {
    fn new(config: &Config) -> Result<Box<Self>, LfsError> {
        config.validate()?;
        let size = |value: usize| u32::try_from(value).map_err(|_| LfsError::INVAL);
        let block_cycles = match config.block_cycles {
            Some(cycles) => i32::try_from(cycles).map_err(|_| LfsError::INVAL)?,
            None => -1,
        };

        // SAFETY: 纯 C 结构体，全零即回调为空、指针为空、数值取默认
        let mut volume = Box::new(Self {
            lfs: unsafe { mem::zeroed() },
            cfg: unsafe { mem::zeroed() },
            config: config.clone(),
            read_buffer: vec![0; config.cache_size],
            prog_buffer: vec![0; config.cache_size],
            lookahead_buffer: vec![0; config.lookahead_size],
        });

        let v = &mut *volume;
        v.cfg.context = &v.config as *const Config as *mut c_void;
        v.cfg.read = Some(block_read);
        v.cfg.prog = Some(block_prog);
        v.cfg.erase = Some(block_erase);
        v.cfg.sync = Some(block_sync);
        v.cfg.read_size = size(config.read_size)?;
        v.cfg.prog_size = size(config.prog_size)?;
        v.cfg.block_size = size(config.block_size)?;
        v.cfg.block_count = size(config.block_count)?;
        v.cfg.block_cycles = block_cycles;
        v.cfg.cache_size = size(config.cache_size)?;
        v.cfg.lookahead_size = size(config.lookahead_size)?;
        v.cfg.name_max = size(config.name_max)?;
        v.cfg.read_buffer = v.read_buffer.as_mut_ptr().cast();
        v.cfg.prog_buffer = v.prog_buffer.as_mut_ptr().cast();
        v.cfg.lookahead_buffer = v.lookahead_buffer.as_mut_ptr().cast();

        Ok(volume)
    }
}

/// 打开的文件：C 记录、文件配置与文件缓存
struct OpenFile {
    file: sys::lfs_file_t,
    config: sys::lfs_file_config,
    buffer: Vec<u8>,
}

/// 打开文件的槽位号
#[derive(Debug)]
pub struct LittleFsFile(usize);

/// 打开目录的槽位号
#[derive(Debug)]
pub struct LittleFsDir(usize);

/// 挂载后的 littlefs 卷
pub struct LittleFs {
    volume: Box<Volume>,
    files: Vec<Option<Box<OpenFile>>>,
    dirs: Vec<Option<Box<sys::lfs_dir_t>>>,
}

// SAFETY: 裸指针只指向本值拥有的堆内存，所有访问都经过 `&mut self`
unsafe impl Send for LittleFs {}

// ========== 块级回调 ==========

/// 取回回调上下文
///
/// SAFETY: `context` 由 [`Volume::new`] 设为同一个 `Volume` 内的 [`Config`]，
/// littlefs 只在该卷存活期间调用回调。
unsafe fn context<'a>(c: *const sys::lfs_config) -> &'a Config {
    unsafe { &*((*c).context as *const Config) }
}

fn to_code(result: Result<(), LfsError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

unsafe extern "C" fn block_read(
    c: *const sys::lfs_config,
    block: sys::lfs_block_t,
    off: sys::lfs_off_t,
    buffer: *mut c_void,
    size: sys::lfs_size_t,
) -> i32 {
    let config = unsafe { context(c) };
    let buf = unsafe { core::slice::from_raw_parts_mut(buffer.cast::<u8>(), size as usize) };
    to_code(config.read(block, off, buf))
}

unsafe extern "C" fn block_prog(
    c: *const sys::lfs_config,
    block: sys::lfs_block_t,
    off: sys::lfs_off_t,
    buffer: *const c_void,
    size: sys::lfs_size_t,
) -> i32 {
    let config = unsafe { context(c) };
    let buf = unsafe { core::slice::from_raw_parts(buffer.cast::<u8>(), size as usize) };
    to_code(config.prog(block, off, buf))
}

unsafe extern "C" fn block_erase(c: *const sys::lfs_config, block: sys::lfs_block_t) -> i32 {
    let config = unsafe { context(c) };
    to_code(config.erase(block))
}

unsafe extern "C" fn block_sync(c: *const sys::lfs_config) -> i32 {
    let config = unsafe { context(c) };
    to_code(config.sync())
}

// ========== 辅助 ==========

fn check(code: i32) -> Result<i32, LfsError> {
    if code < 0 {
        Err(LfsError::from_code(code))
    } else {
        Ok(code)
    }
}

fn c_path(path: &str) -> Result<CString, LfsError> {
    CString::new(path).map_err(|_| LfsError::INVAL)
}

fn to_info(info: &sys::lfs_info) -> LfsInfo {
    // SAFETY: littlefs 写入的名称总是以 NUL 结尾
    let name = unsafe { CStr::from_ptr(info.name.as_ptr().cast()) };
    LfsInfo {
        kind: if info.type_ == LfsType::Dir as u8 {
            LfsType::Dir
        } else {
            LfsType::Reg
        },
        size: info.size,
        name: name.to_string_lossy().into_owned(),
    }
}

fn insert<T>(slots: &mut Vec<Option<T>>, value: T) -> usize {
    match slots.iter().position(Option::is_none) {
        Some(index) => {
            slots[index] = Some(value);
            index
        }
        None => {
            slots.push(Some(value));
            slots.len() - 1
        }
    }
}

impl LittleFs {
    fn lfs(&mut self) -> *mut sys::lfs_t {
        &mut self.volume.lfs
    }

    fn file_ptr(&mut self, file: &LittleFsFile) -> Result<*mut sys::lfs_file_t, LfsError> {
        self.files
            .get_mut(file.0)
            .and_then(Option::as_mut)
            .map(|open| &mut open.file as *mut sys::lfs_file_t)
            .ok_or(LfsError::BADF)
    }

    fn dir_ptr(&mut self, dir: &LittleFsDir) -> Result<*mut sys::lfs_dir_t, LfsError> {
        self.dirs
            .get_mut(dir.0)
            .and_then(Option::as_mut)
            .map(|open| &mut **open as *mut sys::lfs_dir_t)
            .ok_or(LfsError::BADF)
    }
}

impl Engine for LittleFs {
    type File = LittleFsFile;
    type Dir = LittleFsDir;

    fn format(config: &Config) -> Result<(), LfsError> {
        let mut volume = Volume::new(config)?;
        let v = &mut *volume;
        check(unsafe { sys::lfs_format(&mut v.lfs, &v.cfg) })?;
        Ok(())
    }

    fn mount(config: &Config) -> Result<Self, LfsError> {
        let mut volume = Volume::new(config)?;
        let v = &mut *volume;
        check(unsafe { sys::lfs_mount(&mut v.lfs, &v.cfg) })?;
        Ok(Self {
            volume,
            files: Vec::new(),
            dirs: Vec::new(),
        })
    }

    fn unmount(mut self) -> Result<(), LfsError> {
        let lfs = self.lfs();
        check(unsafe { sys::lfs_unmount(lfs) })?;
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), LfsError> {
        let path = c_path(path)?;
        check(unsafe { sys::lfs_remove(self.lfs(), path.as_ptr()) })?;
        Ok(())
    }

    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), LfsError> {
        let old_path = c_path(old_path)?;
        let new_path = c_path(new_path)?;
        check(unsafe { sys::lfs_rename(self.lfs(), old_path.as_ptr(), new_path.as_ptr()) })?;
        Ok(())
    }

    fn stat(&mut self, path: &str) -> Result<LfsInfo, LfsError> {
        let path = c_path(path)?;
        let mut info: sys::lfs_info = unsafe { mem::zeroed() };
        check(unsafe { sys::lfs_stat(self.lfs(), path.as_ptr(), &mut info) })?;
        Ok(to_info(&info))
    }

    fn mkdir(&mut self, path: &str) -> Result<(), LfsError> {
        let path = c_path(path)?;
        check(unsafe { sys::lfs_mkdir(self.lfs(), path.as_ptr()) })?;
        Ok(())
    }

    fn file_open(&mut self, path: &str, flags: LfsOpenFlags) -> Result<LittleFsFile, LfsError> {
        let path = c_path(path)?;
        let flags = i32::try_from(flags.bits()).map_err(|_| LfsError::INVAL)?;

        let mut open = Box::new(OpenFile {
            file: unsafe { mem::zeroed() },
            config: unsafe { mem::zeroed() },
            buffer: vec![0; self.volume.config.cache_size],
        });
        let o = &mut *open;
        o.config.buffer = o.buffer.as_mut_ptr().cast();

        let lfs = self.lfs();
        check(unsafe {
            sys::lfs_file_opencfg(lfs, &mut o.file, path.as_ptr(), flags, &o.config)
        })?;
        Ok(LittleFsFile(insert(&mut self.files, open)))
    }

    fn file_close(&mut self, file: LittleFsFile) -> Result<(), LfsError> {
        let lfs = self.lfs();
        let mut open = self
            .files
            .get_mut(file.0)
            .and_then(Option::take)
            .ok_or(LfsError::BADF)?;
        // littlefs 无论同步是否成功都会把记录移出打开链表，之后才能释放
        check(unsafe { sys::lfs_file_close(lfs, &mut open.file) })?;
        Ok(())
    }

    fn file_read(&mut self, file: &mut LittleFsFile, buf: &mut [u8]) -> Result<usize, LfsError> {
        let lfs = self.lfs();
        let f = self.file_ptr(file)?;
        let len = buf.len().min(i32::MAX as usize) as sys::lfs_size_t;
        let n = check(unsafe { sys::lfs_file_read(lfs, f, buf.as_mut_ptr().cast(), len) })?;
        Ok(n as usize)
    }

    fn file_write(&mut self, file: &mut LittleFsFile, buf: &[u8]) -> Result<usize, LfsError> {
        let lfs = self.lfs();
        let f = self.file_ptr(file)?;
        let len = buf.len().min(i32::MAX as usize) as sys::lfs_size_t;
        let n = check(unsafe { sys::lfs_file_write(lfs, f, buf.as_ptr().cast(), len) })?;
        Ok(n as usize)
    }

    fn file_sync(&mut self, file: &mut LittleFsFile) -> Result<(), LfsError> {
        let lfs = self.lfs();
        let f = self.file_ptr(file)?;
        check(unsafe { sys::lfs_file_sync(lfs, f) })?;
        Ok(())
    }

    fn file_seek(
        &mut self,
        file: &mut LittleFsFile,
        offset: i64,
        whence: LfsWhence,
    ) -> Result<u64, LfsError> {
        let offset = i32::try_from(offset).map_err(|_| LfsError::INVAL)?;
        let lfs = self.lfs();
        let f = self.file_ptr(file)?;
        let pos = check(unsafe { sys::lfs_file_seek(lfs, f, offset, whence as i32) })?;
        Ok(pos as u64)
    }

    fn file_tell(&mut self, file: &mut LittleFsFile) -> Result<u64, LfsError> {
        let lfs = self.lfs();
        let f = self.file_ptr(file)?;
        let pos = check(unsafe { sys::lfs_file_tell(lfs, f) })?;
        Ok(pos as u64)
    }

    fn dir_open(&mut self, path: &str) -> Result<LittleFsDir, LfsError> {
        let path = c_path(path)?;
        let mut dir: Box<sys::lfs_dir_t> = Box::new(unsafe { mem::zeroed() });
        let lfs = self.lfs();
        check(unsafe { sys::lfs_dir_open(lfs, &mut *dir, path.as_ptr()) })?;
        Ok(LittleFsDir(insert(&mut self.dirs, dir)))
    }

    fn dir_close(&mut self, dir: LittleFsDir) -> Result<(), LfsError> {
        let lfs = self.lfs();
        let mut open = self
            .dirs
            .get_mut(dir.0)
            .and_then(Option::take)
            .ok_or(LfsError::BADF)?;
        check(unsafe { sys::lfs_dir_close(lfs, &mut *open) })?;
        Ok(())
    }

    fn dir_read(&mut self, dir: &mut LittleFsDir) -> Result<Option<LfsInfo>, LfsError> {
        let lfs = self.lfs();
        let d = self.dir_ptr(dir)?;
        let mut info: sys::lfs_info = unsafe { mem::zeroed() };
        let more = check(unsafe { sys::lfs_dir_read(lfs, d, &mut info) })?;
        Ok((more > 0).then(|| to_info(&info)))
    }
}
