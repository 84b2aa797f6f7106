//! littlefs 后端
//!
//! [`LfsFileSystem`] 将一个 [`lfs::Engine`] 实现接入 VFS 能力表：
//!
//! - 卷生命周期：format / mount / unmount，每个实例至多一个已挂载的引擎
//! - 句柄翻译：引擎原生的文件/目录记录装入不透明句柄
//! - 元数据翻译：引擎条目信息转换为 [`Stat`] / [`DirEntry`]
//!
//! 每个实例持有一把卷锁，所有到达引擎的调用都在锁内串行执行。

mod config;
mod error;
mod handle;
mod meta;

pub use config::{BLOCK_SIZE, DEFAULT_BLOCK_COUNT, IO_SIZE, ImageMode, VolumeConfig};

use std::path::Path;
use std::sync::Arc;

use device::{BlockDriver, Driver, ImageFile};
use lfs::{Engine, LfsError};
use parking_lot::Mutex;
use vfs::{
    BackendId, DirEntry, DirHandle, FileHandle, FileSystem, FsError, OpenFlags, SeekWhence, Stat,
};

use error::{config_error, engine_error};
use handle::{LfsDir, LfsFile, to_lfs_flags, to_lfs_whence};

/// 已挂载的引擎实例
struct Mounted<E> {
    engine: E,
    /// 本次挂载的代数，句柄记录与之比对
    generation: u64,
}

/// 卷状态（受卷锁保护）
struct VolumeState<E> {
    mounted: Option<Mounted<E>>,
    /// 最近一次挂载的代数，只增不减
    generation: u64,
}

/// littlefs 文件系统
pub struct LfsFileSystem<E: Engine> {
    /// 实例标识，用于拒绝其他实例的句柄
    id: BackendId,

    /// 引擎配置（构造后不可变）
    config: lfs::Config,

    /// readdir 名称上限
    max_entry_name: usize,

    /// 卷锁
    volume: Mutex<VolumeState<E>>,
}

impl<E: Engine> LfsFileSystem<E> {
    /// 用现成的引擎配置创建后端（不挂载）
    ///
    /// 几何参数不合法时返回 [`FsError::InvalidArgument`]。
    pub fn new(config: lfs::Config, max_entry_name: usize) -> Result<Self, FsError> {
        config.validate().map_err(config_error)?;
        if max_entry_name == 0 {
            return Err(FsError::InvalidArgument);
        }

        Ok(Self {
            id: BackendId::next(),
            config,
            max_entry_name,
            volume: Mutex::new(VolumeState {
                mounted: None,
                generation: 0,
            }),
        })
    }

    /// 在任意块设备上创建后端（不格式化、不挂载）
    pub fn with_device(device: Arc<dyn BlockDriver>, volume: &VolumeConfig) -> Result<Self, FsError> {
        let cfg = volume.resolved();
        Self::new(cfg.to_engine_config(device), cfg.max_entry_name)
    }

    /// 在宿主镜像文件上创建后端
    ///
    /// [`ImageMode::Create`] 会创建（或截断）镜像、填充擦除值并格式化；
    /// 其余模式打开已有镜像。返回的后端均未挂载。
    pub fn from_image(
        path: impl AsRef<Path>,
        mode: ImageMode,
        volume: &VolumeConfig,
    ) -> Result<Arc<Self>, FsError> {
        let cfg = volume.resolved();
        let path = path.as_ref();

        // 参数错误不得触碰已有镜像
        cfg.geometry().validate().map_err(config_error)?;

        let image = match mode {
            ImageMode::Create => ImageFile::create(path, cfg.block_size, cfg.block_count),
            ImageMode::Open => ImageFile::open(path, cfg.block_size, cfg.block_count, true),
            ImageMode::ReadOnly => ImageFile::open(path, cfg.block_size, cfg.block_count, false),
        }
        .map_err(|e| {
            log::warn!("lfs: cannot open image {}: {}", path.display(), e);
            FsError::from(e)
        })?;
        let device: Arc<dyn BlockDriver> = image;

        let fs = Self::with_device(device, &cfg)?;
        if mode == ImageMode::Create {
            fs.format()?;
        }

        log::debug!("lfs: image {} ready ({:?})", path.display(), mode);
        Ok(Arc::new(fs))
    }

    /// 实例标识
    pub fn id(&self) -> BackendId {
        self.id
    }

    /// 引擎配置
    pub fn config(&self) -> &lfs::Config {
        &self.config
    }

    /// 是否已挂载
    pub fn is_mounted(&self) -> bool {
        self.volume.lock().mounted.is_some()
    }

    /// 在卷锁内对已挂载的引擎执行一次调用
    fn with_engine<R>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut E) -> Result<R, LfsError>,
    ) -> Result<R, FsError> {
        let mut volume = self.volume.lock();
        let mounted = volume.mounted.as_mut().ok_or(FsError::NotMounted)?;
        f(&mut mounted.engine).map_err(|e| engine_error(op, e))
    }

    /// 在卷锁内对文件记录执行一次调用
    ///
    /// 句柄来自其他实例、或产生于更早的挂载时返回 [`FsError::BadFileDescriptor`]。
    fn with_file<R>(
        &self,
        file: &mut FileHandle,
        op: &'static str,
        f: impl FnOnce(&mut E, &mut E::File) -> Result<R, LfsError>,
    ) -> Result<R, FsError> {
        let record = file.record_mut::<LfsFile<E::File>>(self.id)?;
        let mut volume = self.volume.lock();
        let mounted = current(&mut volume, record.generation)?;
        f(&mut mounted.engine, &mut record.file).map_err(|e| engine_error(op, e))
    }

    /// 在卷锁内对目录记录执行一次调用
    fn with_dir<R>(
        &self,
        dir: &mut DirHandle,
        op: &'static str,
        f: impl FnOnce(&mut E, &mut E::Dir) -> Result<R, LfsError>,
    ) -> Result<R, FsError> {
        let record = dir.record_mut::<LfsDir<E::Dir>>(self.id)?;
        let mut volume = self.volume.lock();
        let mounted = current(&mut volume, record.generation)?;
        f(&mut mounted.engine, &mut record.dir).map_err(|e| engine_error(op, e))
    }
}

/// 取出与句柄代数一致的挂载实例
fn current<E>(volume: &mut VolumeState<E>, generation: u64) -> Result<&mut Mounted<E>, FsError> {
    match volume.mounted.as_mut() {
        Some(mounted) if mounted.generation == generation => Ok(mounted),
        _ => Err(FsError::BadFileDescriptor),
    }
}

fn check_path(path: &str) -> Result<(), FsError> {
    if path.is_empty() {
        return Err(FsError::InvalidArgument);
    }
    Ok(())
}

impl<E: Engine> FileSystem for LfsFileSystem<E> {
    fn fs_type(&self) -> &'static str {
        "lfs"
    }

    fn format(&self) -> Result<(), FsError> {
        let volume = self.volume.lock();
        if volume.mounted.is_some() {
            log::warn!("lfs: format refused, volume is mounted");
            return Err(FsError::AlreadyMounted);
        }

        E::format(&self.config).map_err(|e| engine_error("format", e))?;
        log::debug!("lfs: formatted {}", self.config.device.get_id());
        Ok(())
    }

    fn mount(&self) -> Result<(), FsError> {
        let mut volume = self.volume.lock();
        if volume.mounted.is_some() {
            log::warn!("lfs: mount refused, volume is already mounted");
            return Err(FsError::AlreadyMounted);
        }

        let engine = E::mount(&self.config).map_err(|e| engine_error("mount", e))?;
        volume.generation += 1;
        let generation = volume.generation;
        volume.mounted = Some(Mounted { engine, generation });

        log::debug!(
            "lfs: mounted {} (generation {})",
            self.config.device.get_id(),
            generation
        );
        Ok(())
    }

    fn unmount(&self) -> Result<(), FsError> {
        let mut volume = self.volume.lock();
        let Some(mounted) = volume.mounted.take() else {
            log::warn!("lfs: unmount refused, nothing is mounted");
            return Err(FsError::NotMounted);
        };

        log::debug!("lfs: unmounting {}", self.config.device.get_id());
        mounted
            .engine
            .unmount()
            .map_err(|e| engine_error("unmount", e))
    }

    fn remove(&self, path: &str) -> Result<(), FsError> {
        check_path(path)?;
        self.with_engine("remove", |engine| engine.remove(path))
    }

    fn rename(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        check_path(old_path)?;
        check_path(new_path)?;
        self.with_engine("rename", |engine| engine.rename(old_path, new_path))
    }

    fn stat(&self, path: &str) -> Result<Stat, FsError> {
        check_path(path)?;
        let info = self.with_engine("stat", |engine| engine.stat(path))?;
        Ok(meta::to_stat(&info))
    }

    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        check_path(path)?;
        self.with_engine("mkdir", |engine| match engine.mkdir(path) {
            Err(e) if e == LfsError::EXIST => Ok(()),
            result => result,
        })
    }

    fn open(&self, path: &str, flags: OpenFlags) -> Result<FileHandle, FsError> {
        check_path(path)?;
        let lfs_flags = to_lfs_flags(flags)?;

        let mut volume = self.volume.lock();
        let mounted = volume.mounted.as_mut().ok_or(FsError::NotMounted)?;
        let file = mounted
            .engine
            .file_open(path, lfs_flags)
            .map_err(|e| engine_error("open", e))?;

        Ok(FileHandle::new(
            self.id,
            LfsFile {
                generation: mounted.generation,
                file,
            },
        ))
    }

    fn close(&self, file: FileHandle) -> Result<(), FsError> {
        let record = file.into_record::<LfsFile<E::File>>(self.id)?;
        let mut volume = self.volume.lock();
        let mounted = current(&mut volume, record.generation)?;
        mounted
            .engine
            .file_close(record.file)
            .map_err(|e| engine_error("close", e))
    }

    fn read(&self, file: &mut FileHandle, buf: &mut [u8]) -> Result<usize, FsError> {
        self.with_file(file, "read", |engine, f| engine.file_read(f, buf))
    }

    fn write(&self, file: &mut FileHandle, buf: &[u8]) -> Result<usize, FsError> {
        self.with_file(file, "write", |engine, f| engine.file_write(f, buf))
    }

    fn fsync(&self, file: &mut FileHandle) -> Result<(), FsError> {
        self.with_file(file, "fsync", |engine, f| engine.file_sync(f))
    }

    fn seek(
        &self,
        file: &mut FileHandle,
        offset: isize,
        whence: SeekWhence,
    ) -> Result<usize, FsError> {
        let whence = to_lfs_whence(whence);
        let pos = self.with_file(file, "seek", |engine, f| {
            engine.file_seek(f, offset as i64, whence)
        })?;
        usize::try_from(pos).map_err(|_| FsError::InvalidArgument)
    }

    fn tell(&self, file: &mut FileHandle) -> Result<usize, FsError> {
        let pos = self.with_file(file, "tell", |engine, f| engine.file_tell(f))?;
        usize::try_from(pos).map_err(|_| FsError::InvalidArgument)
    }

    fn opendir(&self, path: &str) -> Result<DirHandle, FsError> {
        check_path(path)?;

        let mut volume = self.volume.lock();
        let mounted = volume.mounted.as_mut().ok_or(FsError::NotMounted)?;
        let dir = mounted
            .engine
            .dir_open(path)
            .map_err(|e| engine_error("opendir", e))?;

        Ok(DirHandle::new(
            self.id,
            LfsDir {
                generation: mounted.generation,
                dir,
            },
        ))
    }

    fn closedir(&self, dir: DirHandle) -> Result<(), FsError> {
        let record = dir.into_record::<LfsDir<E::Dir>>(self.id)?;
        let mut volume = self.volume.lock();
        let mounted = current(&mut volume, record.generation)?;
        mounted
            .engine
            .dir_close(record.dir)
            .map_err(|e| engine_error("closedir", e))
    }

    fn readdir(&self, dir: &mut DirHandle) -> Result<DirEntry, FsError> {
        let info = self.with_dir(dir, "readdir", |engine, d| engine.dir_read(d))?;
        meta::to_dir_entry(info, self.max_entry_name)
    }
}

impl<E: Engine> Drop for LfsFileSystem<E> {
    fn drop(&mut self) {
        if let Some(mounted) = self.volume.get_mut().mounted.take() {
            log::debug!("lfs: unmounting {} on drop", self.config.device.get_id());
            if let Err(e) = mounted.engine.unmount() {
                log::warn!("lfs: unmount on drop failed: {}", e.code());
            }
        }
    }
}
