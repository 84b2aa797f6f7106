//! 宿主文件模拟的块设备
//!
//! 整个卷保存在一个扁平的宿主文件中，块 `n` 的偏移 `off` 对应文件偏移
//! `block_size * n + off`。读写前先定位文件位置，因此对同一文件句柄的访问必须互斥，
//! 由内部锁保证。

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{BlockDriver, BlockError, ERASED_BYTE, check_range};
use crate::driver::Driver;

/// 镜像的总字节数；几何参数溢出时返回 `InvalidInput`
fn image_len(block_size: usize, block_count: usize) -> io::Result<u64> {
    block_size
        .checked_mul(block_count)
        .and_then(|len| u64::try_from(len).ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("image geometry {} x {} overflows", block_count, block_size),
            )
        })
}

/// 宿主文件块设备
pub struct ImageFile {
    /// 宿主文件（读写都会移动文件位置）
    file: Mutex<File>,

    /// 宿主文件路径
    path: PathBuf,

    /// 块大小
    block_size: usize,

    /// 总块数
    block_count: usize,

    /// 是否以可写方式打开
    writable: bool,
}

impl ImageFile {
    /// 创建新镜像：截断已有文件，并将 `block_size * block_count` 字节全部填充为擦除值
    pub fn create(
        path: impl AsRef<Path>,
        block_size: usize,
        block_count: usize,
    ) -> io::Result<Arc<Self>> {
        let path = path.as_ref();
        image_len(block_size, block_count)?;
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let erased = vec![ERASED_BYTE; block_size];
        for _ in 0..block_count {
            file.write_all(&erased)?;
        }
        file.flush()?;

        log::debug!(
            "image: created {} ({} blocks x {} bytes)",
            path.display(),
            block_count,
            block_size
        );

        Ok(Arc::new(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
            block_size,
            block_count,
            writable: true,
        }))
    }

    /// 打开已有镜像
    ///
    /// `writable` 为 false 时以只读方式打开，编程与擦除会以 I/O 错误失败。
    pub fn open(
        path: impl AsRef<Path>,
        block_size: usize,
        block_count: usize,
        writable: bool,
    ) -> io::Result<Arc<Self>> {
        let path = path.as_ref();
        let file = OpenOptions::new().read(true).write(writable).open(path)?;

        let expected = image_len(block_size, block_count)?;
        let actual = file.metadata()?.len();
        if actual < expected {
            log::warn!(
                "image: {} holds {} bytes, geometry addresses {}",
                path.display(),
                actual,
                expected
            );
        }

        Ok(Arc::new(Self {
            file: Mutex::new(file),
            path: path.to_path_buf(),
            block_size,
            block_count,
            writable,
        }))
    }

    /// 宿主文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 是否可写
    pub fn writable(&self) -> bool {
        self.writable
    }

    fn locate(&self, file: &mut File, block: u32, offset: u32, len: usize) -> Result<(), BlockError> {
        let pos = check_range(self.block_size, self.block_count, block, offset, len)?;
        file.seek(SeekFrom::Start(pos)).map_err(|e| {
            log::error!("image: seek to {} failed: {}", pos, e);
            BlockError::Io
        })?;
        Ok(())
    }
}

impl Driver for ImageFile {
    fn get_id(&self) -> String {
        format!("image:{}", self.path.display())
    }

    fn as_block(&self) -> Option<&dyn BlockDriver> {
        Some(self)
    }
}

impl BlockDriver for ImageFile {
    fn read_block(&self, block: u32, offset: u32, buf: &mut [u8]) -> Result<(), BlockError> {
        let mut file = self.file.lock();
        self.locate(&mut file, block, offset, buf.len())?;
        file.read_exact(buf).map_err(|e| {
            log::error!(
                "image: read block {} off {} size {} failed: {}",
                block,
                offset,
                buf.len(),
                e
            );
            BlockError::Io
        })
    }

    fn prog_block(&self, block: u32, offset: u32, buf: &[u8]) -> Result<(), BlockError> {
        let mut file = self.file.lock();
        self.locate(&mut file, block, offset, buf.len())?;
        file.write_all(buf).map_err(|e| {
            log::error!(
                "image: prog block {} off {} size {} failed: {}",
                block,
                offset,
                buf.len(),
                e
            );
            BlockError::Io
        })
    }

    fn erase_block(&self, block: u32) -> Result<(), BlockError> {
        let mut file = self.file.lock();
        self.locate(&mut file, block, 0, self.block_size)?;
        let erased = vec![ERASED_BYTE; self.block_size];
        file.write_all(&erased).map_err(|e| {
            log::error!("image: erase block {} failed: {}", block, e);
            BlockError::Io
        })
    }

    fn sync(&self) -> Result<(), BlockError> {
        if !self.writable {
            return Ok(());
        }
        let mut file = self.file.lock();
        file.flush().and_then(|_| file.sync_data()).map_err(|e| {
            log::error!("image: sync failed: {}", e);
            BlockError::Io
        })
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn block_count(&self) -> usize {
        self.block_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_fills_erased() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("disk.img");
        let image = ImageFile::create(&path, 512, 4).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 512 * 4);
        assert!(bytes.iter().all(|&b| b == ERASED_BYTE));
        assert_eq!(image.block_count(), 4);
        assert!(image.writable());
    }

    #[test]
    fn test_prog_read_roundtrip_at_byte_offset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("disk.img");
        let image = ImageFile::create(&path, 512, 4).unwrap();

        image.prog_block(2, 64, b"hello block").unwrap();
        image.sync().unwrap();

        let mut buf = [0u8; 11];
        image.read_block(2, 64, &mut buf).unwrap();
        assert_eq!(&buf, b"hello block");

        // 字节精确寻址：block_size * block + offset
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[2 * 512 + 64..2 * 512 + 75], b"hello block");
        assert_eq!(bytes[2 * 512 + 63], ERASED_BYTE);
        assert_eq!(bytes[2 * 512 + 75], ERASED_BYTE);
    }

    #[test]
    fn test_erase_restores_block() {
        let dir = TempDir::new().unwrap();
        let image = ImageFile::create(dir.path().join("disk.img"), 256, 2).unwrap();

        image.prog_block(1, 0, &[0u8; 256]).unwrap();
        image.erase_block(1).unwrap();

        let mut buf = [0u8; 256];
        image.read_block(1, 0, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == ERASED_BYTE));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let dir = TempDir::new().unwrap();
        let image = ImageFile::create(dir.path().join("disk.img"), 256, 2).unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(image.read_block(2, 0, &mut buf), Err(BlockError::OutOfRange));
        assert_eq!(image.prog_block(0, 250, &buf), Err(BlockError::OutOfRange));
        assert_eq!(image.erase_block(5), Err(BlockError::OutOfRange));
    }

    #[test]
    fn test_short_read_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.img");
        std::fs::write(&path, vec![ERASED_BYTE; 300]).unwrap();

        // 几何上有 2 块，但文件只有 300 字节
        let image = ImageFile::open(&path, 256, 2, false).unwrap();
        let mut buf = [0u8; 256];
        image.read_block(0, 0, &mut buf).unwrap();
        assert_eq!(image.read_block(1, 0, &mut buf), Err(BlockError::Io));
    }

    #[test]
    fn test_read_only_image_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ro.img");
        drop(ImageFile::create(&path, 256, 2).unwrap());

        let image = ImageFile::open(&path, 256, 2, false).unwrap();
        assert!(!image.writable());
        assert_eq!(image.prog_block(0, 0, b"x"), Err(BlockError::Io));
        assert_eq!(image.erase_block(0), Err(BlockError::Io));
        assert!(image.sync().is_ok());
    }

    #[test]
    fn test_overflowing_geometry_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("huge.img");

        let err = ImageFile::create(&path, usize::MAX / 2, 4).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        // 校验先于创建文件
        assert!(!path.exists());

        std::fs::write(&path, [ERASED_BYTE; 16]).unwrap();
        let err = ImageFile::open(&path, usize::MAX, 2, false).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_open_persists_previous_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("disk.img");
        {
            let image = ImageFile::create(&path, 256, 2).unwrap();
            image.prog_block(1, 8, b"persist").unwrap();
            image.sync().unwrap();
        }

        let image = ImageFile::open(&path, 256, 2, true).unwrap();
        let mut buf = [0u8; 7];
        image.read_block(1, 8, &mut buf).unwrap();
        assert_eq!(&buf, b"persist");
        assert!(image.get_id().starts_with("image:"));
    }
}
