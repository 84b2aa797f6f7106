#![allow(dead_code)]

use std::sync::Arc;

use device::{BlockDriver, RamDisk};
use fs::{LfsFileSystem, VolumeConfig};
use test_support::MockEngine;
use vfs::{DirEntry, FileSystem, ReadDir};

pub type MockFs = LfsFileSystem<MockEngine>;

/// 小卷几何：64 块 × 512 字节
pub fn small_volume() -> VolumeConfig {
    VolumeConfig {
        io_size: 64,
        block_size: 512,
        block_count: 64,
        ..VolumeConfig::default()
    }
}

pub fn ram_disk() -> Arc<RamDisk> {
    let cfg = small_volume();
    RamDisk::new(cfg.block_size, cfg.block_count, 0)
}

/// 在给定设备上创建后端并格式化（不挂载）
pub fn formatted(device: Arc<dyn BlockDriver>) -> MockFs {
    let fs = MockFs::with_device(device, &small_volume()).unwrap();
    fs.format().unwrap();
    fs
}

/// 在内存盘上创建、格式化并挂载
pub fn mounted() -> MockFs {
    let fs = formatted(ram_disk());
    fs.mount().unwrap();
    fs
}

/// 列出目录，跳过 `.` 与 `..`
pub fn list(fs: &dyn FileSystem, path: &str) -> Vec<DirEntry> {
    let mut dir = fs.opendir(path).unwrap();
    let entries: Vec<DirEntry> = ReadDir::new(fs, &mut dir)
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.name != "." && entry.name != "..")
        .collect();
    fs.closedir(dir).unwrap();
    entries
}
