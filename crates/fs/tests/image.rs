mod common;

use common::{MockFs, list};
use device::ERASED_BYTE;
use fs::{ImageMode, VolumeConfig};
use tempfile::TempDir;
use vfs::{DirEntryType, FileSystem, FsError, OpenFlags};

fn geometry() -> VolumeConfig {
    VolumeConfig {
        block_size: 4096,
        block_count: 64,
        ..VolumeConfig::default()
    }
}

#[test]
fn test_image_scenario() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("volume.img");

    let fs = MockFs::from_image(&path, ImageMode::Create, &geometry()).unwrap();
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 64 * 4096);

    fs.mount().unwrap();
    fs.mkdir("/d").unwrap();

    let mut file = fs
        .open("/d/f", OpenFlags::WRITE | OpenFlags::CREATE)
        .unwrap();
    assert_eq!(fs.write(&mut file, b"0123456789").unwrap(), 10);
    fs.fsync(&mut file).unwrap();
    fs.close(file).unwrap();

    let entries = list(fs.as_ref(), "/d");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "f");
    assert_eq!(entries[0].kind, DirEntryType::File);

    assert_eq!(fs.stat("/d/f").unwrap().size, 10);
    fs.unmount().unwrap();
}

#[test]
fn test_create_fills_with_erased_bytes() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fresh.img");
    let cfg = VolumeConfig {
        block_size: 512,
        block_count: 8,
        io_size: 64,
        ..VolumeConfig::default()
    };
    let _fs = MockFs::from_image(&path, ImageMode::Create, &cfg).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 512 * 8);
    // 格式化只写入了前几个块，末块保持擦除状态
    assert!(bytes[7 * 512..].iter().all(|&b| b == ERASED_BYTE));
}

#[test]
fn test_bad_geometry_leaves_existing_image_intact() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("keep.img");
    {
        let fs = MockFs::from_image(&path, ImageMode::Create, &geometry()).unwrap();
        fs.mount().unwrap();
        fs.mkdir("/keep").unwrap();
        fs.unmount().unwrap();
    }
    let before = std::fs::read(&path).unwrap();

    let bad = VolumeConfig {
        io_size: 300,
        ..geometry()
    };
    let result = MockFs::from_image(&path, ImageMode::Create, &bad);
    assert!(matches!(result, Err(FsError::InvalidArgument)));
    assert_eq!(std::fs::read(&path).unwrap(), before);

    let fs = MockFs::from_image(&path, ImageMode::Open, &geometry()).unwrap();
    fs.mount().unwrap();
    assert!(fs.stat("/keep").unwrap().is_dir());
}

#[test]
fn test_bad_geometry_does_not_create_image() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("never.img");
    let bad = VolumeConfig {
        io_size: 4,
        ..geometry()
    };
    let result = MockFs::from_image(&path, ImageMode::Create, &bad);
    assert!(matches!(result, Err(FsError::InvalidArgument)));
    assert!(!path.exists());
}

#[test]
fn test_default_block_count() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("default.img");
    let cfg = VolumeConfig {
        block_size: 512,
        io_size: 64,
        block_count: 0,
        ..VolumeConfig::default()
    };
    let fs = MockFs::from_image(&path, ImageMode::Create, &cfg).unwrap();
    assert_eq!(fs.config().block_count, fs::DEFAULT_BLOCK_COUNT);
    assert_eq!(
        std::fs::metadata(&path).unwrap().len(),
        512 * fs::DEFAULT_BLOCK_COUNT as u64
    );
}

#[test]
fn test_reopen_image_keeps_data() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("persist.img");

    {
        let fs = MockFs::from_image(&path, ImageMode::Create, &geometry()).unwrap();
        fs.mount().unwrap();
        let mut file = fs
            .open("/note", OpenFlags::WRITE | OpenFlags::CREATE)
            .unwrap();
        fs.write(&mut file, b"on disk").unwrap();
        fs.close(file).unwrap();
        fs.unmount().unwrap();
    }

    let fs = MockFs::from_image(&path, ImageMode::Open, &geometry()).unwrap();
    fs.mount().unwrap();
    let mut file = fs.open("/note", OpenFlags::READ).unwrap();
    let mut buf = [0u8; 16];
    let n = fs.read(&mut file, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"on disk");
    fs.close(file).unwrap();

    // 可写方式打开的镜像允许继续修改
    fs.mkdir("/more").unwrap();
}

#[test]
fn test_read_only_image() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ro.img");
    {
        let fs = MockFs::from_image(&path, ImageMode::Create, &geometry()).unwrap();
        fs.mount().unwrap();
        fs.mkdir("/kept").unwrap();
        fs.unmount().unwrap();
    }

    let fs = MockFs::from_image(&path, ImageMode::ReadOnly, &geometry()).unwrap();
    fs.mount().unwrap();
    assert!(fs.stat("/kept").unwrap().is_dir());

    // 写入在块层失败，表现为引擎 I/O 错误
    assert_eq!(fs.mkdir("/new"), Err(FsError::Engine(-5)));
}

#[test]
fn test_open_missing_image() {
    let tmp = TempDir::new().unwrap();
    let result = MockFs::from_image(tmp.path().join("absent.img"), ImageMode::Open, &geometry());
    assert!(matches!(result, Err(FsError::IoError)));
}
