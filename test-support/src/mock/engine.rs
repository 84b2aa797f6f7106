//! 参考引擎
//!
//! [`MockEngine`] 在内存中维护目录树，并且只通过 [`Config`] 的块级回调持久化：
//!
//! - 块 0：超级块（魔数、几何参数、数据长度）
//! - 块 1 起：序列化后的目录树
//!
//! 可见行为模仿 littlefs：错误码、打开标志语义、目录遍历先产出 `.` 与 `..`。
//! 提交发生在 sync、close（可写文件）、mkdir、remove、rename 时。

use std::collections::BTreeMap;

use lfs::{Config, Engine, LfsError, LfsInfo, LfsOpenFlags, LfsType, LfsWhence};

const MAGIC: &[u8; 8] = b"MOCKLFS\0";
const HEADER_LEN: usize = 20;
const DEFAULT_NAME_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Dir,
    File(Vec<u8>),
}

/// 打开的文件
#[derive(Debug)]
pub struct MockFile {
    path: String,
    pos: u64,
    flags: LfsOpenFlags,
}

/// 打开的目录（打开时拍下条目快照）
#[derive(Debug)]
pub struct MockDir {
    entries: Vec<LfsInfo>,
    pos: usize,
}

/// 参考引擎
pub struct MockEngine {
    config: Config,
    /// 规范化绝对路径 → 节点，根目录为 "/"
    tree: BTreeMap<String, Node>,
}

fn normalize(path: &str) -> Result<String, LfsError> {
    vfs::normalize_path(path).map_err(|_| LfsError::INVAL)
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}

fn name_of(path: &str) -> &str {
    if path == "/" {
        return "/";
    }
    path.rsplit('/').next().unwrap_or(path)
}

/// 子条目的路径前缀
fn child_prefix(dir: &str) -> String {
    if dir == "/" {
        String::from("/")
    } else {
        format!("{}/", dir)
    }
}

fn put_u32(out: &mut Vec<u8>, value: usize) -> Result<(), LfsError> {
    let value = u32::try_from(value).map_err(|_| LfsError::FBIG)?;
    out.extend_from_slice(&value.to_le_bytes());
    Ok(())
}

fn get_u32(data: &[u8], at: &mut usize) -> Result<usize, LfsError> {
    let bytes = data.get(*at..*at + 4).ok_or(LfsError::CORRUPT)?;
    *at += 4;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
}

fn round_up(len: usize, unit: usize) -> usize {
    len.div_ceil(unit) * unit
}

impl MockEngine {
    fn name_max(config: &Config) -> usize {
        if config.name_max == 0 {
            DEFAULT_NAME_MAX
        } else {
            config.name_max
        }
    }

    fn serialize(tree: &BTreeMap<String, Node>) -> Result<Vec<u8>, LfsError> {
        let mut out = Vec::new();
        for (path, node) in tree.iter().filter(|(path, _)| path.as_str() != "/") {
            let (kind, data): (u8, &[u8]) = match node {
                Node::Dir => (LfsType::Dir as u8, &[]),
                Node::File(data) => (LfsType::Reg as u8, data),
            };
            out.push(kind);
            put_u32(&mut out, path.len())?;
            out.extend_from_slice(path.as_bytes());
            put_u32(&mut out, data.len())?;
            out.extend_from_slice(data);
        }
        Ok(out)
    }

    fn deserialize(payload: &[u8]) -> Result<BTreeMap<String, Node>, LfsError> {
        let mut tree = BTreeMap::new();
        tree.insert(String::from("/"), Node::Dir);

        let mut at = 0;
        while at < payload.len() {
            let kind = payload[at];
            at += 1;
            let path_len = get_u32(payload, &mut at)?;
            let path = payload.get(at..at + path_len).ok_or(LfsError::CORRUPT)?;
            let path = String::from_utf8(path.to_vec()).map_err(|_| LfsError::CORRUPT)?;
            at += path_len;
            let data_len = get_u32(payload, &mut at)?;
            let data = payload.get(at..at + data_len).ok_or(LfsError::CORRUPT)?;
            at += data_len;

            let node = match kind {
                k if k == LfsType::Dir as u8 => Node::Dir,
                k if k == LfsType::Reg as u8 => Node::File(data.to_vec()),
                _ => return Err(LfsError::CORRUPT),
            };
            tree.insert(path, node);
        }
        Ok(tree)
    }

    /// 将整棵树写回块设备
    fn store(config: &Config, tree: &BTreeMap<String, Node>) -> Result<(), LfsError> {
        let payload = Self::serialize(tree)?;
        let capacity = (config.block_count - 1) * config.block_size;
        if payload.len() > capacity {
            return Err(LfsError::NOSPC);
        }

        // 数据块：按编程粒度补齐擦除值
        let mut padded = payload.clone();
        padded.resize(round_up(payload.len(), config.prog_size), 0xFF);
        for (index, chunk) in padded.chunks(config.block_size).enumerate() {
            let block = (index + 1) as u32;
            config.erase(block)?;
            for (step, piece) in chunk.chunks(config.prog_size).enumerate() {
                config.prog(block, (step * config.prog_size) as u32, piece)?;
            }
        }

        // 超级块最后写入
        let mut header = Vec::with_capacity(HEADER_LEN);
        header.extend_from_slice(MAGIC);
        put_u32(&mut header, config.block_size)?;
        put_u32(&mut header, config.block_count)?;
        put_u32(&mut header, payload.len())?;
        header.resize(round_up(HEADER_LEN, config.prog_size), 0xFF);
        config.erase(0)?;
        for (step, piece) in header.chunks(config.prog_size).enumerate() {
            config.prog(0, (step * config.prog_size) as u32, piece)?;
        }

        config.sync()
    }

    fn load(config: &Config) -> Result<BTreeMap<String, Node>, LfsError> {
        let mut header = vec![0u8; round_up(HEADER_LEN, config.read_size)];
        config.read(0, 0, &mut header)?;
        if &header[..MAGIC.len()] != MAGIC {
            log::warn!("mock engine: no superblock found");
            return Err(LfsError::CORRUPT);
        }

        let mut at = MAGIC.len();
        let block_size = get_u32(&header, &mut at)?;
        let block_count = get_u32(&header, &mut at)?;
        let payload_len = get_u32(&header, &mut at)?;
        if block_size != config.block_size || block_count != config.block_count {
            return Err(LfsError::CORRUPT);
        }
        if payload_len > (block_count - 1) * block_size {
            return Err(LfsError::CORRUPT);
        }

        let mut payload = Vec::with_capacity(payload_len);
        let mut block = vec![0u8; config.block_size];
        let mut index = 1;
        while payload.len() < payload_len {
            config.read(index, 0, &mut block)?;
            let take = (payload_len - payload.len()).min(config.block_size);
            payload.extend_from_slice(&block[..take]);
            index += 1;
        }

        Self::deserialize(&payload)
    }

    fn commit(&self) -> Result<(), LfsError> {
        Self::store(&self.config, &self.tree)
    }

    /// 新条目的父目录必须存在且是目录，名称不得超过上限
    fn check_new_entry(&self, path: &str) -> Result<(), LfsError> {
        match self.tree.get(parent_of(path)) {
            Some(Node::Dir) => {}
            Some(Node::File(_)) => return Err(LfsError::NOTDIR),
            None => return Err(LfsError::NOENT),
        }
        if name_of(path).len() > Self::name_max(&self.config) {
            return Err(LfsError::NAMETOOLONG);
        }
        Ok(())
    }

    fn has_children(&self, dir: &str) -> bool {
        let prefix = child_prefix(dir);
        self.tree
            .keys()
            .any(|key| key.len() > prefix.len() && key.starts_with(&prefix))
    }

    fn info(path: &str, node: &Node) -> LfsInfo {
        match node {
            Node::Dir => LfsInfo {
                kind: LfsType::Dir,
                size: 0,
                name: name_of(path).to_string(),
            },
            Node::File(data) => LfsInfo {
                kind: LfsType::Reg,
                size: data.len() as u32,
                name: name_of(path).to_string(),
            },
        }
    }

    fn file_data(&mut self, file: &MockFile) -> Result<&mut Vec<u8>, LfsError> {
        match self.tree.get_mut(&file.path) {
            Some(Node::File(data)) => Ok(data),
            _ => Err(LfsError::NOENT),
        }
    }
}

impl Engine for MockEngine {
    type File = MockFile;
    type Dir = MockDir;

    fn format(config: &Config) -> Result<(), LfsError> {
        config.validate()?;
        let mut tree = BTreeMap::new();
        tree.insert(String::from("/"), Node::Dir);
        Self::store(config, &tree)
    }

    fn mount(config: &Config) -> Result<Self, LfsError> {
        config.validate()?;
        let tree = Self::load(config)?;
        Ok(Self {
            config: config.clone(),
            tree,
        })
    }

    fn unmount(self) -> Result<(), LfsError> {
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), LfsError> {
        let path = normalize(path)?;
        if path == "/" {
            return Err(LfsError::INVAL);
        }
        match self.tree.get(&path) {
            None => return Err(LfsError::NOENT),
            Some(Node::Dir) if self.has_children(&path) => return Err(LfsError::NOTEMPTY),
            Some(_) => {}
        }
        self.tree.remove(&path);
        self.commit()
    }

    fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), LfsError> {
        let old = normalize(old_path)?;
        let new = normalize(new_path)?;
        if old == "/" || new == "/" {
            return Err(LfsError::INVAL);
        }
        if old == new {
            return if self.tree.contains_key(&old) {
                Ok(())
            } else {
                Err(LfsError::NOENT)
            };
        }
        if new.starts_with(&child_prefix(&old)) {
            return Err(LfsError::INVAL);
        }

        let is_dir = match self.tree.get(&old) {
            None => return Err(LfsError::NOENT),
            Some(node) => *node == Node::Dir,
        };
        self.check_new_entry(&new)?;
        match self.tree.get(&new) {
            None => {}
            Some(Node::Dir) if !is_dir => return Err(LfsError::ISDIR),
            Some(Node::File(_)) if is_dir => return Err(LfsError::NOTDIR),
            Some(Node::Dir) if self.has_children(&new) => return Err(LfsError::NOTEMPTY),
            Some(_) => {
                self.tree.remove(&new);
            }
        }

        let old_prefix = child_prefix(&old);
        let moved: Vec<String> = self
            .tree
            .keys()
            .filter(|key| **key == old || key.starts_with(&old_prefix))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = self.tree.remove(&key) {
                let renamed = format!("{}{}", new, &key[old.len()..]);
                self.tree.insert(renamed, node);
            }
        }
        self.commit()
    }

    fn stat(&mut self, path: &str) -> Result<LfsInfo, LfsError> {
        let path = normalize(path)?;
        let node = self.tree.get(&path).ok_or(LfsError::NOENT)?;
        Ok(Self::info(&path, node))
    }

    fn mkdir(&mut self, path: &str) -> Result<(), LfsError> {
        let path = normalize(path)?;
        if self.tree.contains_key(&path) {
            return Err(LfsError::EXIST);
        }
        self.check_new_entry(&path)?;
        self.tree.insert(path, Node::Dir);
        self.commit()
    }

    fn file_open(&mut self, path: &str, flags: LfsOpenFlags) -> Result<MockFile, LfsError> {
        if !flags.can_read() && !flags.can_write() {
            return Err(LfsError::INVAL);
        }
        let path = normalize(path)?;

        match self.tree.get_mut(&path) {
            Some(Node::Dir) => return Err(LfsError::ISDIR),
            Some(Node::File(data)) => {
                if flags.contains(LfsOpenFlags::CREAT | LfsOpenFlags::EXCL) {
                    return Err(LfsError::EXIST);
                }
                if flags.contains(LfsOpenFlags::TRUNC) {
                    if !flags.can_write() {
                        return Err(LfsError::INVAL);
                    }
                    data.clear();
                }
            }
            None => {
                if !flags.contains(LfsOpenFlags::CREAT) {
                    return Err(LfsError::NOENT);
                }
                self.check_new_entry(&path)?;
                self.tree.insert(path.clone(), Node::File(Vec::new()));
            }
        }

        Ok(MockFile {
            path,
            pos: 0,
            flags,
        })
    }

    fn file_close(&mut self, file: MockFile) -> Result<(), LfsError> {
        if file.flags.can_write() {
            self.commit()?;
        }
        Ok(())
    }

    fn file_read(&mut self, file: &mut MockFile, buf: &mut [u8]) -> Result<usize, LfsError> {
        if !file.flags.can_read() {
            return Err(LfsError::BADF);
        }
        let pos = file.pos as usize;
        let data = self.file_data(file)?;
        if pos >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - pos);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        file.pos += n as u64;
        Ok(n)
    }

    fn file_write(&mut self, file: &mut MockFile, buf: &[u8]) -> Result<usize, LfsError> {
        if !file.flags.can_write() {
            return Err(LfsError::BADF);
        }
        let append = file.flags.contains(LfsOpenFlags::APPEND);
        let mut pos = file.pos as usize;
        let data = self.file_data(file)?;
        if append {
            pos = data.len();
        }
        let end = pos.checked_add(buf.len()).ok_or(LfsError::FBIG)?;
        if end > i32::MAX as usize {
            return Err(LfsError::FBIG);
        }
        if data.len() < end {
            data.resize(end, 0);
        }
        data[pos..end].copy_from_slice(buf);
        file.pos = end as u64;
        Ok(buf.len())
    }

    fn file_sync(&mut self, file: &mut MockFile) -> Result<(), LfsError> {
        self.file_data(file)?;
        self.commit()
    }

    fn file_seek(
        &mut self,
        file: &mut MockFile,
        offset: i64,
        whence: LfsWhence,
    ) -> Result<u64, LfsError> {
        let base = match whence {
            LfsWhence::Set => 0,
            LfsWhence::Cur => file.pos as i64,
            LfsWhence::End => self.file_data(file)?.len() as i64,
        };
        let pos = base.checked_add(offset).ok_or(LfsError::INVAL)?;
        if pos < 0 {
            return Err(LfsError::INVAL);
        }
        file.pos = pos as u64;
        Ok(file.pos)
    }

    fn file_tell(&mut self, file: &mut MockFile) -> Result<u64, LfsError> {
        Ok(file.pos)
    }

    fn dir_open(&mut self, path: &str) -> Result<MockDir, LfsError> {
        let path = normalize(path)?;
        match self.tree.get(&path) {
            None => return Err(LfsError::NOENT),
            Some(Node::File(_)) => return Err(LfsError::NOTDIR),
            Some(Node::Dir) => {}
        }

        let dot = |name: &str| LfsInfo {
            kind: LfsType::Dir,
            size: 0,
            name: name.to_string(),
        };
        let mut entries = vec![dot("."), dot("..")];

        let prefix = child_prefix(&path);
        entries.extend(
            self.tree
                .iter()
                .filter(|(key, _)| {
                    key.len() > prefix.len()
                        && key.starts_with(&prefix)
                        && !key[prefix.len()..].contains('/')
                })
                .map(|(key, node)| Self::info(key, node)),
        );

        Ok(MockDir { entries, pos: 0 })
    }

    fn dir_close(&mut self, _dir: MockDir) -> Result<(), LfsError> {
        Ok(())
    }

    fn dir_read(&mut self, dir: &mut MockDir) -> Result<Option<LfsInfo>, LfsError> {
        let entry = dir.entries.get(dir.pos).cloned();
        if entry.is_some() {
            dir.pos += 1;
        }
        Ok(entry)
    }
}
