//! 文件打开标志与定位方式
//!
//! [`OpenFlags`] 是一组可组合的具名能力标志，在边界处校验一次，
//! 再由各后端翻译为自己的原生标志。

use uapi::fcntl::*;

use crate::FsError;

bitflags::bitflags! {
    /// 文件打开标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        /// 可读
        const READ      = 1 << 0;
        /// 可写
        const WRITE     = 1 << 1;
        /// 不存在时创建
        const CREATE    = 1 << 2;
        /// 打开时截断为 0
        const TRUNCATE  = 1 << 3;
        /// 每次写入都追加到末尾
        const APPEND    = 1 << 4;
        /// 与 CREATE 同用：文件已存在则失败
        const EXCLUSIVE = 1 << 5;
    }
}

impl OpenFlags {
    /// 读写
    pub const READ_WRITE: OpenFlags = OpenFlags::READ.union(OpenFlags::WRITE);

    /// 从 POSIX `O_*` 位掩码转换
    ///
    /// 访问模式是低两位组成的字段而非独立的位，`O_RDONLY` 的值为 0。
    pub fn from_posix(flags: u32) -> Result<Self, FsError> {
        let mut result = match flags & O_ACCMODE {
            O_RDONLY => OpenFlags::READ,
            O_WRONLY => OpenFlags::WRITE,
            O_RDWR => OpenFlags::READ_WRITE,
            _ => return Err(FsError::InvalidArgument),
        };

        if flags & O_CREAT != 0 {
            result |= OpenFlags::CREATE;
        }
        if flags & O_EXCL != 0 {
            result |= OpenFlags::EXCLUSIVE;
        }
        if flags & O_TRUNC != 0 {
            result |= OpenFlags::TRUNCATE;
        }
        if flags & O_APPEND != 0 {
            result |= OpenFlags::APPEND;
        }

        Ok(result)
    }

    /// 校验组合是否合法
    ///
    /// 至少需要 READ 或 WRITE 之一；TRUNCATE 与 APPEND 需要 WRITE；EXCLUSIVE 需要 CREATE。
    pub fn validate(self) -> Result<Self, FsError> {
        if !self.intersects(OpenFlags::READ_WRITE) {
            return Err(FsError::InvalidArgument);
        }
        if self.intersects(OpenFlags::TRUNCATE | OpenFlags::APPEND)
            && !self.contains(OpenFlags::WRITE)
        {
            return Err(FsError::InvalidArgument);
        }
        if self.contains(OpenFlags::EXCLUSIVE) && !self.contains(OpenFlags::CREATE) {
            return Err(FsError::InvalidArgument);
        }
        Ok(self)
    }

    /// 是否可读
    pub fn readable(self) -> bool {
        self.contains(OpenFlags::READ)
    }

    /// 是否可写
    pub fn writable(self) -> bool {
        self.contains(OpenFlags::WRITE)
    }
}

/// 文件定位方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekWhence {
    /// 相对文件开头
    Set,
    /// 相对当前位置
    Cur,
    /// 相对文件末尾
    End,
}

impl SeekWhence {
    /// 从 POSIX `SEEK_*` 取值转换
    pub fn from_raw(whence: i32) -> Result<Self, FsError> {
        match whence {
            SEEK_SET => Ok(SeekWhence::Set),
            SEEK_CUR => Ok(SeekWhence::Cur),
            SEEK_END => Ok(SeekWhence::End),
            _ => Err(FsError::InvalidArgument),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_posix_access_mode_field() {
        // O_RDONLY 为 0，不能按位测试
        assert_eq!(OpenFlags::from_posix(O_RDONLY).unwrap(), OpenFlags::READ);
        assert_eq!(OpenFlags::from_posix(O_WRONLY).unwrap(), OpenFlags::WRITE);
        assert_eq!(
            OpenFlags::from_posix(O_RDWR).unwrap(),
            OpenFlags::READ_WRITE
        );
        assert_eq!(
            OpenFlags::from_posix(O_ACCMODE),
            Err(FsError::InvalidArgument)
        );
    }

    #[test]
    fn test_from_posix_modifiers() {
        let flags = OpenFlags::from_posix(O_WRONLY | O_CREAT | O_TRUNC | O_APPEND | O_EXCL).unwrap();
        assert_eq!(
            flags,
            OpenFlags::WRITE
                | OpenFlags::CREATE
                | OpenFlags::TRUNCATE
                | OpenFlags::APPEND
                | OpenFlags::EXCLUSIVE
        );
    }

    #[test]
    fn test_validate() {
        assert!(OpenFlags::READ.validate().is_ok());
        assert!((OpenFlags::WRITE | OpenFlags::CREATE).validate().is_ok());
        assert_eq!(OpenFlags::CREATE.validate(), Err(FsError::InvalidArgument));
        assert_eq!(
            (OpenFlags::READ | OpenFlags::TRUNCATE).validate(),
            Err(FsError::InvalidArgument)
        );
        assert_eq!(
            (OpenFlags::READ | OpenFlags::APPEND).validate(),
            Err(FsError::InvalidArgument)
        );
        assert_eq!(
            (OpenFlags::WRITE | OpenFlags::EXCLUSIVE).validate(),
            Err(FsError::InvalidArgument)
        );
    }

    #[test]
    fn test_seek_whence_from_raw() {
        assert_eq!(SeekWhence::from_raw(SEEK_SET).unwrap(), SeekWhence::Set);
        assert_eq!(SeekWhence::from_raw(SEEK_CUR).unwrap(), SeekWhence::Cur);
        assert_eq!(SeekWhence::from_raw(SEEK_END).unwrap(), SeekWhence::End);
        assert_eq!(SeekWhence::from_raw(3), Err(FsError::InvalidArgument));
    }
}
