//! 引擎路径规范化
//!
//! 卷内路径总是相对卷根解析：开头的 `/` 可有可无，`.` 被跳过，`..` 不能越过根。

use crate::FsError;

/// 将路径拆分为规范化后的组件
///
/// 空路径返回 [`FsError::InvalidArgument`]；根路径返回空列表。
pub fn path_components(path: &str) -> Result<Vec<&str>, FsError> {
    if path.is_empty() {
        return Err(FsError::InvalidArgument);
    }

    let mut stack = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            name => stack.push(name),
        }
    }
    Ok(stack)
}

/// 规范化为以 `/` 开头、无多余分隔符的绝对路径
pub fn normalize_path(path: &str) -> Result<String, FsError> {
    let components = path_components(path)?;
    let mut normalized = String::with_capacity(path.len() + 1);
    for name in &components {
        normalized.push('/');
        normalized.push_str(name);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    Ok(normalized)
}

/// 拆分为（父目录绝对路径，最后一个组件）
///
/// 根路径没有最后一个组件，返回 [`FsError::InvalidArgument`]。
pub fn split_path(path: &str) -> Result<(String, String), FsError> {
    let mut components = path_components(path)?;
    let name = components.pop().ok_or(FsError::InvalidArgument)?;
    let parent = if components.is_empty() {
        String::from("/")
    } else {
        let mut parent = String::new();
        for part in &components {
            parent.push('/');
            parent.push_str(part);
        }
        parent
    };
    Ok((parent, String::from(name)))
}
