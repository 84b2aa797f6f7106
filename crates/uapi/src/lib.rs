//! 与调用方共用的定义
//!
//! 包含 POSIX 兼容的常量，确保 VFS 层与调用方对标志位、模式位的理解一致

#![no_std]
// uapi 中全部是与 Linux 兼容的常量定义；逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod fcntl;
pub mod stat;
