//! # Shen (深)
//!
//! 纯 Rust 实现的深度相机采集框架.
//!
//! Shen 面向结构光深度扫描仪 (MINI 类设备), 提供从设备到磁盘的完整采集链路:
//! - **帧流解复用**: 从 HTTP 媒体通道的原始字节流中切分同步的深度/辅助图像对
//! - **设备协议**: 命令通道 (配置、增益、会话清理) 与媒体通道 (长连接字节流)
//! - **容器输出**: 多页 TIFF 写入 (16 位深度序列 + 8 位灰度序列)
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use shen::device::{DeviceConfig, Scanner};
//!
//! let scanner = Scanner::open(DeviceConfig::new("192.168.1.14"));
//! let frames = scanner.acquire(2).expect("采集失败");
//! println!("采集到 {} 帧", frames.len());
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `shen-core` | 核心类型与错误处理 |
//! | `shen-format` | 帧流解复用与 TIFF 容器 |
//! | `shen-device` | 设备命令/媒体通道与会话门面 |

/// 核心类型与错误处理
pub use shen_core as core;

/// 设备命令/媒体通道与会话门面
pub use shen_device as device;

/// 帧流解复用与 TIFF 容器
pub use shen_format as format;

/// 获取 Shen 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
