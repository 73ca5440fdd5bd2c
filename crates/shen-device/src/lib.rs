//! # shen-device
//!
//! Shen 深度相机采集框架设备协议层.
//!
//! 设备暴露两条 HTTP 通道:
//! - **命令通道**: 短连接 GET 请求, 用于配置/查询设备状态
//! - **媒体通道**: 长连接 GET 响应体, 承载原始帧字节流
//!
//! [`Scanner`] 把两条通道组合成同步阻塞的采集会话门面.

pub mod command;
pub mod config;
pub mod media;
pub mod scanner;

// 重导出常用类型
pub use command::CommandChannel;
pub use config::DeviceConfig;
pub use media::MediaChannel;
pub use scanner::Scanner;

#[cfg(feature = "http")]
pub use command::HttpCommandChannel;
#[cfg(feature = "http")]
pub use media::HttpMediaChannel;
