//! 统一错误类型定义.
//!
//! 所有 Shen crate 共用的错误类型, 支持跨模块传播.

use thiserror::Error;

/// Shen 框架统一错误类型
#[derive(Debug, Error)]
pub enum ShenError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 设备通信失败 (命令通道或媒体通道不可达)
    #[error("设备通信失败: {0}")]
    Device(String),

    /// 容器格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// 无效数据 (损坏的响应体等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,
}

/// Shen 框架统一 Result 类型
pub type ShenResult<T> = Result<T, ShenError>;
