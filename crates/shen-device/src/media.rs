//! 设备媒体通道.
//!
//! 媒体流是一条长连接 HTTP GET 响应体: 设备收到请求后持续推送
//! 原始帧字节, 协议没有流结束标记, 由客户端断开连接来停止.
//! 丢弃返回的读取器即关闭连接, 这是唯一的取消机制.

use std::io::Read;

use shen_core::ShenResult;

#[cfg(feature = "http")]
use shen_core::ShenError;

#[cfg(feature = "http")]
use crate::config::DeviceConfig;

/// 媒体通道 trait
///
/// 以 trait 作为协议缝, 测试时可注入内存字节源.
pub trait MediaChannel {
    /// 打开长连接媒体流, 返回原始字节读取器
    fn open(&self, query: &str) -> ShenResult<Box<dyn Read>>;
}

/// 基于 ureq 的 HTTP 媒体通道
#[cfg(feature = "http")]
pub struct HttpMediaChannel {
    config: DeviceConfig,
}

#[cfg(feature = "http")]
impl HttpMediaChannel {
    /// 创建媒体通道
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "http")]
impl MediaChannel for HttpMediaChannel {
    fn open(&self, query: &str) -> ShenResult<Box<dyn Read>> {
        let url = self.config.media_url(query);
        match ureq::get(&url).call() {
            Ok(response) => {
                let (_, body) = response.into_parts();
                Ok(Box::new(body.into_reader()))
            }
            Err(ureq::Error::StatusCode(code)) => Err(ShenError::Device(format!(
                "媒体流被拒绝: {url} 状态码 {code}"
            ))),
            Err(e) => Err(ShenError::Device(format!("媒体流请求失败 {url}: {e}"))),
        }
    }
}
