//! 设备命令通道.
//!
//! 每条命令是一次短连接 HTTP GET. 非成功状态码记录日志后视为
//! "无可用结果" (返回 `None`), 由调用方检查; 传输层失败才作为
//! 错误传播. 任何层面都不重试, 每个失败只暴露一次.

use shen_core::{ShenError, ShenResult};

#[cfg(feature = "http")]
use log::warn;

#[cfg(feature = "http")]
use crate::config::DeviceConfig;

/// 命令通道 trait
///
/// 以 trait 作为协议缝, 测试时可注入脚本化实现.
pub trait CommandChannel {
    /// 发送一条命令, 返回响应体
    ///
    /// # 返回
    /// - `Ok(Some(body))`: 命令成功
    /// - `Ok(None)`: 设备以非成功状态拒绝 (已记录日志)
    /// - `Err(..)`: 传输层失败
    fn send(&self, query: &str) -> ShenResult<Option<String>>;
}

/// 修复设备返回的 JSON 体
///
/// 设备把多个 JSON 对象背靠背拼接返回 (`}{` 之间缺逗号),
/// 解码前需要把相邻对象连成一个.
pub fn repair_adjacent_objects(raw: &str) -> String {
    raw.replace("}{", ",")
}

/// 修复并解析设备 JSON 响应体
pub fn parse_device_json(raw: &str) -> ShenResult<serde_json::Value> {
    serde_json::from_str(&repair_adjacent_objects(raw))
        .map_err(|e| ShenError::InvalidData(format!("设备 JSON 解析失败: {e}")))
}

/// 基于 ureq 的 HTTP 命令通道
#[cfg(feature = "http")]
pub struct HttpCommandChannel {
    config: DeviceConfig,
}

#[cfg(feature = "http")]
impl HttpCommandChannel {
    /// 创建命令通道
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

#[cfg(feature = "http")]
impl CommandChannel for HttpCommandChannel {
    fn send(&self, query: &str) -> ShenResult<Option<String>> {
        use std::io::Read;

        let url = self.config.cmd_url(query);
        match ureq::get(&url).call() {
            Ok(mut response) => {
                let mut body = String::new();
                response.body_mut().as_reader().read_to_string(&mut body)?;
                Ok(Some(body))
            }
            Err(ureq::Error::StatusCode(code)) => {
                warn!("命令被拒绝: {url} 状态码 {code}");
                Ok(None)
            }
            Err(e) => Err(ShenError::Device(format!("命令请求失败 {url}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_修复_相邻对象() {
        let raw = r#"{"width":640}{"height":400}"#;
        assert_eq!(
            repair_adjacent_objects(raw),
            r#"{"width":640,"height":400}"#
        );

        let value = parse_device_json(raw).unwrap();
        assert_eq!(value["width"], 640);
        assert_eq!(value["height"], 400);
    }

    #[test]
    fn test_json_修复_单对象原样() {
        let raw = r#"{"fps":30}"#;
        let value = parse_device_json(raw).unwrap();
        assert_eq!(value["fps"], 30);
    }

    #[test]
    fn test_json_无法修复_报错() {
        let err = parse_device_json("not json at all").unwrap_err();
        assert!(matches!(err, ShenError::InvalidData(_)));
    }
}
