//! 设备连接配置.
//!
//! 设备地址作为显式的不可变配置值在构造时传入, 不使用任何
//! 环境式全局状态. 支持 serde, 便于从 JSON 配置文件加载.

use serde::{Deserialize, Serialize};

use shen_format::demux::REWIND_MINI;

/// 命令通道 CGI 路径
const CMD_PATH: &str = "cgi-bin/zx_cmd.cgi";

/// 媒体通道 CGI 路径
const MEDIA_PATH: &str = "cgi-bin/zx_media.cgi";

/// 设备连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// 设备主机地址 (IP 或主机名)
    pub host: String,
    /// 解复用扫描回退量 (字节), 取决于固件版本
    ///
    /// 见 [`shen_format::demux`] 中的 `REWIND_MINI` / `REWIND_ALT`.
    #[serde(default = "default_rewind")]
    pub rewind: usize,
}

fn default_rewind() -> usize {
    REWIND_MINI
}

impl DeviceConfig {
    /// 以默认固件参数创建配置
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            rewind: REWIND_MINI,
        }
    }

    /// 命令通道 URL
    pub fn cmd_url(&self, query: &str) -> String {
        format!("http://{}/{}?{}", self.host, CMD_PATH, query)
    }

    /// 媒体通道 URL
    pub fn media_url(&self, query: &str) -> String {
        format!("http://{}/{}?{}", self.host, MEDIA_PATH, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_拼接() {
        let config = DeviceConfig::new("192.168.1.14");
        assert_eq!(
            config.cmd_url("close_stream_all"),
            "http://192.168.1.14/cgi-bin/zx_cmd.cgi?close_stream_all"
        );
        assert_eq!(
            config.media_url("camera_id=22&type_id=20"),
            "http://192.168.1.14/cgi-bin/zx_media.cgi?camera_id=22&type_id=20"
        );
    }

    #[test]
    fn test_serde_默认回退量() {
        let config: DeviceConfig = serde_json::from_str(r#"{"host":"10.0.0.2"}"#).unwrap();
        assert_eq!(config.host, "10.0.0.2");
        assert_eq!(config.rewind, REWIND_MINI);

        let config: DeviceConfig =
            serde_json::from_str(r#"{"host":"10.0.0.2","rewind":10}"#).unwrap();
        assert_eq!(config.rewind, 10);
    }
}
