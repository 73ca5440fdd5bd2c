//! 扫描仪采集会话门面.
//!
//! 把命令通道和媒体通道组合成同步阻塞的采集流程: 预配置 →
//! 拉流累积 → 解复用. 整个流程单线程阻塞, 设备同一时刻只支持
//! 一条活动媒体流, 不要并发发起第二次采集; 本层不设超时,
//! 无人值守场景由调用方在外层加截止时间.

use log::{debug, warn};

use shen_core::{ScanFrame, SensorGeometry, ShenError, ShenResult};
use shen_format::demux::FrameDemuxer;
use shen_format::reader::StreamReader;

use crate::command::{CommandChannel, parse_device_json};
use crate::media::MediaChannel;

#[cfg(feature = "http")]
use crate::command::HttpCommandChannel;
#[cfg(feature = "http")]
use crate::config::DeviceConfig;
#[cfg(feature = "http")]
use crate::media::HttpMediaChannel;

/// 媒体流查询串: 深度相机原始流
const MEDIA_QUERY: &str = "camera_id=22&type_id=20";

/// 清理所有已打开的流会话
const QUERY_CLOSE_ALL: &str = "close_stream_all";

/// 固件版本信息文件
const QUERY_VERSION: &str = "download=/tmp/inited";

/// 当前深度分辨率查询
///
/// 注意: 此端点的查询串以额外的 '?' 开头, 与设备固件保持一致.
const QUERY_DEPTH_RESO: &str = "?cam_type=mipi&get_depth_reso";

/// 精度寄存器调优 (0x904)
const TUNE_ACCURACY: &str = "system_cmd=echo%20s%200x904%200%20>%20/dev/rk_preisp";

/// 投射图案/帧率寄存器调优 (0x707)
///
/// 注意: 此查询串 '>' 前没有 %20, 与设备固件保持一致.
const TUNE_PATTERN: &str = "system_cmd=echo%20s%200x707%2090%20280%20>/dev/rk_preisp";

/// 双路相机输出格式 (辅助图随深度图一并返回)
const ARM_OUTPUT_FMT: &str = "cam_type=mipi&set_depth_output_fmt=3";

/// 关闭触发模式, 自由运行
const ARM_TRIGGER: &str = "cam_type=mipi&set_trigger_mode=0";

/// 扫描仪采集会话
pub struct Scanner<C, M> {
    /// 传感器几何参数
    geometry: SensorGeometry,
    /// 命令通道
    commands: C,
    /// 媒体通道
    media: M,
    /// 字节累积器
    reader: StreamReader,
    /// 帧解复用器
    demuxer: FrameDemuxer,
}

#[cfg(feature = "http")]
impl Scanner<HttpCommandChannel, HttpMediaChannel> {
    /// 以 HTTP 通道打开 MINI 类设备的采集会话
    pub fn open(config: DeviceConfig) -> Self {
        let rewind = config.rewind;
        Self::with_channels(
            SensorGeometry::MINI,
            rewind,
            HttpCommandChannel::new(config.clone()),
            HttpMediaChannel::new(config),
        )
    }
}

impl<C: CommandChannel, M: MediaChannel> Scanner<C, M> {
    /// 以自定义通道组装会话 (测试注入点)
    pub fn with_channels(geometry: SensorGeometry, rewind: usize, commands: C, media: M) -> Self {
        Self {
            geometry,
            commands,
            media,
            reader: StreamReader::new(geometry),
            demuxer: FrameDemuxer::new(geometry, rewind),
        }
    }

    /// 清理设备上的残留流会话
    pub fn close_streams(&self) -> ShenResult<()> {
        self.commands.send(QUERY_CLOSE_ALL)?;
        Ok(())
    }

    /// 读取固件版本信息 (原始文本)
    pub fn firmware_version(&self) -> ShenResult<Option<String>> {
        self.commands.send(QUERY_VERSION)
    }

    /// 查询当前深度分辨率
    ///
    /// 响应体是背靠背拼接的 JSON 对象, 解析前先修复.
    pub fn depth_resolution(&self) -> ShenResult<Option<serde_json::Value>> {
        match self.commands.send(QUERY_DEPTH_RESO)? {
            Some(body) => Ok(Some(parse_device_json(&body)?)),
            None => Ok(None),
        }
    }

    /// 写入 MINI 固件的三个预调优寄存器
    ///
    /// 不发送这些命令设备也能出流, 但扫描更慢且增益偏高.
    /// 单条被拒绝只记录日志, 不中止.
    pub fn configure(&self) -> ShenResult<()> {
        let resolution = format!(
            "system_cmd=echo%20s%200x702%20{}%20{}%20>%20/dev/rk_preisp",
            self.geometry.width, self.geometry.height,
        );
        self.commands.send(TUNE_ACCURACY)?;
        self.commands.send(&resolution)?;
        self.commands.send(TUNE_PATTERN)?;
        Ok(())
    }

    /// 设置深度增益, 有效范围 1-16
    pub fn set_depth_gain(&self, gain: u8) -> ShenResult<()> {
        if !(1..=16).contains(&gain) {
            warn!("增益 {gain} 超出范围, 钳位到 1-16");
        }
        let value = 16 * u32::from(gain.clamp(1, 16));
        let query = format!("system_cmd=echo%20s%200x903%20{value}%20>/dev/rk_preisp");
        self.commands.send(&query)?;
        Ok(())
    }

    /// 采集 `frames` 帧
    ///
    /// 阻塞直到累积量达到阈值或媒体通道关闭. 解出的帧数可能少于
    /// 请求数 (短读), 由调用方比较返回数量; 短读不是错误.
    pub fn acquire(&self, frames: usize) -> ShenResult<Vec<ScanFrame>> {
        self.arm()?;

        debug!("打开媒体流, 目标 {frames} 帧");
        let mut stream = self.media.open(MEDIA_QUERY)?;
        let buf = self.reader.accumulate(stream.as_mut(), frames)?;
        // 断开连接, 设备随之停止推流
        drop(stream);

        let decoded = self.demuxer.split(&buf, frames);
        if decoded.len() < frames {
            warn!("短读: 请求 {} 帧, 实际解出 {} 帧", frames, decoded.len());
        }
        Ok(decoded)
    }

    /// 采集预配置: 显示分辨率/格式、双路输出、关触发
    ///
    /// 任一命令被设备拒绝则中止, 不进入拉流阶段.
    fn arm(&self) -> ShenResult<()> {
        let display = format!(
            "cam_type=mipi&set_display_reso=1&&set_display_width={}&&set_display_height={}&&set_display_type=4",
            self.geometry.width, self.geometry.height,
        );
        for query in [display.as_str(), ARM_OUTPUT_FMT, ARM_TRIGGER] {
            if self.commands.send(query)?.is_none() {
                return Err(ShenError::Device(format!("采集预配置命令被拒绝: {query}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shen_format::demux::{FRAME_MARKER, REWIND_MINI};
    use std::cell::{Cell, RefCell};
    use std::io::{Cursor, Read};

    /// 测试用小几何: 4x2, 载荷 32 字节
    const G: SensorGeometry = SensorGeometry::new(4, 2);

    /// 脚本化命令通道: 记录全部查询, 可按子串拒绝, 可按查询回体
    #[derive(Default)]
    struct ScriptedCommands {
        sent: RefCell<Vec<String>>,
        reject_containing: Option<&'static str>,
        bodies: Vec<(&'static str, &'static str)>,
    }

    impl CommandChannel for ScriptedCommands {
        fn send(&self, query: &str) -> ShenResult<Option<String>> {
            self.sent.borrow_mut().push(query.to_string());
            if let Some(pat) = self.reject_containing {
                if query.contains(pat) {
                    return Ok(None);
                }
            }
            let body = self
                .bodies
                .iter()
                .find(|(q, _)| *q == query)
                .map(|(_, b)| (*b).to_string())
                .unwrap_or_default();
            Ok(Some(body))
        }
    }

    /// 内存媒体通道: 返回固定字节流, 记录打开次数
    struct MemoryMedia {
        data: Vec<u8>,
        opened: Cell<usize>,
    }

    impl MemoryMedia {
        fn new(data: Vec<u8>) -> Self {
            Self {
                data,
                opened: Cell::new(0),
            }
        }
    }

    impl MediaChannel for MemoryMedia {
        fn open(&self, _query: &str) -> ShenResult<Box<dyn Read>> {
            self.opened.set(self.opened.get() + 1);
            Ok(Box::new(Cursor::new(self.data.clone())))
        }
    }

    /// k 帧合成码流: 标记 + 深度 (全 100+i) + 辅助 (全 10+i) + 6 字节填充
    fn build_stream(k: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        for i in 0..k {
            buf.extend_from_slice(&FRAME_MARKER);
            for _ in 0..G.pixel_count() {
                buf.extend_from_slice(&(100 + i as u16).to_le_bytes());
            }
            buf.extend(std::iter::repeat_n(10 + i as u8, G.pixel_count() * 2));
            buf.extend(std::iter::repeat_n(0xEEu8, 6));
        }
        buf
    }

    fn scanner_with(
        commands: ScriptedCommands,
        media: MemoryMedia,
    ) -> Scanner<ScriptedCommands, MemoryMedia> {
        Scanner::with_channels(G, REWIND_MINI, commands, media)
    }

    #[test]
    fn test_采集_完整帧数与预配置顺序() {
        let scanner = scanner_with(ScriptedCommands::default(), MemoryMedia::new(build_stream(2)));

        let frames = scanner.acquire(2).unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].depth.data.iter().all(|&s| s == 100));
        assert!(frames[1].depth.data.iter().all(|&s| s == 101));
        assert!(frames[1].aux.data.iter().all(|&s| s == 11));

        let sent = scanner.commands.sent.borrow();
        assert_eq!(sent.len(), 3);
        assert!(sent[0].contains("set_display_reso=1"));
        assert!(sent[0].contains("set_display_width=4&&set_display_height=2"));
        assert!(sent[1].contains("set_depth_output_fmt=3"));
        assert!(sent[2].contains("set_trigger_mode=0"));
        assert_eq!(scanner.media.opened.get(), 1);
    }

    #[test]
    fn test_采集_预配置被拒绝即中止() {
        let commands = ScriptedCommands {
            reject_containing: Some("set_trigger_mode"),
            ..Default::default()
        };
        let scanner = scanner_with(commands, MemoryMedia::new(build_stream(2)));

        let err = scanner.acquire(1).unwrap_err();
        assert!(matches!(err, ShenError::Device(_)));
        // 未进入拉流阶段
        assert_eq!(scanner.media.opened.get(), 0);
    }

    #[test]
    fn test_采集_短读不报错() {
        let scanner = scanner_with(ScriptedCommands::default(), MemoryMedia::new(build_stream(1)));
        let frames = scanner.acquire(3).unwrap();
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_深度增益_钳位与寄存器值() {
        let scanner = scanner_with(ScriptedCommands::default(), MemoryMedia::new(Vec::new()));

        scanner.set_depth_gain(2).unwrap();
        scanner.set_depth_gain(40).unwrap();

        let sent = scanner.commands.sent.borrow();
        assert!(sent[0].contains("0x903%2032%20"));
        assert!(sent[1].contains("0x903%20256%20"));
    }

    #[test]
    fn test_分辨率查询_json_修复() {
        let commands = ScriptedCommands {
            bodies: vec![(
                "?cam_type=mipi&get_depth_reso",
                r#"{"width":640}{"height":400}"#,
            )],
            ..Default::default()
        };
        let scanner = scanner_with(commands, MemoryMedia::new(Vec::new()));

        let value = scanner.depth_resolution().unwrap().unwrap();
        assert_eq!(value["width"], 640);
        assert_eq!(value["height"], 400);
    }

    #[test]
    fn test_固件版本_与会话清理() {
        let commands = ScriptedCommands {
            bodies: vec![("download=/tmp/inited", "MINI fw 1.0.2")],
            ..Default::default()
        };
        let scanner = scanner_with(commands, MemoryMedia::new(Vec::new()));

        assert_eq!(
            scanner.firmware_version().unwrap().as_deref(),
            Some("MINI fw 1.0.2")
        );
        scanner.close_streams().unwrap();
        scanner.configure().unwrap();

        let sent = scanner.commands.sent.borrow();
        assert_eq!(sent[1], "close_stream_all");
        // 预调优: 0x904, 0x702 (带几何尺寸), 0x707
        assert!(sent[2].contains("0x904"));
        assert!(sent[3].contains("0x702%204%202%20"));
        assert!(sent[4].contains("0x707"));
    }
}
