//! 深度帧流解复用器.
//!
//! 设备媒体通道返回的是无界原始字节流, 每帧载荷前有一个 4 字节
//! 同步标记. 载荷数据不做转义, 与标记共用同一字节空间, 因此同步
//! 标记可能以任意字节对齐出现在载荷内部 (伪同步); 只能逐字节扫描,
//! 并接受伪同步导致错位的风险 (已知局限, 不做纠正).
//!
//! 帧布局 (以 MINI 640x400 为例, npix = 宽*高):
//! ```text
//! ┌────────────────┬─────────────────────────┬─────────────────────────┐
//! │ 同步标记 4 字节 │ 深度图: npix 个 u16 小端 │ 辅助图: 2*npix 个 u8    │
//! └────────────────┴─────────────────────────┴─────────────────────────┘
//! ```
//!
//! 跳过一帧载荷后, 设备并不以精确步长放置下一个标记, 需要回退
//! 少量字节再继续扫描 (见 [`REWIND_MINI`]). 这是设备固件的协议
//! 怪癖, 必须按位保留, 否则与真机行为不符.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use shen_core::{DepthImage, GrayImage, ScanFrame, SensorGeometry};

/// 帧起始同步标记
pub const FRAME_MARKER: [u8; 4] = [0x03, 0x07, 0x02, 0x01];

/// MINI 固件上观测到的扫描回退量 (字节)
pub const REWIND_MINI: usize = 4;

/// 另一类固件上观测到的扫描回退量 (字节)
///
/// 两个观测值互不一致, 按设备/固件版本选择, 不要写死在调用处.
pub const REWIND_ALT: usize = 10;

/// 帧解复用器
///
/// 在累积缓冲区中扫描同步标记, 校验剩余字节足够一帧后切分出
/// 深度/辅助图像对. 找到的帧数少于请求数不是错误, 由调用方比较
/// 返回数量自行判断.
pub struct FrameDemuxer {
    /// 传感器几何参数
    geometry: SensorGeometry,
    /// 跳过整帧载荷后的扫描回退量 (字节)
    rewind: usize,
}

impl FrameDemuxer {
    /// 创建解复用器
    ///
    /// `rewind` 取决于设备固件, 见 [`REWIND_MINI`] / [`REWIND_ALT`].
    pub fn new(geometry: SensorGeometry, rewind: usize) -> Self {
        debug_assert!(rewind <= geometry.payload_bytes());
        Self { geometry, rewind }
    }

    /// MINI 类设备的默认解复用器
    pub fn mini() -> Self {
        Self::new(SensorGeometry::MINI, REWIND_MINI)
    }

    /// 在缓冲区中切分最多 `max_frames` 帧
    ///
    /// 返回按码流顺序排列的帧. 缓冲区中无标记或剩余字节不足时
    /// 返回已收集的部分 (可能为空), 不报错.
    pub fn split(&self, buf: &[u8], max_frames: usize) -> Vec<ScanFrame> {
        let npix = self.geometry.pixel_count();
        let payload = self.geometry.payload_bytes();
        let mut frames = Vec::with_capacity(max_frames.min(16));

        // 剩余字节不足 "标记 + 整帧载荷 + 1" 时停止扫描
        let scan_end = buf.len().saturating_sub(payload + 4);
        let mut o = 0usize;
        while o < scan_end && frames.len() < max_frames {
            if buf[o..o + 4] != FRAME_MARKER {
                o += 1;
                continue;
            }
            o += 4;

            let depth = self.decode_depth(&buf[o..o + npix * 2]);
            let aux = self.decode_aux(&buf[o + npix * 2..o + payload]);
            frames.push(ScanFrame { depth, aux });

            // 跳过整帧载荷, 回退 rewind 字节后继续找下一个标记
            o += payload - self.rewind;
        }

        debug!(
            "解复用: 扫描 {} 字节, 得到 {}/{} 帧 (回退 {} 字节)",
            buf.len(),
            frames.len(),
            max_frames,
            self.rewind,
        );
        frames
    }

    /// 解码深度图: npix 个 u16 小端采样, 行主序重排为 (height, width)
    fn decode_depth(&self, payload: &[u8]) -> DepthImage {
        let mut samples = vec![0u16; self.geometry.pixel_count()];
        LittleEndian::read_u16_into(payload, &mut samples);
        DepthImage {
            data: samples,
            width: self.geometry.width,
            height: self.geometry.height,
        }
    }

    /// 解码辅助图: 2*npix 个 u8 采样, 行主序重排为 (2*height, width)
    fn decode_aux(&self, payload: &[u8]) -> GrayImage {
        GrayImage {
            data: payload.to_vec(),
            width: self.geometry.width,
            height: self.geometry.height * 2,
        }
    }
}
