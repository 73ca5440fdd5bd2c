//! 媒体通道字节累积.
//!
//! 采集阶段只做纯粹的字节搬运: 从长连接媒体通道按固定块读取,
//! 直到累积量足以容纳目标帧数或通道关闭. 帧级校验全部留给
//! [`crate::demux::FrameDemuxer`].

use std::io::Read;

use bytes::Bytes;
use log::debug;

use shen_core::{SensorGeometry, ShenResult};

/// 每次从媒体通道读取的块大小 (字节)
pub const CHUNK_SIZE: usize = 1024;

/// 每帧帧间填充的经验上界 (字节)
///
/// 设备在帧与帧之间夹带少量额外字节, 累积阈值按最坏情况预留.
pub const FRAME_SLACK_BYTES: usize = 10;

/// 流式读取器
///
/// 设备收到媒体请求后会持续推流, 直到连接断开; 调用方通过丢弃
/// 字节源来关闭连接, 这是唯一的停止机制.
pub struct StreamReader {
    /// 传感器几何参数
    geometry: SensorGeometry,
}

impl StreamReader {
    /// 创建读取器
    pub fn new(geometry: SensorGeometry) -> Self {
        Self { geometry }
    }

    /// 目标帧数对应的累积字节阈值
    ///
    /// 每帧按 "整帧载荷 + 最坏情况填充" 估算, 是启发式上界而非
    /// 精确值.
    pub fn target_bytes(&self, frames: usize) -> usize {
        (self.geometry.payload_bytes() + FRAME_SLACK_BYTES) * frames
    }

    /// 从字节源累积, 直到超过阈值或流结束, 返回冻结的缓冲区
    pub fn accumulate(&self, source: &mut dyn Read, frames: usize) -> ShenResult<Bytes> {
        let target = self.target_bytes(frames);
        let mut buf: Vec<u8> = Vec::with_capacity(target + CHUNK_SIZE);
        let mut chunk = [0u8; CHUNK_SIZE];

        loop {
            let n = source.read(&mut chunk)?;
            if n == 0 {
                debug!("媒体通道关闭, 已累积 {} 字节", buf.len());
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.len() > target {
                debug!("累积达到阈值: {} / {} 字节", buf.len(), target);
                break;
            }
        }
        Ok(Bytes::from(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const G: SensorGeometry = SensorGeometry::new(4, 2);

    #[test]
    fn test_阈值计算() {
        // (32 + 10) * 3
        assert_eq!(StreamReader::new(G).target_bytes(3), 126);
        assert_eq!(
            StreamReader::new(SensorGeometry::MINI).target_bytes(1),
            1_024_010
        );
    }

    #[test]
    fn test_累积到阈值即停() {
        let data = vec![0xABu8; 10 * CHUNK_SIZE];
        let mut source = Cursor::new(data);

        let reader = StreamReader::new(G);
        let buf = reader.accumulate(&mut source, 2).unwrap();

        // 阈值 84, 第一个 1024 字节块即越过; 不再继续读
        assert_eq!(buf.len(), CHUNK_SIZE);
        assert!(buf.len() > reader.target_bytes(2));
    }

    #[test]
    fn test_通道提前关闭_返回已有字节() {
        let data = vec![0x01u8; 100];
        let mut source = Cursor::new(data);

        // MINI 一帧的阈值远大于 100, 源耗尽后返回全部已读字节
        let reader = StreamReader::new(SensorGeometry::MINI);
        let buf = reader.accumulate(&mut source, 1).unwrap();
        assert_eq!(buf.len(), 100);
    }

    #[test]
    fn test_空源() {
        let mut source = Cursor::new(Vec::<u8>::new());
        let buf = StreamReader::new(G).accumulate(&mut source, 4).unwrap();
        assert!(buf.is_empty());
    }
}
