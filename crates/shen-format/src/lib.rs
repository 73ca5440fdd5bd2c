//! # shen-format
//!
//! Shen 深度相机采集框架帧流与容器层.
//!
//! 本 crate 负责媒体通道字节流的累积与解复用, 以及解码结果的
//! 多页 TIFF 容器写入:
//! - [`reader::StreamReader`] 按固定块累积媒体通道字节
//! - [`demux::FrameDemuxer`] 在累积缓冲区中扫描同步标记并切分帧
//! - [`tiff::TiffMuxer`] 将深度/辅助图像序列写入多页 TIFF

pub mod demux;
pub mod io;
pub mod reader;
pub mod tiff;

// 重导出常用类型
pub use demux::FrameDemuxer;
pub use io::IoContext;
pub use reader::StreamReader;
pub use tiff::TiffMuxer;
