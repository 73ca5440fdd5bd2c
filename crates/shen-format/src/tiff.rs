//! 多页 TIFF 封装器.
//!
//! 将解码后的图像序列写入小端 baseline TIFF, 每帧一页, 单条带:
//! - 深度页: 16 位灰度 (BlackIsZero, 无符号)
//! - 辅助页: 8 位灰度
//!
//! 写入流程:
//! 1. `write_header()` - 写入字节序标识和魔数, 预留首个 IFD 偏移
//! 2. `write_depth_page()` / `write_gray_page()` - 逐页追加
//! 3. `finish()` - 结束写入 (IFD 链在逐页写入时已回填)

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use shen_core::{DepthImage, GrayImage, ShenError, ShenResult};

use crate::io::IoContext;

// TIFF 标签
const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_X_RESOLUTION: u16 = 282;
const TAG_Y_RESOLUTION: u16 = 283;
const TAG_RESOLUTION_UNIT: u16 = 296;
const TAG_SAMPLE_FORMAT: u16 = 339;

// 字段类型
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

/// 每页 IFD 条目数 (按标签升序写入)
const IFD_ENTRY_COUNT: u16 = 13;

/// 单个 IFD 的字节数: 条目计数 + 条目 + 下一 IFD 偏移
const IFD_BYTES: u64 = 2 + 12 * IFD_ENTRY_COUNT as u64 + 4;

/// 多页 TIFF 封装器
///
/// 每页布局为 [条带数据][分辨率有理数][IFD], 前一页 (或文件头)
/// 的 "下一 IFD 偏移" 字段在写入当前页时回填, 因此要求输出
/// 后端支持 seek.
pub struct TiffMuxer {
    /// 待回填的 "下一 IFD 偏移" 字段位置
    next_link_offset: u64,
    /// 已写入页数
    pages: u32,
    /// 头部是否已写入
    header_written: bool,
}

impl TiffMuxer {
    /// 创建封装器
    pub fn new() -> Self {
        Self {
            next_link_offset: 0,
            pages: 0,
            header_written: false,
        }
    }

    /// 写入文件头 (小端标识 "II" + 魔数 42 + 首个 IFD 偏移占位)
    pub fn write_header(&mut self, io: &mut IoContext) -> ShenResult<()> {
        io.write_all(b"II")?;
        io.write_u16_le(42)?;
        self.next_link_offset = io.position()?;
        io.write_u32_le(0)?; // 占位, 首页写入时回填
        self.header_written = true;
        Ok(())
    }

    /// 追加一页 16 位深度图
    pub fn write_depth_page(&mut self, io: &mut IoContext, image: &DepthImage) -> ShenResult<()> {
        let mut strip = vec![0u8; image.len() * 2];
        LittleEndian::write_u16_into(&image.data, &mut strip);
        self.write_page(io, image.width, image.height, 16, &strip)
    }

    /// 追加一页 8 位灰度图
    pub fn write_gray_page(&mut self, io: &mut IoContext, image: &GrayImage) -> ShenResult<()> {
        self.write_page(io, image.width, image.height, 8, &image.data)
    }

    /// 结束写入
    pub fn finish(&mut self, io: &mut IoContext) -> ShenResult<()> {
        if !self.header_written {
            return Err(ShenError::Format("TIFF 头部尚未写入".into()));
        }
        debug!(
            "TIFF 写入完成: {} 页, {} 字节",
            self.pages,
            io.position()?,
        );
        Ok(())
    }

    /// 写入一页: 条带数据 + 分辨率有理数 + IFD, 并回填上一处链接
    fn write_page(
        &mut self,
        io: &mut IoContext,
        width: usize,
        height: usize,
        bits: u16,
        strip: &[u8],
    ) -> ShenResult<()> {
        if !self.header_written {
            return Err(ShenError::Format("TIFF 头部尚未写入".into()));
        }

        let data_offset = io.position()?;
        io.write_all(strip)?;

        // 分辨率有理数 (72/1), 超出 4 字节的值放在 IFD 外
        let xres_offset = io.position()?;
        io.write_u32_le(72)?;
        io.write_u32_le(1)?;
        let yres_offset = io.position()?;
        io.write_u32_le(72)?;
        io.write_u32_le(1)?;

        let ifd_offset = io.position()?;
        if ifd_offset + IFD_BYTES > u64::from(u32::MAX) {
            return Err(ShenError::Format("TIFF 文件超过 4 GB 偏移上限".into()));
        }

        io.write_u16_le(IFD_ENTRY_COUNT)?;
        write_entry_long(io, TAG_IMAGE_WIDTH, width as u32)?;
        write_entry_long(io, TAG_IMAGE_LENGTH, height as u32)?;
        write_entry_short(io, TAG_BITS_PER_SAMPLE, bits)?;
        write_entry_short(io, TAG_COMPRESSION, 1)?; // 无压缩
        write_entry_short(io, TAG_PHOTOMETRIC, 1)?; // BlackIsZero
        write_entry_long(io, TAG_STRIP_OFFSETS, data_offset as u32)?;
        write_entry_short(io, TAG_SAMPLES_PER_PIXEL, 1)?;
        write_entry_long(io, TAG_ROWS_PER_STRIP, height as u32)?;
        write_entry_long(io, TAG_STRIP_BYTE_COUNTS, strip.len() as u32)?;
        write_entry_rational(io, TAG_X_RESOLUTION, xres_offset as u32)?;
        write_entry_rational(io, TAG_Y_RESOLUTION, yres_offset as u32)?;
        write_entry_short(io, TAG_RESOLUTION_UNIT, 2)?; // 英寸
        write_entry_short(io, TAG_SAMPLE_FORMAT, 1)?; // 无符号整数
        io.write_u32_le(0)?; // 下一 IFD 偏移占位
        let end_pos = io.position()?;

        // 回填上一处链接 (文件头或前一页 IFD)
        io.seek(std::io::SeekFrom::Start(self.next_link_offset))?;
        io.write_u32_le(ifd_offset as u32)?;
        io.seek(std::io::SeekFrom::Start(end_pos))?;
        self.next_link_offset = end_pos - 4;

        self.pages += 1;
        debug!(
            "TIFF 第 {} 页: {}x{} {} 位, 条带 {} 字节 @ {}",
            self.pages,
            width,
            height,
            bits,
            strip.len(),
            data_offset,
        );
        Ok(())
    }
}

impl Default for TiffMuxer {
    fn default() -> Self {
        Self::new()
    }
}

/// 写入 SHORT 类型条目 (值置于 4 字节值域的低 2 字节)
fn write_entry_short(io: &mut IoContext, tag: u16, value: u16) -> ShenResult<()> {
    io.write_u16_le(tag)?;
    io.write_u16_le(TYPE_SHORT)?;
    io.write_u32_le(1)?;
    io.write_u16_le(value)?;
    io.write_u16_le(0)
}

/// 写入 LONG 类型条目
fn write_entry_long(io: &mut IoContext, tag: u16, value: u32) -> ShenResult<()> {
    io.write_u16_le(tag)?;
    io.write_u16_le(TYPE_LONG)?;
    io.write_u32_le(1)?;
    io.write_u32_le(value)
}

/// 写入 RATIONAL 类型条目 (值域存放有理数所在偏移)
fn write_entry_rational(io: &mut IoContext, tag: u16, value_offset: u32) -> ShenResult<()> {
    io.write_u16_le(tag)?;
    io.write_u16_le(TYPE_RATIONAL)?;
    io.write_u32_le(1)?;
    io.write_u32_le(value_offset)
}
