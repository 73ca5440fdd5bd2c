//! I/O 抽象层.
//!
//! 为 TIFF 封装器和测试提供统一的读写接口, 支持文件与内存缓冲区
//! 两种后端. TIFF 是小端容器, 因此只提供小端整数读写.

use std::io::{self, Read, Seek, Write};

use shen_core::{ShenError, ShenResult};

/// I/O 上下文
///
/// 封装底层 I/O 操作, 为容器读写提供统一的数据访问接口.
pub struct IoContext {
    /// 内部 I/O 实现
    inner: Box<dyn IoBackend>,
    /// 读缓冲区
    buffer: Vec<u8>,
    /// 缓冲区中的有效数据长度
    buf_len: usize,
    /// 缓冲区当前读取位置
    buf_pos: usize,
}

/// I/O 后端 trait
///
/// 实现此 trait 以支持不同的 I/O 来源 (文件、内存等).
pub trait IoBackend: Send {
    /// 读取数据到缓冲区
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    /// 全部写入
    fn write_all(&mut self, buf: &[u8]) -> io::Result<()>;
    /// 定位 (seek)
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64>;
    /// 获取当前位置
    fn position(&mut self) -> io::Result<u64>;
    /// 获取总大小 (如果可知)
    fn size(&self) -> Option<u64>;
}

/// 默认读缓冲区大小 (32 KB)
const DEFAULT_BUFFER_SIZE: usize = 32 * 1024;

impl IoContext {
    /// 从 I/O 后端创建上下文
    pub fn new(backend: Box<dyn IoBackend>) -> Self {
        Self {
            inner: backend,
            buffer: vec![0u8; DEFAULT_BUFFER_SIZE],
            buf_len: 0,
            buf_pos: 0,
        }
    }

    /// 从文件路径打开 (只读)
    pub fn open_read(path: &str) -> ShenResult<Self> {
        let file = std::fs::File::open(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    /// 从文件路径打开 (写入, 截断已有内容)
    pub fn open_write(path: &str) -> ShenResult<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(FileBackend::new(file))))
    }

    // ========================
    // 读取方法
    // ========================

    /// 读取指定字节数
    pub fn read_exact(&mut self, buf: &mut [u8]) -> ShenResult<()> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let buffered = self.buf_len - self.buf_pos;
            if buffered > 0 {
                let to_copy = buffered.min(buf.len() - total_read);
                buf[total_read..total_read + to_copy]
                    .copy_from_slice(&self.buffer[self.buf_pos..self.buf_pos + to_copy]);
                self.buf_pos += to_copy;
                total_read += to_copy;
            } else {
                self.buf_pos = 0;
                self.buf_len = self.inner.read(&mut self.buffer)?;
                if self.buf_len == 0 {
                    return Err(ShenError::Eof);
                }
            }
        }
        Ok(())
    }

    /// 读取 u16 小端
    pub fn read_u16_le(&mut self) -> ShenResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// 读取 u32 小端
    pub fn read_u32_le(&mut self) -> ShenResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// 读取指定数量的字节
    pub fn read_bytes(&mut self, count: usize) -> ShenResult<Vec<u8>> {
        let mut buf = vec![0u8; count];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    // ========================
    // 写入方法
    // ========================

    /// 写入全部数据
    pub fn write_all(&mut self, buf: &[u8]) -> ShenResult<()> {
        self.inner.write_all(buf)?;
        Ok(())
    }

    /// 写入 u16 小端
    pub fn write_u16_le(&mut self, v: u16) -> ShenResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    /// 写入 u32 小端
    pub fn write_u32_le(&mut self, v: u32) -> ShenResult<()> {
        self.write_all(&v.to_le_bytes())
    }

    // ========================
    // 定位方法
    // ========================

    /// 定位 (seek)
    ///
    /// 注意: seek 会清空读缓冲区.
    pub fn seek(&mut self, pos: io::SeekFrom) -> ShenResult<u64> {
        self.buf_pos = 0;
        self.buf_len = 0;
        Ok(self.inner.seek(pos)?)
    }

    /// 获取当前位置
    ///
    /// 考虑读缓冲区中尚未消耗的数据量.
    pub fn position(&mut self) -> ShenResult<u64> {
        let raw_pos = self.inner.position()?;
        let buffered = (self.buf_len - self.buf_pos) as u64;
        Ok(raw_pos - buffered)
    }

    /// 获取总大小
    pub fn size(&self) -> Option<u64> {
        self.inner.size()
    }
}

/// 文件 I/O 后端
struct FileBackend {
    file: std::fs::File,
    size: Option<u64>,
}

impl FileBackend {
    fn new(file: std::fs::File) -> Self {
        let size = file.metadata().ok().map(|m| m.len());
        Self { file, size }
    }
}

impl IoBackend for FileBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }

    fn position(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}

/// 内存缓冲区 I/O 后端
///
/// 用于测试和内存中处理.
pub struct MemoryBackend {
    /// 数据缓冲区
    data: Vec<u8>,
    /// 当前位置
    pos: usize,
}

impl MemoryBackend {
    /// 从已有数据创建 (用于读取)
    pub fn from_data(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }

    /// 创建空缓冲区 (用于写入)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            pos: 0,
        }
    }

    /// 获取内部数据的引用
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IoBackend for MemoryBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let to_read = buf.len().min(available);
        if to_read == 0 {
            return Ok(0);
        }
        buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        Ok(to_read)
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // 位置在末尾则追加, 否则覆盖已有数据
        if self.pos >= self.data.len() {
            self.data.extend_from_slice(buf);
        } else {
            let overlap = (self.data.len() - self.pos).min(buf.len());
            self.data[self.pos..self.pos + overlap].copy_from_slice(&buf[..overlap]);
            if buf.len() > overlap {
                self.data.extend_from_slice(&buf[overlap..]);
            }
        }
        self.pos += buf.len();
        Ok(())
    }

    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let new_pos = match pos {
            io::SeekFrom::Start(offset) => offset as i64,
            io::SeekFrom::End(offset) => self.data.len() as i64 + offset,
            io::SeekFrom::Current(offset) => self.pos as i64 + offset,
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek 位置不能为负",
            ));
        }
        self.pos = new_pos as usize;
        Ok(self.pos as u64)
    }

    fn position(&mut self) -> io::Result<u64> {
        Ok(self.pos as u64)
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}
