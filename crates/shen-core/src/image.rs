//! 行主序图像平面.
//!
//! 解码后的图像以一维采样缓冲区 + 宽高描述, 行主序存储.
//! 深度图为 u16 (0 表示该像素无读数), 辅助图为 u8 灰度.

use crate::error::{ShenError, ShenResult};

/// 行主序采样平面
///
/// `data.len() == width * height`, 第 `y` 行占据
/// `data[y*width .. (y+1)*width]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePlane<T> {
    /// 采样数据 (行主序)
    pub data: Vec<T>,
    /// 宽度 (每行采样数)
    pub width: usize,
    /// 高度 (行数)
    pub height: usize,
}

impl<T: Copy> ImagePlane<T> {
    /// 从已有采样数据创建, 校验长度与宽高一致
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> ShenResult<Self> {
        if data.len() != width * height {
            return Err(ShenError::InvalidArgument(format!(
                "采样数 {} 与尺寸 {}x{} 不符",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// 采样总数
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空平面
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 第 `y` 行的采样切片
    pub fn row(&self, y: usize) -> &[T] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// 读取 `(x, y)` 处的采样, 越界返回 None
    pub fn sample(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }
}

/// 深度图: 每像素 16 位无符号距离读数, 0 表示无读数
pub type DepthImage = ImagePlane<u16>;

/// 辅助图: 两路 8 位灰度相机画面垂直堆叠
pub type GrayImage = ImagePlane<u8>;
