//! 解码后的扫描帧.

use crate::image::{DepthImage, GrayImage};

/// 一帧同步的深度/辅助图像对
///
/// 每个被接受的同步标记恰好产生一帧. 构造后不可变, 返回给调用方后
/// 所有权归调用方.
#[derive(Debug, Clone)]
pub struct ScanFrame {
    /// 深度图 (height x width, u16)
    pub depth: DepthImage,
    /// 辅助图 (2*height x width, u8, 两路相机画面堆叠)
    pub aux: GrayImage,
}
