//! # shen-core
//!
//! Shen 深度相机采集框架核心库, 提供基础类型定义和错误处理.
//!
//! 本 crate 为整个 Shen 框架提供底层基础设施: 统一错误类型、
//! 传感器几何参数、行主序图像平面和解码后的扫描帧.

pub mod error;
pub mod frame;
pub mod geometry;
pub mod image;

// 重导出常用类型
pub use error::{ShenError, ShenResult};
pub use frame::ScanFrame;
pub use geometry::SensorGeometry;
pub use image::{DepthImage, GrayImage, ImagePlane};
