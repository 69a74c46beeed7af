// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame.rs - 信箱画布帧定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{Rgb, RgbImage};
use thiserror::Error;

mod blob;
mod letterbox;

pub use self::blob::{BLOB_MEAN, BLOB_SCALE_FACTOR, BlobParams, BlobTensor};
pub use self::letterbox::{Roi, letterbox};

pub(crate) const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("图像尺寸无效: {width}x{height}")]
  EmptyImage { width: u32, height: u32 },
  #[error("目标尺寸无效: {0}")]
  InvalidTargetSize(u32),
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 像素在内存中的通道排列顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelOrder {
  #[default]
  Rgb,
  Bgr,
}

/// N×N 的信箱画布，内容居中，其余像素为 0
#[derive(Debug, Clone)]
pub struct SquareFrame<const N: u32> {
  canvas: RgbImage,
  roi: Roi,
  order: PixelOrder,
}

impl<const N: u32> SquareFrame<N> {
  /// 对 RGB 图像做信箱缩放
  pub fn from_image(image: &RgbImage) -> Result<Self, FrameError> {
    let (canvas, roi) = letterbox(image, N)?;
    Ok(Self {
      canvas,
      roi,
      order: PixelOrder::Rgb,
    })
  }

  /// 从交错排列的 BGR 字节构建，例如来自 OpenCV 风格的采集缓冲区
  pub fn from_bgr_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
    let expected = RGB_CHANNELS * width as usize * height as usize;
    let actual = data.len();
    if actual != expected {
      return Err(FrameError::LengthMismatch { expected, actual });
    }

    let image =
      RgbImage::from_raw(width, height, data).ok_or(FrameError::LengthMismatch { expected, actual })?;
    let (canvas, roi) = letterbox(&image, N)?;

    Ok(Self {
      canvas,
      roi,
      order: PixelOrder::Bgr,
    })
  }

  pub fn side(&self) -> u32 {
    N
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// 缩放后内容在画布中占据的区域
  pub fn roi(&self) -> Roi {
    self.roi
  }

  pub fn order(&self) -> PixelOrder {
    self.order
  }

  /// 按原始通道顺序排列的 HWC 字节
  pub fn as_nhwc(&self) -> &[u8] {
    self.canvas.as_raw()
  }

  pub fn to_rgb_image(&self) -> RgbImage {
    match self.order {
      PixelOrder::Rgb => self.canvas.clone(),
      PixelOrder::Bgr => RgbImage::from_fn(N, N, |x, y| {
        let Rgb([b, g, r]) = *self.canvas.get_pixel(x, y);
        Rgb([r, g, b])
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_bgr_frame_converts_back_to_rgb() {
    let frame = SquareFrame::<1>::from_bgr_raw(1, 1, vec![10, 20, 30]).unwrap();
    assert_eq!(frame.order(), PixelOrder::Bgr);
    assert_eq!(frame.as_nhwc(), &[10, 20, 30]);
    assert_eq!(frame.to_rgb_image().get_pixel(0, 0), &Rgb([30, 20, 10]));
  }

  #[test]
  fn test_bgr_frame_rejects_short_buffer() {
    let err = SquareFrame::<4>::from_bgr_raw(2, 2, vec![0; 11]).unwrap_err();
    assert_eq!(
      err,
      FrameError::LengthMismatch {
        expected: 12,
        actual: 11
      }
    );
  }

  #[test]
  fn test_empty_image_is_rejected() {
    let image = RgbImage::new(0, 5);
    assert!(matches!(
      SquareFrame::<8>::from_image(&image),
      Err(FrameError::EmptyImage { width: 0, height: 5 })
    ));
  }
}
