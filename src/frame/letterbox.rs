// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame/letterbox.rs - 保持长宽比的正方形信箱缩放
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

use image::{
  RgbImage,
  imageops::{self, FilterType},
};
use tracing::debug;

use super::FrameError;

/// 缩放后内容在画布中的位置与大小
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
  pub x: u32,
  pub y: u32,
  pub width: u32,
  pub height: u32,
}

impl Roi {
  /// 计算 width×height 的图像放入 target×target 画布时的区域
  ///
  /// 长边缩放到 target，短边按比例截断取整（至少 1 像素），
  /// 偏移量为剩余空间的一半（整数除法）。
  pub fn fit(width: u32, height: u32, target: u32) -> Self {
    let max_dim = width.max(height) as u64;
    // 精确整数运算，避免 target / max_dim 的浮点误差在正方形输入上丢失一个像素
    let shrink = |side: u32| -> u32 {
      let scaled = (side as u64 * target as u64 / max_dim) as u32;
      scaled.clamp(1, target)
    };

    if width >= height {
      let scaled_height = shrink(height);
      Roi {
        x: 0,
        y: (target - scaled_height) / 2,
        width: target,
        height: scaled_height,
      }
    } else {
      let scaled_width = shrink(width);
      Roi {
        x: (target - scaled_width) / 2,
        y: 0,
        width: scaled_width,
        height: target,
      }
    }
  }

  pub fn contains(&self, x: u32, y: u32) -> bool {
    x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
  }

  /// 画布四周的填充宽度 (上, 下, 左, 右)
  pub fn padding(&self, target: u32) -> (u32, u32, u32, u32) {
    (
      self.y,
      target - self.y - self.height,
      self.x,
      target - self.x - self.width,
    )
  }
}

/// 将任意长宽比的图像缩放进 target_size×target_size 的黑色画布
pub fn letterbox(image: &RgbImage, target_size: u32) -> Result<(RgbImage, Roi), FrameError> {
  let (width, height) = image.dimensions();
  if width == 0 || height == 0 {
    return Err(FrameError::EmptyImage { width, height });
  }
  if target_size == 0 {
    return Err(FrameError::InvalidTargetSize(target_size));
  }

  let roi = Roi::fit(width, height, target_size);
  debug!(
    "信箱缩放: {}x{} -> {}x{}, 偏移 ({}, {})",
    width, height, roi.width, roi.height, roi.x, roi.y
  );

  let mut canvas = RgbImage::new(target_size, target_size);
  if (roi.width, roi.height) == (width, height) {
    imageops::replace(&mut canvas, image, roi.x as i64, roi.y as i64);
  } else {
    let scaled = imageops::resize(image, roi.width, roi.height, FilterType::Triangle);
    imageops::replace(&mut canvas, &scaled, roi.x as i64, roi.y as i64);
  }

  Ok((canvas, roi))
}
