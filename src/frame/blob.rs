// 该文件是 Shanan （山南西风） 项目的一部分。
// src/frame/blob.rs - 归一化 NCHW 输入张量
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

use tracing::debug;

use super::{PixelOrder, RGB_CHANNELS, SquareFrame};

/// 像素值缩放系数，1 / 127.5
pub const BLOB_SCALE_FACTOR: f32 = 0.007_843_137_254_901_96;
/// 三个通道统一减去的均值
pub const BLOB_MEAN: f32 = 127.5;

/// 张量构建参数：`(value - mean[c]) * scale_factor`，并输出为 `target_order` 的通道顺序
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobParams {
  pub scale_factor: f32,
  pub mean: [f32; RGB_CHANNELS],
  pub target_order: PixelOrder,
}

impl Default for BlobParams {
  fn default() -> Self {
    Self {
      scale_factor: BLOB_SCALE_FACTOR,
      mean: [BLOB_MEAN; RGB_CHANNELS],
      target_order: PixelOrder::Rgb,
    }
  }
}

impl BlobParams {
  pub fn normalize(&self, value: f32, channel: usize) -> f32 {
    (value - self.mean[channel]) * self.scale_factor
  }
}

/// 形状为 [1, 3, N, N] 的 f32 张量
#[derive(Debug, Clone, PartialEq)]
pub struct BlobTensor<const N: u32> {
  data: Box<[f32]>,
}

impl<const N: u32> BlobTensor<N> {
  /// 按 MobileNet 的归一化参数构建
  pub fn from_frame(frame: &SquareFrame<N>) -> Self {
    Self::with_params(frame, &BlobParams::default())
  }

  pub fn with_params(frame: &SquareFrame<N>, params: &BlobParams) -> Self {
    let plane = (N as usize) * (N as usize);
    let mut data = vec![0f32; RGB_CHANNELS * plane];
    let swap_rb = frame.order() != params.target_order;
    debug!("构建输入张量: {}x{}, 交换 R/B 通道: {}", N, N, swap_rb);

    for (idx, pixel) in frame.as_nhwc().chunks_exact(RGB_CHANNELS).enumerate() {
      for c in 0..RGB_CHANNELS {
        let src = if swap_rb { RGB_CHANNELS - 1 - c } else { c };
        data[c * plane + idx] = params.normalize(pixel[src] as f32, c);
      }
    }

    Self {
      data: data.into_boxed_slice(),
    }
  }

  pub fn shape(&self) -> [usize; 4] {
    [1, RGB_CHANNELS, N as usize, N as usize]
  }

  pub fn as_slice(&self) -> &[f32] {
    &self.data
  }

  /// 第 c 个通道平面
  pub fn plane(&self, c: usize) -> &[f32] {
    let plane = (N as usize) * (N as usize);
    &self.data[c * plane..(c + 1) * plane]
  }

  /// 以本机字节序展开，供只接受字节缓冲区的推理运行时使用
  pub fn to_ne_bytes(&self) -> Vec<u8> {
    self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  const EPSILON: f32 = 1e-6;

  fn uniform_frame<const N: u32>(value: u8) -> SquareFrame<N> {
    SquareFrame::from_image(&RgbImage::from_pixel(N, N, Rgb([value; 3]))).unwrap()
  }

  #[test]
  fn test_normalization_boundaries() {
    let params = BlobParams::default();
    assert!((params.normalize(0.0, 0) + 1.0).abs() < EPSILON);
    assert!((params.normalize(255.0, 1) - 1.0).abs() < EPSILON);
    assert!(params.normalize(127.5, 2).abs() < EPSILON);
  }

  #[test]
  fn test_every_channel_value_maps_into_unit_range() {
    let params = BlobParams::default();
    for c in 0..=255u8 {
      let expected = (c as f32 - 127.5) / 127.5;
      let actual = params.normalize(c as f32, 0);
      assert!((actual - expected).abs() < EPSILON, "像素值 {}", c);
      assert!((-1.0 - EPSILON..=1.0 + EPSILON).contains(&actual));
    }
  }

  #[test]
  fn test_black_frame_is_minus_one() {
    let tensor = BlobTensor::from_frame(&uniform_frame::<4>(0));
    assert_eq!(tensor.shape(), [1, 3, 4, 4]);
    assert_eq!(tensor.as_slice().len(), 3 * 4 * 4);
    assert!(tensor.as_slice().iter().all(|v| (v + 1.0).abs() < EPSILON));
  }

  #[test]
  fn test_rgb_frame_keeps_channel_planes() {
    let image = RgbImage::from_pixel(2, 2, Rgb([0, 255, 51]));
    let tensor = BlobTensor::<2>::from_frame(&SquareFrame::from_image(&image).unwrap());

    assert!(tensor.plane(0).iter().all(|v| (v + 1.0).abs() < EPSILON));
    assert!(tensor.plane(1).iter().all(|v| (v - 1.0).abs() < EPSILON));
    assert!(tensor.plane(2).iter().all(|v| (v + 0.6).abs() < EPSILON));
  }

  #[test]
  fn test_bgr_frame_is_swapped_to_rgb() {
    let frame = SquareFrame::<1>::from_bgr_raw(1, 1, vec![0, 51, 255]).unwrap();
    let tensor = BlobTensor::from_frame(&frame);

    // 平面 0 为 R，来自 BGR 像素的最后一个字节
    assert!((tensor.plane(0)[0] - 1.0).abs() < EPSILON);
    assert!((tensor.plane(1)[0] + 0.6).abs() < EPSILON);
    assert!((tensor.plane(2)[0] + 1.0).abs() < EPSILON);
  }

  #[test]
  fn test_nchw_layout_follows_pixel_position() {
    let image = RgbImage::from_fn(2, 2, |x, y| Rgb([(y * 2 + x) as u8 * 50, 0, 0]));
    let tensor = BlobTensor::<2>::from_frame(&SquareFrame::from_image(&image).unwrap());
    let params = BlobParams::default();

    for (idx, value) in tensor.plane(0).iter().enumerate() {
      assert!((value - params.normalize(idx as f32 * 50.0, 0)).abs() < EPSILON);
    }
  }

  #[test]
  fn test_byte_view_has_four_bytes_per_value() {
    let tensor = BlobTensor::from_frame(&uniform_frame::<3>(10));
    let bytes = tensor.to_ne_bytes();
    assert_eq!(bytes.len(), tensor.as_slice().len() * 4);
    assert_eq!(&bytes[..4], &tensor.as_slice()[0].to_ne_bytes());
  }
}
