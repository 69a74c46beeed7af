// 该文件是 Shanan （山南西风） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::SquareFrame, url_file_path};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemaMismatch { expected: &'static str, found: String },
  #[error("无法打开图片文件 {path}: {source}")]
  IoError {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("无法解码图片文件 {path}: {source}")]
  ImageLoadError {
    path: String,
    #[source]
    source: image::ImageError,
  },
  #[error("图片没有像素数据: {path} ({width}x{height})")]
  EmptyImage { path: String, width: u32, height: u32 },
}

/// 单张图片输入，只产生一帧
#[derive(Debug)]
pub struct ImageFileInput {
  path: String,
  image: Option<RgbImage>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    Self::open(url_file_path(url))
  }
}

impl ImageFileInput {
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref().display().to_string();
    info!("读取图片文件: {}", path);

    let image = ImageReader::open(&path)
      .map_err(|source| ImageFileInputError::IoError {
        path: path.clone(),
        source,
      })?
      .with_guessed_format()
      .map_err(|source| ImageFileInputError::IoError {
        path: path.clone(),
        source,
      })?
      .decode()
      .map_err(|source| ImageFileInputError::ImageLoadError {
        path: path.clone(),
        source,
      })?
      .to_rgb8();

    Self::with_image(path, image)
  }

  /// 使用已解码的图像，`name` 仅用于日志
  pub fn with_image(name: impl Into<String>, image: RgbImage) -> Result<Self, ImageFileInputError> {
    let path = name.into();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
      return Err(ImageFileInputError::EmptyImage {
        path,
        width,
        height,
      });
    }

    info!("图片尺寸: {}x{}", width, height);
    Ok(ImageFileInput {
      path,
      image: Some(image),
    })
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn dimensions(&self) -> Option<(u32, u32)> {
    self.image.as_ref().map(RgbImage::dimensions)
  }

  /// 按 N×N 信箱画布逐帧输出，N 为 0 时无法编译
  ///
  /// ```compile_fail
  /// use shanan_mmr::input::ImageFileInput;
  ///
  /// let input = ImageFileInput::with_image("car", image::RgbImage::new(2, 2)).unwrap();
  /// let _frames = input.into_letterbox::<0>();
  /// ```
  pub fn into_letterbox<const N: u32>(self) -> LetterboxFrames<N> {
    const { assert!(N > 0, "信箱画布边长必须大于 0") };
    LetterboxFrames { inner: self }
  }
}

#[derive(Debug)]
pub struct LetterboxFrames<const N: u32> {
  inner: ImageFileInput,
}

impl<const N: u32> Iterator for LetterboxFrames<N> {
  type Item = SquareFrame<N>;

  fn next(&mut self) -> Option<Self::Item> {
    let image = self.inner.image.take()?;
    match SquareFrame::from_image(&image) {
      Ok(frame) => Some(frame),
      Err(e) => {
        error!("图片 {} 信箱缩放失败: {}", self.inner.path, e);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  #[test]
  fn test_single_frame() {
    let image = RgbImage::from_pixel(8, 4, Rgb([200, 100, 50]));
    let input = ImageFileInput::with_image("memory", image).unwrap();
    assert_eq!(input.dimensions(), Some((8, 4)));

    let frames: Vec<SquareFrame<4>> = input.into_letterbox().collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].roi().height, 2);
    assert_eq!(frames[0].roi().y, 1);
  }

  #[test]
  fn test_extreme_aspect_on_smallest_canvas() {
    let input = ImageFileInput::with_image("line", RgbImage::new(1000, 1)).unwrap();
    let mut frames = input.into_letterbox::<1>();

    let frame = frames.next().unwrap();
    assert_eq!(frame.side(), 1);
    assert_eq!((frame.roi().width, frame.roi().height), (1, 1));
    assert!(frames.next().is_none());
  }

  #[test]
  fn test_input_debug_names_source() {
    let input = ImageFileInput::with_image("memory", RgbImage::new(2, 2)).unwrap();
    assert!(format!("{:?}", input).contains("memory"));
    let err = ImageFileInput::with_image("memory", RgbImage::new(0, 3)).unwrap_err();
    assert!(matches!(err, ImageFileInputError::EmptyImage { width: 0, height: 3, .. }));
  }

  #[test]
  fn test_empty_image_is_rejected() {
    let err = ImageFileInput::with_image("memory", RgbImage::new(0, 0)).unwrap_err();
    assert!(matches!(err, ImageFileInputError::EmptyImage { .. }));
  }

  #[test]
  fn test_missing_file() {
    let err = ImageFileInput::open("/nonexistent/car.jpg").unwrap_err();
    assert!(matches!(err, ImageFileInputError::IoError { .. }));
  }

  #[test]
  fn test_scheme_mismatch() {
    let url = Url::parse("video:///tmp/car.mp4").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch { expected: "image", .. })
    ));
  }

  #[test]
  fn test_open_from_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("car park.png");
    RgbImage::from_pixel(6, 3, Rgb([1, 2, 3])).save(&path).unwrap();

    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let input = ImageFileInput::from_url(&url).unwrap();
    assert_eq!(input.dimensions(), Some((6, 3)));
  }
}
