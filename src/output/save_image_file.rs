// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/save_image_file.rs - 保存网络输入画布
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

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, frame::SquareFrame, model::Recognition, output::Render,
  url_file_path,
};

/// 将送入网络的信箱画布保存为图像文件
pub struct SaveImageFileOutput {
  path: String,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(SaveImageFileOutput {
      path: url_file_path(uri),
    })
  }
}

impl SaveImageFileOutput {
  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(SaveImageFileError::IoError)?;
    }

    image
      .save(&self.path)
      .map_err(SaveImageFileError::ImageError)?;

    info!("保存画布到文件: {}", self.path);

    Ok(())
  }
}

impl<const N: u32> Render<SquareFrame<N>, Recognition> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &SquareFrame<N>, _result: &Recognition) -> Result<(), Self::Error> {
    self.save_image(frame.to_rgb_image())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};
  use std::time::Duration;

  #[test]
  fn test_saves_canvas() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("canvas.png");
    let url = Url::parse(&format!("image://{}", path.display())).unwrap();
    let output = SaveImageFileOutput::from_url(&url).unwrap();

    let frame = SquareFrame::<8>::from_image(&RgbImage::from_pixel(8, 4, Rgb([255, 255, 255]))).unwrap();
    let result = Recognition {
      predictions: Box::new([]),
      inference_time: Duration::ZERO,
    };
    output.render_result(&frame, &result).unwrap();

    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (8, 8));
    assert_eq!(saved.get_pixel(0, 0), &Rgb([0, 0, 0]));
    assert_eq!(saved.get_pixel(4, 4), &Rgb([255, 255, 255]));
  }
}
