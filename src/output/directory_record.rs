// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::{
  path::PathBuf,
  sync::atomic::{AtomicU16, Ordering},
};

use chrono::{Datelike, Utc};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme, frame::SquareFrame, model::Recognition, output::Render,
  url_file_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 按日期分目录保存画布与 JSON 识别记录
///
/// `folder:///path/to/dir` 写入 `dir/YYYY/MM/DD/HH-MM-SS-XXXX.{png,json}`；
/// 查询参数 `always` 表示结果为空时也记录，`canvas=false` 表示不保存画布。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  frame_counter: AtomicU16,
  always: bool,
  save_canvas: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let always = uri.query_pairs().any(|(k, _)| k == "always");
    let save_canvas = !uri
      .query_pairs()
      .any(|(k, v)| k == "canvas" && (v == "false" || v == "0"));

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(url_file_path(uri)),
      frame_counter: AtomicU16::new(0),
      always,
      save_canvas,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  fn frame_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      debug!("创建记录目录: {}", directory.display());
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  fn record(&self, path: &std::path::Path, result: &Recognition) -> Result<(), DirectoryRecordOutputError> {
    let predictions: Vec<_> = result
      .predictions
      .iter()
      .map(|p| {
        json!({
          "class_id": p.class_id,
          "make": p.make,
          "model": p.model,
          "confidence": p.confidence_percent,
        })
      })
      .collect();

    let record = json!({
      "timestamp": Utc::now().to_rfc3339(),
      "inference_ms": result.inference_time.as_secs_f64() * 1000.0,
      "predictions": predictions,
    });

    std::fs::write(path.with_extension("json"), serde_json::to_string_pretty(&record)?)?;
    Ok(())
  }
}

impl<const N: u32> Render<SquareFrame<N>, Recognition> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &SquareFrame<N>, result: &Recognition) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      return Ok(());
    }

    let path = self.frame_path()?;
    if self.save_canvas {
      frame.to_rgb_image().save(&path)?;
    }
    self.record(&path, result)?;
    info!("记录识别结果: {}", path.with_extension("json").display());
    Ok(())
  }
}
