// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model/mobilenet.rs - 基于 RKNN 的 MobileNet 车型分类器
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

use rknpu::{Context, InitFlags, TensorFormat, TensorType};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::BlobTensor,
  model::{Classifier, MOBILENET_INPUT_NAME, MOBILENET_OUTPUT_NAME, Probabilities},
  url_file_path,
};

const MOBILENET_NUM_INPUTS: u32 = 1;
const MOBILENET_NUM_OUTPUTS: u32 = 1;

pub struct MobileNet<const N: u32> {
  context: Context,
}

#[derive(Error, Debug)]
pub enum MobileNetError {
  #[error("模型加载错误: {path}: {source}")]
  ModelLoadError {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("模型无效: {0}, 错误: {1}")]
  ModelInvalid(String, rknpu::Error),
  #[error("RKNN 错误: {0}")]
  RknnError(#[from] rknpu::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型输出读取错误: {0}")]
  OutputError(String),
}

impl MobileNetError {
  pub fn invalid(msg: &str, e: rknpu::Error) -> Self {
    MobileNetError::ModelInvalid(msg.to_string(), e)
  }
}

pub struct MobileNetBuilder {
  model_path: String,
  flags: InitFlags,
}

impl FromUrlWithScheme for MobileNetBuilder {
  const SCHEME: &'static str = "mobilenet";
}

impl FromUrl for MobileNetBuilder {
  type Error = MobileNetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(MobileNetError::ModelPathError(format!(
        "模型路径必须使用 {} 方案",
        Self::SCHEME
      )));
    }

    Ok(Self::from_path(url_file_path(url)))
  }
}

impl MobileNetBuilder {
  pub fn from_path(path: impl AsRef<Path>) -> Self {
    MobileNetBuilder {
      model_path: path.as_ref().display().to_string(),
      flags: InitFlags::default(),
    }
  }

  pub fn flags(mut self, flags: InitFlags) -> Self {
    self.flags = flags;
    self
  }

  pub fn build<const N: u32>(self) -> Result<MobileNet<N>, MobileNetError> {
    info!("加载模型文件: {}", self.model_path);
    let model_data =
      std::fs::read(&self.model_path).map_err(|source| MobileNetError::ModelLoadError {
        path: self.model_path.clone(),
        source,
      })?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 RKNN 推理上下文");
    let context = Context::new(&model_data, self.flags)?;

    match context.sdk_version() {
      Ok(version) => {
        if let Ok(api_ver) = version.api_version() {
          debug!("模型 API 版本: {}", api_ver);
        }
        if let Ok(drv_ver) = version.driver_version() {
          debug!("模型驱动版本: {}", drv_ver);
        }
      }
      Err(e) => {
        error!("查询 SDK 版本失败: {}", e);
        return Err(MobileNetError::invalid("无法查询 SDK 版本", e));
      }
    }

    let num_inputs = context
      .num_inputs()
      .map_err(|e| MobileNetError::invalid("无法获取输入数量", e))?;
    let num_outputs = context
      .num_outputs()
      .map_err(|e| MobileNetError::invalid("无法获取输出数量", e))?;

    for (kind, expected, actual) in [
      ("输入", MOBILENET_NUM_INPUTS, num_inputs),
      ("输出", MOBILENET_NUM_OUTPUTS, num_outputs),
    ] {
      if expected != actual {
        let msg = format!("预期模型{}数量为 {}, 实际为 {}", kind, expected, actual);
        error!("{}", msg);
        return Err(MobileNetError::invalid(&msg, rknpu::Error::InvalidModel));
      }
    }

    info!(
      "模型加载完成: 输入 {} ({}x{}x3), 输出 {}",
      MOBILENET_INPUT_NAME, N, N, MOBILENET_OUTPUT_NAME
    );
    Ok(MobileNet { context })
  }
}

impl<const N: u32> Classifier<N> for MobileNet<N> {
  type Error = MobileNetError;

  fn predict(&self, tensor: &BlobTensor<N>) -> Result<Probabilities, Self::Error> {
    debug!("设置模型输入 {}: {:?}", MOBILENET_INPUT_NAME, tensor.shape());
    let input = tensor.to_ne_bytes();
    self
      .context
      .set_input(0, &input, TensorFormat::NCHW, TensorType::Float32)?;

    debug!("执行模型推理");
    self.context.run()?;

    debug!("获取模型输出 {}", MOBILENET_OUTPUT_NAME);
    let output = self.context.get_outputs()?;
    let scores = output
      .get_f32(0)
      .map_err(|e| MobileNetError::OutputError(e.to_string()))?
      .to_vec();

    Ok(Probabilities::from(scores))
  }
}
