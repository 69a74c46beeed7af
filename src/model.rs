// 该文件是 Shanan （山南西风） 项目的一部分。
// src/model.rs - 模型
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

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::{
  frame::{BlobTensor, SquareFrame},
  label::LabelTable,
  rank::{DEFAULT_TOP_K, Prediction, RankError, top_k},
};

/// MobileNet 车型分类模型的输入边长
pub const MOBILENET_INPUT_SIZE: u32 = 224;
/// 模型输入张量名称
pub const MOBILENET_INPUT_NAME: &str = "input_1";
/// 模型输出张量名称
pub const MOBILENET_OUTPUT_NAME: &str = "softmax/Softmax";

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 不透明的分类网络：输入张量，输出每个类别的概率
pub trait Classifier<const N: u32> {
  type Error;

  fn predict(&self, tensor: &BlobTensor<N>) -> Result<Probabilities, Self::Error>;
}

impl<const N: u32, C: Classifier<N>> Classifier<N> for &C {
  type Error = C::Error;

  fn predict(&self, tensor: &BlobTensor<N>) -> Result<Probabilities, Self::Error> {
    (**self).predict(tensor)
  }
}

/// 一次推理得到的概率向量，下标与标签表对应
#[derive(Debug, Clone, PartialEq)]
pub struct Probabilities {
  scores: Box<[f32]>,
}

impl Probabilities {
  pub fn as_slice(&self) -> &[f32] {
    &self.scores
  }

  pub fn len(&self) -> usize {
    self.scores.len()
  }

  pub fn is_empty(&self) -> bool {
    self.scores.is_empty()
  }
}

impl From<Vec<f32>> for Probabilities {
  fn from(scores: Vec<f32>) -> Self {
    Self {
      scores: scores.into_boxed_slice(),
    }
  }
}

impl From<Box<[f32]>> for Probabilities {
  fn from(scores: Box<[f32]>) -> Self {
    Self { scores }
  }
}

#[derive(Debug, Clone)]
pub struct Recognition {
  pub predictions: Box<[Prediction]>,
  /// 仅包含分类器前向推理的耗时
  pub inference_time: Duration,
}

impl Recognition {
  pub fn best(&self) -> Option<&Prediction> {
    self.predictions.first()
  }

  pub fn is_empty(&self) -> bool {
    self.predictions.is_empty()
  }
}

#[derive(Error, Debug)]
pub enum RecognizeError<E> {
  #[error("分类器推理错误: {0}")]
  Classifier(#[source] E),
  #[error("结果排序错误: {0}")]
  Rank(#[from] RankError),
}

/// 车型识别流水线：画布 → 张量 → 分类器 → Top-K
pub struct MakeModelRecognizer<'a, C, const N: u32> {
  classifier: C,
  labels: &'a LabelTable,
  top_k: usize,
}

impl<'a, C: Classifier<N>, const N: u32> MakeModelRecognizer<'a, C, N> {
  pub fn new(classifier: C, labels: &'a LabelTable) -> Self {
    Self {
      classifier,
      labels,
      top_k: DEFAULT_TOP_K,
    }
  }

  pub fn with_top_k(mut self, top_k: usize) -> Self {
    self.top_k = top_k;
    self
  }

  pub fn labels(&self) -> &LabelTable {
    self.labels
  }
}

impl<C: Classifier<N>, const N: u32> Model for MakeModelRecognizer<'_, C, N> {
  type Input = SquareFrame<N>;
  type Output = Recognition;
  type Error = RecognizeError<C::Error>;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let tensor = BlobTensor::from_frame(input);
    debug!("输入张量形状: {:?}", tensor.shape());

    let now = Instant::now();
    let probabilities = self
      .classifier
      .predict(&tensor)
      .map_err(RecognizeError::Classifier)?;
    let inference_time = now.elapsed();
    debug!(
      "分类器输出 {} 个类别，耗时: {:.2?}",
      probabilities.len(),
      inference_time
    );

    let predictions = top_k(probabilities.as_slice(), self.labels, self.top_k)?;

    Ok(Recognition {
      predictions: predictions.into_boxed_slice(),
      inference_time,
    })
  }
}

#[cfg(feature = "model_mobilenet")]
mod mobilenet;
#[cfg(feature = "model_mobilenet")]
pub use self::mobilenet::{MobileNet, MobileNetBuilder, MobileNetError};
