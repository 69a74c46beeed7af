// 该文件是 Shanan （山南西风） 项目的一部分。
// src/rank.rs - 概率向量排序与标签解码
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

use std::{cmp::Ordering, fmt};

use thiserror::Error;
use tracing::debug;

use crate::label::LabelTable;

pub const DEFAULT_TOP_K: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankError {
  #[error("概率向量长度 {scores} 与标签数量 {labels} 不一致")]
  LengthMismatch { scores: usize, labels: usize },
  #[error("top-k 至少为 1")]
  InvalidK,
}

/// 一个识别结果
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
  pub class_id: usize,
  pub make: String,
  pub model: String,
  pub confidence_percent: f32,
}

impl fmt::Display for Prediction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "make: {}\tmodel: {}\tconfidence: {} %",
      self.make,
      self.model,
      format_general(self.confidence_percent as f64)
    )
  }
}

const GENERAL_PRECISION: i32 = 6;

/// 按 6 位有效数字输出并去掉末尾的 0，与 `printf("%g")` 一致
pub fn format_general(value: f64) -> String {
  if value.is_nan() {
    return "nan".to_string();
  }
  if value.is_infinite() {
    return if value > 0.0 { "inf" } else { "-inf" }.to_string();
  }
  if value == 0.0 {
    return "0".to_string();
  }

  // 先按有效数字舍入，再决定用定点还是指数形式
  let scientific = format!("{:.*e}", (GENERAL_PRECISION - 1) as usize, value);
  let Some((mantissa, exponent)) = scientific.split_once('e') else {
    return scientific;
  };
  let exponent: i32 = exponent.parse().unwrap_or(0);

  if exponent < -4 || exponent >= GENERAL_PRECISION {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!(
      "{}e{}{:02}",
      trim_fraction(mantissa),
      sign,
      exponent.unsigned_abs()
    )
  } else {
    let decimals = (GENERAL_PRECISION - 1 - exponent) as usize;
    trim_fraction(&format!("{:.*}", decimals, value)).to_string()
  }
}

fn trim_fraction(number: &str) -> &str {
  if number.contains('.') {
    number.trim_end_matches('0').trim_end_matches('.')
  } else {
    number
  }
}

// NaN 排在最后
fn rank_key(score: f32) -> f32 {
  if score.is_nan() {
    f32::NEG_INFINITY
  } else {
    score
  }
}

/// 按分数降序排列的类别索引，分数相同时保持原索引升序
pub fn rank_indices(scores: &[f32]) -> Vec<usize> {
  let mut indices: Vec<usize> = (0..scores.len()).collect();
  indices.sort_by(|&a, &b| {
    rank_key(scores[b])
      .partial_cmp(&rank_key(scores[a]))
      .unwrap_or(Ordering::Equal)
  });
  indices
}

/// 取分数最高的 k 个类别并解码为品牌/型号
///
/// k 大于类别数时返回全部类别。
pub fn top_k(scores: &[f32], labels: &LabelTable, k: usize) -> Result<Vec<Prediction>, RankError> {
  if scores.len() != labels.len() {
    return Err(RankError::LengthMismatch {
      scores: scores.len(),
      labels: labels.len(),
    });
  }
  if k == 0 {
    return Err(RankError::InvalidK);
  }

  let predictions: Vec<Prediction> = rank_indices(scores)
    .into_iter()
    .take(k)
    .filter_map(|class_id| {
      labels.get(class_id).map(|entry| Prediction {
        class_id,
        make: entry.make().to_string(),
        model: entry.model().to_string(),
        confidence_percent: scores[class_id] * 100.0,
      })
    })
    .collect();

  debug!("Top-{} 结果: {:?}", k, predictions);
  Ok(predictions)
}
