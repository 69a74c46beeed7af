// 该文件是 Shanan （山南西风） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::{Parser, builder::RangedU64ValueParser};
use shanan_mmr::rank::DEFAULT_TOP_K;
use url::Url;

const DEFAULT_IMAGE: &str = "car.jpg";
const DEFAULT_MODEL: &str = "model-weights-spectrico-mmr-mobilenet-224x224-908A6A8C.rknn";
const DEFAULT_LABELS: &str = "labels.txt";

/// 车辆品牌/型号识别
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片路径
  #[arg(value_name = "IMAGE", default_value = DEFAULT_IMAGE)]
  pub image: PathBuf,

  /// RKNN 模型文件路径
  #[arg(long, value_name = "FILE", default_value = DEFAULT_MODEL)]
  pub model: PathBuf,

  /// 标签文件路径，每行 `品牌<TAB>型号`
  #[arg(long, value_name = "FILE", default_value = DEFAULT_LABELS)]
  pub labels: PathBuf,

  /// 输出的候选数量，至少为 1
  #[arg(
    long,
    value_name = "K",
    default_value_t = DEFAULT_TOP_K,
    value_parser = RangedU64ValueParser::<usize>::new().range(1..)
  )]
  pub top_k: usize,

  /// 输出目标，可重复指定
  /// 支持:
  /// - console:
  /// - image:///path/to/canvas.png
  /// - folder:///path/to/records?always
  #[arg(long, value_name = "OUTPUT", default_value = "console:")]
  pub output: Vec<Url>,
}
