// 该文件是 Shanan （山南西风） 项目的一部分。
// src/bin/benchmark_repeatshot.rs - 重复推理基准测试
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use shanan_mmr::{
  FromUrl,
  input::ImageFileInput,
  label::LabelTable,
  model::{MOBILENET_INPUT_SIZE, MakeModelRecognizer, MobileNet, MobileNetBuilder},
  output::Outputs,
  task::{RepeatShotTask, Task},
};
use tracing::info;

/// Shanan 车型识别基准测试参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// RKNN 模型，例如 mobilenet:///path/to/model.rknn
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入图片，例如 image:///path/to/car.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 标签文件路径
  #[arg(long, value_name = "FILE", default_value = "labels.txt")]
  pub labels: PathBuf,
  /// 输出路径，可重复指定；默认不输出
  #[arg(long, value_name = "OUTPUT")]
  pub output: Vec<Url>,
  /// 重复推理次数
  #[arg(long, value_name = "COUNT", default_value_t = 1000)]
  pub repeat: usize,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.model);
  info!("输入来源: {}", args.input);
  info!("重复次数: {}", args.repeat);

  let input_image = ImageFileInput::from_url(&args.input)?;
  let classifier: MobileNet<MOBILENET_INPUT_SIZE> = MobileNetBuilder::from_url(&args.model)?.build()?;
  let labels = LabelTable::from_path(&args.labels)?;
  let output = Outputs::from_urls(&args.output)?;

  let model = MakeModelRecognizer::<_, MOBILENET_INPUT_SIZE>::new(classifier, &labels);
  RepeatShotTask::default()
    .with_repeat(args.repeat)
    .run_task(input_image.into_letterbox::<MOBILENET_INPUT_SIZE>(), model, output)?;

  Ok(())
}
