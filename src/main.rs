// 该文件是 Shanan （山南西风） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shanan_mmr::{
  input::ImageFileInput,
  label::LabelTable,
  model::{MOBILENET_INPUT_SIZE, MakeModelRecognizer, MobileNet, MobileNetBuilder},
  output::Outputs,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型文件路径: {}", args.model.display());
  info!("标签文件路径: {}", args.labels.display());
  info!("输入图片: {}", args.image.display());

  let classifier: MobileNet<MOBILENET_INPUT_SIZE> = MobileNetBuilder::from_path(&args.model)
    .build()
    .with_context(|| format!("无法加载模型: {}", args.model.display()))?;
  let labels = LabelTable::from_path(&args.labels)?;
  let input = ImageFileInput::open(&args.image)?;
  let outputs = Outputs::from_urls(&args.output)?;

  let model =
    MakeModelRecognizer::<_, MOBILENET_INPUT_SIZE>::new(classifier, &labels).with_top_k(args.top_k);
  OneShotTask.run_task(input.into_letterbox::<MOBILENET_INPUT_SIZE>(), model, outputs)?;

  Ok(())
}
