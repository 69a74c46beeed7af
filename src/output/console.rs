// 该文件是 Shanan （山南西风） 项目的一部分。
// src/output/console.rs - 控制台输出
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

use std::io::Write;

use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::SquareFrame,
  model::Recognition,
  output::{OutputError, Render},
  rank::format_general,
};

/// 将推理耗时与 Top-K 结果打印到标准输出
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl FromUrlWithScheme for ConsoleOutput {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(ConsoleOutput)
  }
}

impl ConsoleOutput {
  pub fn write_result<W: Write>(&self, writer: &mut W, result: &Recognition) -> std::io::Result<()> {
    writeln!(
      writer,
      "Inference time, ms: {}",
      format_general(result.inference_time.as_secs_f64() * 1000.0)
    )?;
    writeln!(writer, "Top {} probabilities: ", result.predictions.len())?;
    for prediction in result.predictions.iter() {
      writeln!(writer, "{}", prediction)?;
    }
    Ok(())
  }
}

impl<const N: u32> Render<SquareFrame<N>, Recognition> for ConsoleOutput {
  type Error = std::io::Error;

  fn render_result(&self, _frame: &SquareFrame<N>, result: &Recognition) -> Result<(), Self::Error> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    self.write_result(&mut lock, result)?;
    lock.flush()
  }
}
