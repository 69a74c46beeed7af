// 该文件是 Shanan （山南西风） 项目的一部分。
// src/lib.rs - 库主文件
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

//! 车辆品牌/型号识别（Make/Model Recognition）流水线。
//!
//! 信箱缩放 → 张量构建 → 分类器推理 → Top-K 排序与标签解码。
//!
//! RKNN 上的 MobileNet 分类器位于 `model_mobilenet` 特性之后，依赖 Rockchip NPU 运行时，
//! 默认不启用。命令行程序需要显式开启：
//!
//! ```text
//! cargo build --release --features model_mobilenet
//! cargo run --features model_mobilenet -- car.jpg --labels labels.txt
//! ```

pub mod frame;
pub mod input;
pub mod label;
pub mod model;
pub mod output;
pub mod rank;
pub mod task;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}

/// 取出 URL 中的文件路径并做百分号解码
pub fn url_file_path(url: &url::Url) -> String {
  let path = url.path();
  match urlencoding::decode(path) {
    Ok(decoded) => decoded.into_owned(),
    Err(_) => path.to_string(),
  }
}
