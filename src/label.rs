// 该文件是 Shanan （山南西风） 项目的一部分。
// src/label.rs - 品牌/型号标签表
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
  fmt,
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("无法读取标签文件 {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },
  #[error("标签文件中没有任何类别: {0}")]
  Empty(String),
}

/// 一个类别：品牌与型号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
  make: String,
  model: String,
}

impl LabelEntry {
  pub fn new(make: impl Into<String>, model: impl Into<String>) -> Self {
    Self {
      make: make.into(),
      model: model.into(),
    }
  }

  /// 解析 `品牌<TAB>型号`，只按第一个制表符切分；没有制表符时整行作为品牌
  pub fn parse(line: &str) -> Self {
    match line.split_once('\t') {
      Some((make, model)) => Self::new(make, model),
      None => Self::new(line, ""),
    }
  }

  pub fn make(&self) -> &str {
    &self.make
  }

  pub fn model(&self) -> &str {
    &self.model
  }
}

impl fmt::Display for LabelEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.model.is_empty() {
      write!(f, "{}", self.make)
    } else {
      write!(f, "{} {}", self.make, self.model)
    }
  }
}

/// 只读标签表，行号即类别索引
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
  entries: Box<[LabelEntry]>,
}

impl LabelTable {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LabelError> {
    let path = path.as_ref();
    info!("加载标签文件: {}", path.display());
    let file = File::open(path).map_err(|source| LabelError::Io {
      path: path.display().to_string(),
      source,
    })?;

    let table = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
    info!("标签加载完成，共 {} 个类别", table.len());
    Ok(table)
  }

  /// `name` 仅用于错误信息与日志
  pub fn from_reader<R: BufRead>(reader: R, name: &str) -> Result<Self, LabelError> {
    let mut entries = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
      let line = line.map_err(|source| LabelError::Io {
        path: name.to_string(),
        source,
      })?;
      if let Some(entry) = parse_line(line_no, &line) {
        entries.push(entry);
      }
    }

    if entries.is_empty() {
      return Err(LabelError::Empty(name.to_string()));
    }

    Ok(Self {
      entries: entries.into_boxed_slice(),
    })
  }

  /// 从内存中的文本行构建，空行同样被跳过
  pub fn from_lines<I, S>(lines: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    lines
      .into_iter()
      .enumerate()
      .filter_map(|(line_no, line)| parse_line(line_no, line.as_ref()))
      .collect()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, class_id: usize) -> Option<&LabelEntry> {
    self.entries.get(class_id)
  }

  pub fn iter(&self) -> impl Iterator<Item = &LabelEntry> {
    self.entries.iter()
  }
}

impl FromIterator<LabelEntry> for LabelTable {
  fn from_iter<T: IntoIterator<Item = LabelEntry>>(iter: T) -> Self {
    Self {
      entries: iter.into_iter().collect(),
    }
  }
}

fn parse_line(line_no: usize, line: &str) -> Option<LabelEntry> {
  let line = line.strip_suffix('\r').unwrap_or(line);
  if line.is_empty() {
    debug!("跳过第 {} 行空行", line_no + 1);
    return None;
  }

  if !line.contains('\t') {
    warn!("第 {} 行缺少制表符，整行作为品牌: {}", line_no + 1, line);
  }
  Some(LabelEntry::parse(line))
}
