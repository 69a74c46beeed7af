// 该文件是 Shanan （山南西风） 项目的一部分。
// tests/pipeline.rs - 完整识别流水线测试
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

use std::{cell::RefCell, convert::Infallible};

use image::{Rgb, RgbImage};
use thiserror::Error;

use shanan_mmr::{
  frame::{BlobTensor, SquareFrame},
  input::ImageFileInput,
  label::LabelTable,
  model::{Classifier, MakeModelRecognizer, Model, Probabilities, Recognition, RecognizeError},
  output::Render,
  rank::RankError,
  task::{OneShotTask, RepeatShotTask, Task},
};

const SIDE: u32 = 16;

/// 返回固定概率向量，并记录收到的张量
struct FixedClassifier {
  scores: Vec<f32>,
  seen: RefCell<Vec<BlobTensor<SIDE>>>,
}

impl FixedClassifier {
  fn new(scores: &[f32]) -> Self {
    Self {
      scores: scores.to_vec(),
      seen: RefCell::new(Vec::new()),
    }
  }
}

impl Classifier<SIDE> for FixedClassifier {
  type Error = Infallible;

  fn predict(&self, tensor: &BlobTensor<SIDE>) -> Result<Probabilities, Self::Error> {
    self.seen.borrow_mut().push(tensor.clone());
    Ok(Probabilities::from(self.scores.clone()))
  }
}

#[derive(Error, Debug)]
#[error("NPU 不可用")]
struct Unavailable;

struct BrokenClassifier;

impl Classifier<SIDE> for BrokenClassifier {
  type Error = Unavailable;

  fn predict(&self, _tensor: &BlobTensor<SIDE>) -> Result<Probabilities, Self::Error> {
    Err(Unavailable)
  }
}

/// 收集渲染结果
#[derive(Default)]
struct Collect {
  results: RefCell<Vec<Recognition>>,
}

impl Render<SquareFrame<SIDE>, Recognition> for &Collect {
  type Error = Infallible;

  fn render_result(&self, _frame: &SquareFrame<SIDE>, result: &Recognition) -> Result<(), Self::Error> {
    self.results.borrow_mut().push(result.clone());
    Ok(())
  }
}

fn cars() -> LabelTable {
  LabelTable::from_lines(["Toyota\tCorolla", "Honda\tCivic", "Ford\tFocus"])
}

fn wide_car() -> RgbImage {
  RgbImage::from_pixel(64, 32, Rgb([255, 255, 255]))
}

#[test]
fn test_recognizer_ranks_stub_output() {
  let labels = cars();
  let classifier = FixedClassifier::new(&[0.1, 0.7, 0.2]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels).with_top_k(2);

  let frame = SquareFrame::<SIDE>::from_image(&wide_car()).unwrap();
  let result = model.infer(&frame).unwrap();

  let names: Vec<_> = result
    .predictions
    .iter()
    .map(|p| (p.make.as_str(), p.model.as_str()))
    .collect();
  assert_eq!(names, vec![("Honda", "Civic"), ("Ford", "Focus")]);
  assert!((result.best().unwrap().confidence_percent - 70.0).abs() < 1e-4);
}

#[test]
fn test_classifier_sees_letterboxed_tensor() {
  let labels = cars();
  let classifier = FixedClassifier::new(&[0.1, 0.7, 0.2]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels);

  let frame = SquareFrame::<SIDE>::from_image(&wide_car()).unwrap();
  model.infer(&frame).unwrap();

  let seen = classifier.seen.borrow();
  assert_eq!(seen.len(), 1);
  let tensor = &seen[0];
  assert_eq!(tensor.shape(), [1, 3, SIDE as usize, SIDE as usize]);

  // 64x32 -> 16x8，上下各填充 4 行黑色 (-1.0)，中间为白色 (1.0)
  let red = tensor.plane(0);
  let row = |y: usize| &red[y * SIDE as usize..(y + 1) * SIDE as usize];
  assert!(row(0).iter().all(|v| (v + 1.0).abs() < 1e-5));
  assert!(row(3).iter().all(|v| (v + 1.0).abs() < 1e-5));
  assert!(row(8).iter().all(|v| (v - 1.0).abs() < 1e-5));
  assert!(row(15).iter().all(|v| (v + 1.0).abs() < 1e-5));
}

#[test]
fn test_mismatched_label_table_fails() {
  let labels = LabelTable::from_lines(["Toyota\tCorolla", "Honda\tCivic"]);
  let classifier = FixedClassifier::new(&[0.1, 0.7, 0.2]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels);

  let frame = SquareFrame::<SIDE>::from_image(&wide_car()).unwrap();
  let err = model.infer(&frame).unwrap_err();
  assert!(matches!(
    err,
    RecognizeError::Rank(RankError::LengthMismatch {
      scores: 3,
      labels: 2
    })
  ));
}

#[test]
fn test_classifier_error_is_propagated() {
  let labels = cars();
  let model = MakeModelRecognizer::<_, SIDE>::new(BrokenClassifier, &labels);

  let frame = SquareFrame::<SIDE>::from_image(&wide_car()).unwrap();
  let err = model.infer(&frame).unwrap_err();
  assert!(matches!(err, RecognizeError::Classifier(Unavailable)));
  assert_eq!(err.to_string(), "分类器推理错误: NPU 不可用");
}

#[test]
fn test_one_shot_task_renders_once() {
  let labels = cars();
  let classifier = FixedClassifier::new(&[0.6, 0.3, 0.1]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels).with_top_k(10);
  let input = ImageFileInput::with_image("memory", wide_car()).unwrap();
  let collect = Collect::default();

  OneShotTask
    .run_task(input.into_letterbox::<SIDE>(), model, &collect)
    .unwrap();

  let results = collect.results.borrow();
  assert_eq!(results.len(), 1);
  let makes: Vec<_> = results[0].predictions.iter().map(|p| p.make.as_str()).collect();
  assert_eq!(makes, vec!["Toyota", "Honda", "Ford"]);
}

#[test]
fn test_one_shot_task_without_frames_fails() {
  let labels = cars();
  let classifier = FixedClassifier::new(&[0.6, 0.3, 0.1]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels);
  let collect = Collect::default();

  let result = OneShotTask.run_task(std::iter::empty::<SquareFrame<SIDE>>(), model, &collect);
  assert!(result.is_err());
  assert!(collect.results.borrow().is_empty());
}

#[test]
fn test_repeat_shot_task_reuses_label_table() {
  let labels = cars();
  let classifier = FixedClassifier::new(&[0.2, 0.2, 0.6]);
  let model = MakeModelRecognizer::<_, SIDE>::new(&classifier, &labels).with_top_k(1);
  let input = ImageFileInput::with_image("memory", wide_car()).unwrap();
  let collect = Collect::default();

  RepeatShotTask::default()
    .with_repeat(4)
    .with_interrupt(false)
    .run_task(input.into_letterbox::<SIDE>(), model, &collect)
    .unwrap();

  let results = collect.results.borrow();
  assert_eq!(results.len(), 4);
  assert!(results.iter().all(|r| r.best().map(|p| p.make.as_str()) == Some("Ford")));
  assert_eq!(classifier.seen.borrow().len(), 4);
}
