//! Domain models used by the backend: difficulty tiers, presentation modes,
//! operators, and the problem value object produced by the engine.

use serde::{Deserialize, Serialize};

/// Preset tier controlling operand magnitude and the available operator set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  /// Operand range and allowed operators for this tier.
  pub fn preset(self) -> Preset {
    match self {
      Difficulty::Easy => Preset { min: 1, max: 12, ops: &[Op::Add, Op::Sub] },
      Difficulty::Medium => Preset { min: 10, max: 30, ops: &[Op::Add, Op::Sub, Op::Mul] },
      Difficulty::Hard => Preset { min: 20, max: 100, ops: &[Op::Add, Op::Sub, Op::Mul, Op::Div] },
    }
  }
}

/// Operand range plus operator set for one difficulty tier.
#[derive(Clone, Copy, Debug)]
pub struct Preset {
  pub min: i64,
  pub max: i64,
  pub ops: &'static [Op],
}

/// Presentation/answer-format variant of a problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
  Classic,
  Choice,
  Comparison,
  Sequence,
  MissingOp,
  TrueFalse,
  MonsterMunch,
}

impl Mode {
  pub const ALL: [Mode; 7] = [
    Mode::Classic,
    Mode::Choice,
    Mode::Comparison,
    Mode::Sequence,
    Mode::MissingOp,
    Mode::TrueFalse,
    Mode::MonsterMunch,
  ];
}

/// Arithmetic operator. Serializes as the ASCII form the frontend already
/// understands; `symbol()` is the display form shown inside questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
  #[serde(rename = "+")]
  Add,
  #[serde(rename = "-")]
  Sub,
  #[serde(rename = "*")]
  Mul,
  #[serde(rename = "/")]
  Div,
}

impl Op {
  /// Display symbol: multiply/divide render as `×`/`÷`.
  pub fn symbol(self) -> &'static str {
    match self {
      Op::Add => "+",
      Op::Sub => "-",
      Op::Mul => "×",
      Op::Div => "÷",
    }
  }
}

/// A candidate or correct answer: numeric for arithmetic results, symbolic
/// for YES/NO, comparator, and operator answers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
  Number(i64),
  Symbol(String),
}

impl AnswerValue {
  /// Normalized form used for answer comparison: string-coerce, trim,
  /// uppercase. The submitted answer goes through the same normalization, so
  /// a typed "7" matches the numeric option 7 and "yes" matches "YES".
  pub fn normalized(&self) -> String {
    match self {
      AnswerValue::Number(n) => n.to_string(),
      AnswerValue::Symbol(s) => s.trim().to_uppercase(),
    }
  }
}

impl From<i64> for AnswerValue {
  fn from(n: i64) -> Self {
    AnswerValue::Number(n)
  }
}

impl From<&str> for AnswerValue {
  fn from(s: &str) -> Self {
    AnswerValue::Symbol(s.to_string())
  }
}

/// Problem produced by the engine. Immutable once created; removed from the
/// store as soon as the player answers it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Problem {
  pub id: String,
  pub question: String,
  pub answer: AnswerValue,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub options: Option<Vec<AnswerValue>>,
  pub operator: Op,
  pub difficulty: Difficulty,
  pub mode: Mode,
  #[serde(rename = "funnyObject", skip_serializing_if = "Option::is_none")]
  pub funny_object: Option<&'static str>,
}
