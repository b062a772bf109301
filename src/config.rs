//! Loading game configuration (tip prompts + scoring curve) from TOML.
//!
//! See `GameConfig`, `Prompts` and `Scoring` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub scoring: Scoring,
}

/// Prompts used by the OpenAI tip helper. Defaults keep the friendly
/// "math sensei" tone; override them in TOML to tune it.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  pub tip_system: String,
  pub tip_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      tip_system: "You are a friendly math sensei. Your goal is to provide concise, 1-sentence mental math tips.".into(),
      tip_user_template: "The student is playing a math game. They were asked \"{question}\" and answered \"{wrong_answer}\". Provide a one-sentence, encouraging tip or mental math trick to help them solve it correctly next time. Be brief and supportive.".into(),
    }
  }
}

/// Scoring curve applied by sessions. The level derived from the score is
/// what scales operand magnitude in the engine.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Scoring {
  #[serde(default = "default_score_per_level")]
  pub score_per_level: u32,
  #[serde(default = "default_base_points")]
  pub base_points: u32,
  #[serde(default = "default_streak_bonus_every")]
  pub streak_bonus_every: u32,
  #[serde(default = "default_streak_bonus_points")]
  pub streak_bonus_points: u32,
}

fn default_score_per_level() -> u32 { 150 }
fn default_base_points() -> u32 { 10 }
fn default_streak_bonus_every() -> u32 { 5 }
fn default_streak_bonus_points() -> u32 { 5 }

impl Default for Scoring {
  fn default() -> Self {
    Self {
      score_per_level: default_score_per_level(),
      base_points: default_base_points(),
      streak_bonus_every: default_streak_bonus_every(),
      streak_bonus_points: default_streak_bonus_points(),
    }
  }
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to defaults.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "math_pulse_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "math_pulse_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "math_pulse_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_sensible() {
    let cfg = GameConfig::default();
    assert_eq!(cfg.scoring.score_per_level, 150);
    assert_eq!(cfg.scoring.base_points, 10);
    assert!(cfg.prompts.tip_user_template.contains("{question}"));
    assert!(cfg.prompts.tip_user_template.contains("{wrong_answer}"));
  }

  #[test]
  fn partial_toml_overrides_merge_with_defaults() {
    let cfg: GameConfig = toml::from_str(
      r#"
      [scoring]
      score_per_level = 200

      [prompts]
      tip_system = "Be terse."
      tip_user_template = "Q: {question} A: {wrong_answer}"
      "#,
    )
    .unwrap();
    assert_eq!(cfg.scoring.score_per_level, 200);
    assert_eq!(cfg.scoring.base_points, 10);
    assert_eq!(cfg.prompts.tip_system, "Be terse.");
  }
}
