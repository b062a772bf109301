//! Built-in game content: decorative emoji, mascot phrases, static tip
//! fallbacks, and the accuracy reward table.

/// Silly objects sprinkled next to numerals for visual humor.
pub const SILLY_OBJECTS: &[&str] = &[
  "🍕", "💩", "🍌", "🍦", "🍩", "🍔", "🦄", "🦖", "🎈", "🤡", "🦆", "🦷", "👣",
];

/// Mascot cheer lines for a correct answer.
pub const CHEERS: &[&str] = &[
  "Yippee! 🌈",
  "Star! ⭐",
  "Magic! 🪄",
  "Boom! 💥",
  "Wow! 🐯",
  "Silly Goose! 🦆",
  "Burp! 🫢",
];

/// Mascot lines for a wrong answer.
pub const FUNNY_FAILS: &[&str] = &[
  "Whoopsie! 💩",
  "Wait, what? 🤡",
  "Almost had it! 🦖",
  "Monkey brains! 🐒",
];

/// Shown when the model replies with an empty string.
pub const TIP_EMPTY_FALLBACK: &str = "Keep practicing! You'll get it next time.";

/// Shown when the tip call fails or OpenAI is not configured. The player
/// never sees an error.
pub const TIP_ERROR_FALLBACK: &str = "Focus on the basics and keep trying!";

/// Reward tier (name, badge) for an accuracy percentage.
pub fn reward_for_accuracy(accuracy: u32) -> (&'static str, &'static str) {
  if accuracy >= 100 {
    ("Professional Fart Listener", "💎")
  } else if accuracy >= 85 {
    ("Unicorn Whisperer", "🥇")
  } else {
    ("Dancing Banana", "🥉")
  }
}
