//! ## Features
//!
//! - Leveled logging (info, warn, error, success)
//! - Multi-line message support with a consistent prefix on every line
//! - Timestamped variants for events worth dating
//! - All output goes to stderr so stdout stays clean for command results
//!
//! ## Usage
//!
//! Functions: `info()`, `warn()`, `error()`, `success()`
//!
//! Timestamped: `stamped(Level::Success, "...")`
//!
//! Macros with the same names exist for call sites excluded from coverage.

use chrono::Local;
use colored::*;

/// Severity of a message, which decides its prefix and color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
  Info,
  Warn,
  Error,
  Success,
}

impl Level {
  /// Short tag shown between brackets
  pub fn tag(self) -> &'static str {
    match self {
      Level::Info => "info",
      Level::Warn => "warn",
      Level::Error => "error",
      Level::Success => "sccs",
    }
  }

  fn color(self) -> Color {
    match self {
      Level::Info => Color::Blue,
      Level::Warn => Color::Yellow,
      Level::Error => Color::Red,
      Level::Success => Color::Green,
    }
  }
}

/// Colored, padded prefix so messages line up regardless of tag length
fn prefix(level: Level) -> String {
  let pad = 7usize.saturating_sub(level.tag().len() + 2);
  format!("[{}]{:<pad$}", level.tag().color(level.color()).bold(), "")
}

/// Build the output lines for a message without printing them
pub fn render(level: Level, message: &str) -> Vec<String> {
  let prefix = prefix(level);
  message.lines().map(|line| format!("{prefix} {line}")).collect()
}

/// Build timestamped output lines for a message without printing them
pub fn render_stamped(level: Level, message: &str) -> Vec<String> {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let prefix = format!("{} [{}]", prefix(level), timestamp.cyan());
  message.lines().map(|line| format!("{prefix} {line}")).collect()
}

/// Print a message at the given level
pub fn emit(level: Level, message: &str) {
  for line in render(level, message) {
    eprintln!("{line}");
  }
}

/// Print a timestamped message at the given level
pub fn stamped(level: Level, message: &str) {
  for line in render_stamped(level, message) {
    eprintln!("{line}");
  }
}

/// General information
pub fn info(message: &str) {
  emit(Level::Info, message);
}

/// Something needs attention but the command carries on
pub fn warn(message: &str) {
  emit(Level::Warn, message);
}

/// Something went wrong
pub fn error(message: &str) {
  emit(Level::Error, message);
}

/// Something completed successfully
pub fn success(message: &str) {
  emit(Level::Success, message);
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}
