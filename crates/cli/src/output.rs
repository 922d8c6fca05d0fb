//! Terminal output for kiln commands.
//!
//! Status lines go through [`status`], which picks the stream and colors the
//! leading symbol only when that stream supports it. Results meant for
//! machines go to stdout via [`print_json`].

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    self == OutputFormat::Json
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
}

#[derive(Debug, Clone, Copy)]
enum Level {
  Success,
  Info,
  Warning,
  Error,
}

impl Level {
  fn symbol(self) -> &'static str {
    match self {
      Level::Success => symbols::SUCCESS,
      Level::Info => symbols::INFO,
      Level::Warning => symbols::WARNING,
      Level::Error => symbols::ERROR,
    }
  }

  /// Problems go to stderr so stdout stays clean for results.
  fn stream(self) -> Stream {
    match self {
      Level::Success | Level::Info => Stream::Stdout,
      Level::Warning | Level::Error => Stream::Stderr,
    }
  }
}

fn status(level: Level, message: &str) {
  let stream = level.stream();
  let symbol = level.symbol();
  let marker = match level {
    Level::Success => symbol.if_supports_color(stream, |s| s.green()).to_string(),
    Level::Info => symbol.if_supports_color(stream, |s| s.blue()).to_string(),
    Level::Warning => symbol.if_supports_color(stream, |s| s.yellow()).to_string(),
    Level::Error => symbol.if_supports_color(stream, |s| s.red()).to_string(),
  };

  match stream {
    Stream::Stdout => println!("{} {}", marker, message),
    _ => eprintln!("{} {}", marker, message),
  }
}

pub fn print_success(message: &str) {
  status(Level::Success, message);
}

pub fn print_info(message: &str) {
  status(Level::Info, message);
}

pub fn print_warning(message: &str) {
  status(Level::Warning, message);
}

pub fn print_error(message: &str) {
  status(Level::Error, message);
}

/// An indented `label: value` line under a status line.
pub fn print_stat(label: &str, value: &str) {
  println!("  {}: {}", label.if_supports_color(Stream::Stdout, |s| s.dimmed()), value);
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Artifact sizes, in binary units with one decimal.
pub fn format_bytes(bytes: u64) -> String {
  const UNITS: [&str; 3] = ["KB", "MB", "GB"];

  if bytes < 1024 {
    return format!("{} B", bytes);
  }

  let mut size = bytes as f64 / 1024.0;
  let mut unit = 0;
  while size >= 1024.0 && unit < UNITS.len() - 1 {
    size /= 1024.0;
    unit += 1;
  }
  format!("{:.1} {}", size, UNITS[unit])
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..=59 => format!("{:.2}s", duration.as_secs_f64()),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}
