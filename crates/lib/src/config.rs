//! Environment-driven configuration.
//!
//! | Variable          | Effect                                          |
//! |-------------------|-------------------------------------------------|
//! | `KILN_CARGO`      | cargo binary to run                             |
//! | `CARGO`           | fallback cargo binary (set by cargo for children) |
//! | `KILN_TARGET_DIR` | target directory for requests that name none    |

use std::path::PathBuf;

use crate::consts::{DEFAULT_CARGO, ENV_CARGO, ENV_CARGO_FALLBACK, ENV_TARGET_DIR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  pub cargo: PathBuf,
  pub target_dir: Option<PathBuf>,
}

impl Config {
  pub fn from_env() -> Self {
    Self {
      cargo: cargo_program(),
      target_dir: non_empty_var(ENV_TARGET_DIR).map(PathBuf::from),
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      cargo: PathBuf::from(DEFAULT_CARGO),
      target_dir: None,
    }
  }
}

/// Returns the cargo binary to use
pub fn cargo_program() -> PathBuf {
  non_empty_var(ENV_CARGO)
    .or_else(|| non_empty_var(ENV_CARGO_FALLBACK))
    .map(PathBuf::from)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_CARGO))
}

fn non_empty_var(key: &str) -> Option<String> {
  std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
