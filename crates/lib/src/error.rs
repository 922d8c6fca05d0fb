//! Error types for kiln-lib.
//!
//! Every failure of a build call is terminal: the caller receives exactly one
//! [`BuildError`] and no partial [`BuildResult`](crate::artifact::BuildResult).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while servicing a build request.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The manifest is missing, unreadable, malformed, or not a package manifest.
  #[error("invalid manifest {path}: {reason}")]
  InvalidManifest { path: PathBuf, reason: String },

  /// The toolchain ran and reported failure.
  #[error("compilation failed{}", exit_suffix(.code))]
  CompilationFailed {
    /// Rendered compiler diagnostics captured from the toolchain.
    diagnostics: String,
    code: Option<i32>,
  },

  /// I/O error touching a specific path.
  #[error("io error at {path}: {source}")]
  IoAt {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// I/O error without a path, e.g. spawning the toolchain.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The request itself is structurally malformed.
  #[error("invalid request: {0}")]
  InvalidRequest(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
  match code {
    Some(code) => format!(" with exit code {}", code),
    None => String::new(),
  }
}

impl BuildError {
  pub(crate) fn invalid_manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
    BuildError::InvalidManifest {
      path: path.into(),
      reason: reason.into(),
    }
  }

  pub(crate) fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    BuildError::IoAt {
      path: path.into(),
      source,
    }
  }

  /// The stable, distinguishable kind of this error.
  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::InvalidManifest { .. } => ErrorKind::InvalidManifest,
      BuildError::CompilationFailed { .. } => ErrorKind::CompilationFailed,
      BuildError::IoAt { .. } | BuildError::Io(_) => ErrorKind::Io,
      BuildError::InvalidRequest(_) => ErrorKind::InvalidRequest,
    }
  }

  /// Compiler diagnostics, if this is a compilation failure.
  pub fn diagnostics(&self) -> Option<&str> {
    match self {
      BuildError::CompilationFailed { diagnostics, .. } => Some(diagnostics),
      _ => None,
    }
  }
}

/// Error kinds as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
  InvalidManifest,
  CompilationFailed,
  #[serde(rename = "IOError")]
  Io,
  InvalidRequest,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorKind::InvalidManifest => "InvalidManifest",
      ErrorKind::CompilationFailed => "CompilationFailed",
      ErrorKind::Io => "IOError",
      ErrorKind::InvalidRequest => "InvalidRequest",
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
