//! Workspace metadata as reported by `cargo metadata --no-deps`.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::BuildError;

/// The subset of `cargo metadata` output the invoker relies on.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceMetadata {
  /// Where cargo writes build outputs for this workspace.
  pub target_directory: PathBuf,
}

impl WorkspaceMetadata {
  pub fn parse(stdout: &[u8]) -> Result<Self, BuildError> {
    serde_json::from_slice(stdout).map_err(|e| {
      BuildError::Io(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("unreadable cargo metadata: {}", e),
      ))
    })
  }
}
