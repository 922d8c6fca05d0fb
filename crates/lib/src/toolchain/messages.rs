//! Cargo's machine-readable build messages.
//!
//! `cargo build --message-format=json-render-diagnostics` writes one JSON
//! object per line to stdout. Compiler diagnostics are rendered to stderr
//! instead, so only artifact and lifecycle messages arrive here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::trace;

/// One line of cargo's JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "kebab-case")]
pub enum Message {
  /// A target finished compiling (or was already fresh).
  CompilerArtifact(ArtifactMessage),
  /// Final message of a build.
  BuildFinished { success: bool },
  #[serde(other)]
  Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMessage {
  pub package_id: String,
  /// Absent on very old cargo releases.
  #[serde(default)]
  pub manifest_path: Option<PathBuf>,
  pub target: TargetInfo,
  #[serde(default)]
  pub filenames: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInfo {
  pub name: String,
  pub kind: Vec<String>,
  #[serde(default)]
  pub crate_types: Vec<String>,
  pub src_path: PathBuf,
}

impl TargetInfo {
  pub fn is_build_script(&self) -> bool {
    self.kind.iter().any(|k| k == "custom-build")
  }

  pub fn has_kind(&self, kind: &str) -> bool {
    self.kind.iter().any(|k| k == kind)
  }

  pub fn has_crate_type(&self, crate_type: &str) -> bool {
    self.crate_types.iter().any(|t| t == crate_type) || self.has_kind(crate_type)
  }
}

/// Decode cargo's stdout into messages.
///
/// Lines that are not JSON objects are skipped; cargo does not produce them
/// on stdout, but wrappers sometimes do.
pub fn parse_stream(stdout: &str) -> Vec<Message> {
  stdout
    .lines()
    .map(str::trim)
    .filter(|line| line.starts_with('{'))
    .filter_map(|line| match serde_json::from_str::<Message>(line) {
      Ok(message) => Some(message),
      Err(e) => {
        trace!(error = %e, line = %line, "skipping undecodable cargo message");
        None
      }
    })
    .collect()
}

/// The outcome reported by the last `build-finished` message, if any.
pub fn finished_status(messages: &[Message]) -> Option<bool> {
  messages.iter().rev().find_map(|m| match m {
    Message::BuildFinished { success } => Some(*success),
    _ => None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  const LIB_ARTIFACT: &str = r#"{"reason":"compiler-artifact","package_id":"path+file:///work/ffi#0.1.0","manifest_path":"/work/ffi/Cargo.toml","target":{"kind":["lib","cdylib"],"crate_types":["lib","cdylib"],"name":"ffi","src_path":"/work/ffi/src/lib.rs","edition":"2021","doc":true,"doctest":true,"test":true},"profile":{"opt_level":"3","debuginfo":0,"debug_assertions":false,"overflow_checks":false,"test":false},"features":[],"filenames":["/work/ffi/target/release/libffi.rlib","/work/ffi/target/release/libffi.so"],"executable":null,"fresh":false}"#;

  #[test]
  fn decodes_compiler_artifact() {
    let messages = parse_stream(LIB_ARTIFACT);

    let Message::CompilerArtifact(artifact) = &messages[0] else {
      panic!("expected compiler-artifact, got {:?}", messages[0]);
    };
    assert_eq!(artifact.target.name, "ffi");
    assert!(artifact.target.has_crate_type("cdylib"));
    assert_eq!(artifact.filenames.len(), 2);
    assert_eq!(artifact.manifest_path.as_deref(), Some(std::path::Path::new("/work/ffi/Cargo.toml")));
  }

  #[test]
  fn unknown_reasons_are_kept_as_unknown() {
    let messages = parse_stream(r#"{"reason":"compiler-message","package_id":"x","message":{}}"#);
    assert_eq!(messages, vec![Message::Unknown]);
  }

  #[test]
  fn build_script_output_is_not_modelled() {
    let line = r#"{"reason":"build-script-executed","package_id":"p","linked_libs":[],"linked_paths":[],"cfgs":[],"env":[],"out_dir":"/p/target/release/build/p-1/out"}"#;
    assert_eq!(parse_stream(line), vec![Message::Unknown]);
  }

  #[test]
  fn non_json_lines_are_skipped() {
    let stdout = format!("warning: something\n{}\n\n{{\"reason\":\"build-finished\",\"success\":true}}\n", LIB_ARTIFACT);
    let messages = parse_stream(&stdout);

    assert_eq!(messages.len(), 2);
    assert_eq!(finished_status(&messages), Some(true));
  }

  #[test]
  fn build_script_kind_is_detected() {
    let line = r#"{"reason":"compiler-artifact","package_id":"p","target":{"kind":["custom-build"],"crate_types":["bin"],"name":"build-script-build","src_path":"/p/build.rs"},"filenames":["/p/target/release/build/p-1/build-script-build"],"fresh":true}"#;
    let messages = parse_stream(line);

    let Message::CompilerArtifact(artifact) = &messages[0] else {
      panic!("expected compiler-artifact");
    };
    assert!(artifact.target.is_build_script());
    assert!(artifact.manifest_path.is_none());
  }

  #[test]
  fn missing_finish_message_yields_none() {
    assert_eq!(finished_status(&parse_stream(LIB_ARTIFACT)), None);
  }
}
