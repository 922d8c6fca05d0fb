//! Toolchain invocation layer.
//!
//! The invoker talks to the build engine through the [`Toolchain`] trait.
//! [`Cargo`] is the production implementation: an explicitly constructed
//! handle naming the cargo binary and any extra environment, owned by the
//! [`BuildInvoker`](crate::invoker::BuildInvoker) that uses it.
//!
//! # Submodules
//!
//! - [`invocation`] - Request to command-line translation
//! - [`messages`] - Decoding of cargo's JSON message stream
//! - [`metadata`] - Decoding of `cargo metadata`

pub mod invocation;
pub mod messages;
pub mod metadata;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::BuildError;

pub use invocation::CompileInvocation;
pub use messages::{ArtifactMessage, Message, TargetInfo};
pub use metadata::WorkspaceMetadata;

/// Everything a finished compile produced.
#[derive(Debug, Clone, Default)]
pub struct CompileOutput {
  /// Whether the toolchain process exited successfully.
  pub success: bool,
  pub code: Option<i32>,
  pub messages: Vec<Message>,
  /// Rendered diagnostics (cargo's stderr).
  pub diagnostics: String,
}

impl CompileOutput {
  /// Success requires a clean exit and no `build-finished` failure report.
  pub fn succeeded(&self) -> bool {
    self.success && messages::finished_status(&self.messages).unwrap_or(true)
  }
}

/// A build engine the invoker can drive.
pub trait Toolchain: Send + Sync {
  /// Resolve workspace metadata for the manifest at `manifest_path`.
  fn metadata(&self, manifest_path: &Path, offline: bool) -> impl Future<Output = Result<WorkspaceMetadata, BuildError>> + Send;

  /// Run a compile to completion.
  ///
  /// A compile that runs but fails is `Ok` with `success == false`; `Err` is
  /// reserved for failing to run the toolchain at all.
  fn compile(&self, invocation: &CompileInvocation) -> impl Future<Output = Result<CompileOutput, BuildError>> + Send;
}

/// Handle to a cargo installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cargo {
  program: PathBuf,
  env: BTreeMap<String, String>,
}

impl Cargo {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      env: BTreeMap::new(),
    }
  }

  pub fn from_config(config: &Config) -> Self {
    Self::new(&config.cargo)
  }

  /// Extra environment passed to every cargo process.
  pub fn with_env(mut self, key: &str, value: &str) -> Self {
    self.env.insert(key.to_string(), value.to_string());
    self
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  fn command(&self) -> Command {
    let mut command = Command::new(&self.program);
    command.envs(&self.env).stdin(Stdio::null()).kill_on_drop(true);
    command
  }

  /// `cargo --version`, trimmed.
  pub async fn version(&self) -> Result<String, BuildError> {
    let output = self.command().arg("--version").output().await?;
    if !output.status.success() {
      return Err(BuildError::Io(std::io::Error::other(format!(
        "{} --version exited with {:?}",
        self.program.display(),
        output.status.code()
      ))));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

impl Default for Cargo {
  fn default() -> Self {
    Self::new(crate::consts::DEFAULT_CARGO)
  }
}

impl Toolchain for Cargo {
  async fn metadata(&self, manifest_path: &Path, offline: bool) -> Result<WorkspaceMetadata, BuildError> {
    let mut command = self.command();
    command
      .args(["metadata", "--no-deps", "--format-version", "1", "--color=never", "--manifest-path"])
      .arg(manifest_path);
    if offline {
      command.arg("--offline");
    }

    debug!(program = %self.program.display(), manifest = %manifest_path.display(), "querying cargo metadata");

    let output = command.output().await?;
    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(BuildError::invalid_manifest(manifest_path, stderr.trim()));
    }

    WorkspaceMetadata::parse(&output.stdout)
  }

  async fn compile(&self, invocation: &CompileInvocation) -> Result<CompileOutput, BuildError> {
    let args = invocation.args();
    info!(
      manifest = %invocation.manifest_path.display(),
      profile = %invocation.profile,
      only_lib = invocation.only_lib,
      "running cargo build"
    );
    debug!(program = %self.program.display(), args = ?args, "spawning cargo");

    let output = self.command().args(&args).output().await?;

    Ok(CompileOutput {
      success: output.status.success(),
      code: output.status.code(),
      messages: messages::parse_stream(&String::from_utf8_lossy(&output.stdout)),
      diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
  }
}
