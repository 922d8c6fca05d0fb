//! The build invoker.
//!
//! [`BuildInvoker::build`] is the whole contract: a validated request goes
//! in, and either a complete [`BuildResult`] or a single [`BuildError`]
//! comes out. Each call is independent; the invoker keeps no state between
//! calls beyond its toolchain handle and configuration.
//!
//! # Steps
//!
//! 1. Load and validate the manifest (no toolchain call on failure)
//! 2. Resolve the target directory and derive the output root from the profile
//! 3. Ensure the output root exists and is writable
//! 4. Run the compile to completion
//! 5. Classify the reported outputs

use std::path::{Path, PathBuf};

use tracing::{Level, debug, enabled, info, warn};

use crate::artifact::{BuildResult, Classifier};
use crate::config::Config;
use crate::error::BuildError;
use crate::manifest;
use crate::request::{BuildRequest, PartialBuildRequest, Verbosity};
use crate::toolchain::{Cargo, CompileInvocation, CompileOutput, Toolchain};

pub struct BuildInvoker<T: Toolchain = Cargo> {
  toolchain: T,
  /// Used when a request does not name a target directory.
  default_target_dir: Option<PathBuf>,
}

impl BuildInvoker<Cargo> {
  /// An invoker driving the cargo binary named by `config`.
  pub fn from_config(config: &Config) -> Self {
    Self {
      toolchain: Cargo::from_config(config),
      default_target_dir: config.target_dir.clone(),
    }
  }
}

impl<T: Toolchain> BuildInvoker<T> {
  pub fn new(toolchain: T) -> Self {
    Self {
      toolchain,
      default_target_dir: None,
    }
  }

  pub fn with_default_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.default_target_dir = Some(dir.into());
    self
  }

  pub fn toolchain(&self) -> &T {
    &self.toolchain
  }

  /// Apply defaults to `partial` and build it.
  pub async fn build_partial(&self, partial: PartialBuildRequest) -> Result<BuildResult, BuildError> {
    let request = partial.resolve()?;
    self.build(&request).await
  }

  /// Build the package named by `request` and classify its outputs.
  ///
  /// Resolves only after the toolchain has exited and its output has been
  /// fully processed.
  pub async fn build(&self, request: &BuildRequest) -> Result<BuildResult, BuildError> {
    let manifest = manifest::load(&request.manifest_path)?;

    if request.only_lib && !manifest.has_lib() {
      return Err(BuildError::invalid_manifest(
        &manifest.path,
        format!("package `{}` has no library target", manifest.package_name),
      ));
    }
    if !request.only_lib && !manifest.has_lib() && manifest.bins().next().is_none() {
      return Err(BuildError::invalid_manifest(
        &manifest.path,
        format!("package `{}` has no library or binary targets", manifest.package_name),
      ));
    }

    let metadata = self.toolchain.metadata(&manifest.path, request.offline).await?;

    let target_dir_override = match request.target_dir.as_ref().or(self.default_target_dir.as_ref()) {
      Some(dir) => Some(absolute(dir)?),
      None => None,
    };
    let target_dir = target_dir_override
      .clone()
      .unwrap_or_else(|| metadata.target_directory.clone());

    let output_root = request.profile.output_root(&target_dir, request.target.as_deref());
    let output_root = prepare_output_root(&output_root).await?;

    info!(
      package = %manifest.package_name,
      output_root = %output_root.display(),
      only_lib = request.only_lib,
      "building package"
    );

    let invocation = CompileInvocation::new(request, manifest.path.clone(), target_dir_override);
    let output = self.toolchain.compile(&invocation).await?;

    log_diagnostics(&output, request.verbose);

    if !output.succeeded() {
      warn!(package = %manifest.package_name, code = ?output.code, "compilation failed");
      return Err(BuildError::CompilationFailed {
        diagnostics: output.diagnostics,
        code: output.code,
      });
    }

    let artifacts = Classifier::new(&manifest, &output_root, request.only_lib).classify(&output.messages)?;

    if artifacts.is_empty() {
      warn!(package = %manifest.package_name, "build succeeded but reported no artifacts");
    }
    info!(package = %manifest.package_name, artifacts = artifacts.len(), "build complete");

    Ok(BuildResult { output_root, artifacts })
  }

  /// Synchronous form of [`build`](Self::build).
  ///
  /// Runs on a private current-thread runtime, so it must not be called from
  /// within an async context.
  pub fn build_blocking(&self, request: &BuildRequest) -> Result<BuildResult, BuildError> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(self.build(request))
  }
}

fn absolute(path: &Path) -> Result<PathBuf, BuildError> {
  std::path::absolute(path).map_err(|e| BuildError::io_at(path, e))
}

/// Create the output root and return its canonical form.
async fn prepare_output_root(output_root: &Path) -> Result<PathBuf, BuildError> {
  tokio::fs::create_dir_all(output_root)
    .await
    .map_err(|e| BuildError::io_at(output_root, e))?;

  let metadata = tokio::fs::metadata(output_root)
    .await
    .map_err(|e| BuildError::io_at(output_root, e))?;
  if metadata.permissions().readonly() {
    return Err(BuildError::io_at(
      output_root,
      std::io::Error::new(std::io::ErrorKind::PermissionDenied, "output directory is read-only"),
    ));
  }

  dunce::canonicalize(output_root).map_err(|e| BuildError::io_at(output_root, e))
}

/// Forward captured toolchain diagnostics to the log.
///
/// Standard verbosity keeps them at debug; louder levels surface them at info.
fn log_diagnostics(output: &CompileOutput, verbose: Verbosity) {
  let surface = verbose > Verbosity::Standard;
  if !surface && !enabled!(Level::DEBUG) {
    return;
  }

  for line in output.diagnostics.lines().filter(|l| !l.trim().is_empty()) {
    if surface {
      info!(source = "cargo", "{}", line);
    } else {
      debug!(source = "cargo", "{}", line);
    }
  }
}
