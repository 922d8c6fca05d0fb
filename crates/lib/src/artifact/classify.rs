//! Artifact classification.
//!
//! Turns the toolchain's `compiler-artifact` messages into [`Artifact`]s:
//! - only targets of the requested package are reported (dependencies and
//!   build scripts never are)
//! - with `only_lib`, only library targets are reported
//! - metadata and debug-info side files are skipped
//! - every reported path must lie under the output root

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::artifact::types::{Artifact, is_under};
use crate::error::BuildError;
use crate::manifest::{LIB_CRATE_TYPES, PackageManifest, crate_name};
use crate::toolchain::{ArtifactMessage, Message, TargetInfo};

/// Extensions of files that accompany an artifact but are not one.
const SIDE_FILE_EXTENSIONS: &[&str] = &["rmeta", "d", "pdb", "dwp"];

/// Extensions of dynamically loadable libraries.
const DYNAMIC_EXTENSIONS: &[&str] = &["so", "dylib", "dll"];

pub struct Classifier<'a> {
  manifest: &'a PackageManifest,
  output_root: &'a Path,
  only_lib: bool,
}

impl<'a> Classifier<'a> {
  /// `output_root` must already be canonical.
  pub fn new(manifest: &'a PackageManifest, output_root: &'a Path, only_lib: bool) -> Self {
    Self {
      manifest,
      output_root,
      only_lib,
    }
  }

  pub fn classify(&self, messages: &[Message]) -> Result<Vec<Artifact>, BuildError> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut artifacts = Vec::new();

    for message in messages {
      let Message::CompilerArtifact(artifact) = message else {
        continue;
      };

      if !self.belongs_to_package(artifact) {
        trace!(package = %artifact.package_id, "ignoring dependency artifact");
        continue;
      }

      let target = &artifact.target;
      if target.is_build_script() {
        continue;
      }

      let is_library = is_library(target);
      if self.only_lib && !is_library {
        debug!(target = %target.name, kind = ?target.kind, "dropping non-library target");
        continue;
      }

      for file in &artifact.filenames {
        if is_side_file(file) {
          continue;
        }

        let output_path = dunce::canonicalize(file).map_err(|e| BuildError::io_at(file, e))?;
        if !is_under(&output_path, self.output_root) {
          return Err(BuildError::io_at(
            &output_path,
            std::io::Error::new(
              std::io::ErrorKind::InvalidData,
              format!("artifact is outside output root {}", self.output_root.display()),
            ),
          ));
        }

        if !seen.insert(output_path.clone()) {
          continue;
        }

        let dynamic = is_dynamic(&output_path);
        artifacts.push(Artifact {
          name: crate_name(&target.name),
          is_lib: is_library,
          is_dylib: is_library && dynamic && target.has_crate_type("dylib"),
          is_cdylib: is_library && dynamic && target.has_crate_type("cdylib"),
          output_path,
        });
      }
    }

    Ok(artifacts)
  }

  fn belongs_to_package(&self, artifact: &ArtifactMessage) -> bool {
    match &artifact.manifest_path {
      Some(path) => {
        let canonical = dunce::canonicalize(path).unwrap_or_else(|_| path.clone());
        canonical == self.manifest.path
      }
      None => artifact.target.src_path.starts_with(&self.manifest.root),
    }
  }
}

fn is_library(target: &TargetInfo) -> bool {
  LIB_CRATE_TYPES.iter().any(|kind| target.has_kind(kind))
}

fn is_side_file(path: &Path) -> bool {
  let in_dsym = path
    .components()
    .any(|c| c.as_os_str().to_string_lossy().ends_with(".dSYM"));
  in_dsym || has_extension(path, SIDE_FILE_EXTENSIONS)
}

fn is_dynamic(path: &Path) -> bool {
  has_extension(path, DYNAMIC_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| extensions.contains(&ext))
}
