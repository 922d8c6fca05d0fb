use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A single file produced by a build.
///
/// The kind flags are not exclusive: the shared object of a target declared
/// as `crate-type = ["lib", "cdylib"]` is both `is_lib` and `is_cdylib`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
  /// Crate name of the target that produced this file.
  pub name: String,
  pub output_path: PathBuf,
  pub is_lib: bool,
  pub is_dylib: bool,
  pub is_cdylib: bool,
}

impl Artifact {
  /// Short labels for the kinds this artifact carries, e.g. `["lib", "cdylib"]`.
  pub fn kind_labels(&self) -> Vec<&'static str> {
    let mut labels = Vec::new();
    if self.is_lib {
      labels.push("lib");
    }
    if self.is_dylib {
      labels.push("dylib");
    }
    if self.is_cdylib {
      labels.push("cdylib");
    }
    if labels.is_empty() {
      labels.push("bin");
    }
    labels
  }
}

/// The outcome of a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
  /// Common base directory of every artifact.
  pub output_root: PathBuf,
  pub artifacts: Vec<Artifact>,
}

pub(crate) fn is_under(path: &Path, root: &Path) -> bool {
  path.starts_with(root) && path != root
}
