//! Package manifest loading and validation.
//!
//! A manifest is accepted when the file exists, is readable, parses as TOML
//! and contains a `[package]` table. Anything else is reported as
//! [`BuildError::InvalidManifest`] before the toolchain is ever invoked.

mod types;

pub use types::*;

use std::path::Path;

use tracing::debug;

use crate::error::BuildError;

/// Load and validate the manifest at `path`.
pub fn load(path: &Path) -> Result<PackageManifest, BuildError> {
  let canonical = dunce::canonicalize(path).map_err(|e| match e.kind() {
    std::io::ErrorKind::NotFound => BuildError::invalid_manifest(path, "manifest does not exist"),
    _ => BuildError::invalid_manifest(path, format!("cannot resolve manifest path: {}", e)),
  })?;

  if !canonical.is_file() {
    return Err(BuildError::invalid_manifest(path, "manifest path is not a file"));
  }

  let content = std::fs::read_to_string(&canonical)
    .map_err(|e| BuildError::invalid_manifest(&canonical, format!("cannot read manifest: {}", e)))?;

  let root = canonical
    .parent()
    .map(Path::to_path_buf)
    .ok_or_else(|| BuildError::invalid_manifest(&canonical, "manifest has no parent directory"))?;

  let manifest = parse(&content, &canonical, &root)?;
  debug!(
    manifest = %manifest.path.display(),
    package = %manifest.package_name,
    targets = manifest.targets.len(),
    "loaded manifest"
  );
  Ok(manifest)
}

/// Parse manifest `content` belonging to the package rooted at `root`.
///
/// Conventional target sources are probed on disk relative to `root`.
pub fn parse(content: &str, path: &Path, root: &Path) -> Result<PackageManifest, BuildError> {
  let raw: RawManifest = toml::from_str(content)
    .map_err(|e| BuildError::invalid_manifest(path, format!("malformed manifest: {}", e.message())))?;

  let Some(package) = raw.package else {
    let reason = if raw.workspace.is_some() {
      "virtual manifests are not supported; point at a member package"
    } else {
      "missing [package] table"
    };
    return Err(BuildError::invalid_manifest(path, reason));
  };

  if package.name.trim().is_empty() {
    return Err(BuildError::invalid_manifest(path, "package name is empty"));
  }

  let mut targets = Vec::new();

  if let Some(lib) = lib_target(raw.lib, &package, root) {
    targets.push(lib);
  }
  targets.extend(bin_targets(raw.bin, &package, root));

  Ok(PackageManifest {
    path: path.to_path_buf(),
    root: root.to_path_buf(),
    package_name: package.name,
    targets,
  })
}

fn lib_target(explicit: Option<RawTarget>, package: &RawPackage, root: &Path) -> Option<Target> {
  let default_src = root.join("src").join("lib.rs");

  let raw = match explicit {
    Some(raw) => raw,
    None if package.autolib.unwrap_or(true) && default_src.is_file() => RawTarget::default(),
    None => return None,
  };

  let crate_types = if raw.proc_macro.unwrap_or(false) {
    vec!["proc-macro".to_string()]
  } else {
    raw.crate_type.unwrap_or_else(|| vec!["lib".to_string()])
  };

  Some(Target {
    name: crate_name(raw.name.as_deref().unwrap_or(&package.name)),
    kind: TargetKind::Lib { crate_types },
    src_path: raw.path.map(|p| root.join(p)).unwrap_or(default_src),
  })
}

fn bin_targets(explicit: Vec<RawTarget>, package: &RawPackage, root: &Path) -> Vec<Target> {
  let mut bins: Vec<Target> = explicit
    .into_iter()
    .filter_map(|raw| {
      let name = raw.name?;
      let src_path = raw
        .path
        .map(|p| root.join(p))
        .unwrap_or_else(|| root.join("src").join("bin").join(format!("{}.rs", name)));
      Some(Target {
        name: crate_name(&name),
        kind: TargetKind::Bin,
        src_path,
      })
    })
    .collect();

  if !package.autobins.unwrap_or(true) {
    return bins;
  }

  let mut push_inferred = |name: String, src_path: std::path::PathBuf| {
    if !bins.iter().any(|b| b.name == name || b.src_path == src_path) {
      bins.push(Target {
        name,
        kind: TargetKind::Bin,
        src_path,
      });
    }
  };

  let main = root.join("src").join("main.rs");
  if main.is_file() {
    push_inferred(crate_name(&package.name), main);
  }

  let bin_dir = root.join("src").join("bin");
  if let Ok(entries) = std::fs::read_dir(&bin_dir) {
    let mut sources: Vec<_> = entries
      .filter_map(Result::ok)
      .map(|entry| entry.path())
      .filter(|p| p.extension().is_some_and(|ext| ext == "rs"))
      .collect();
    sources.sort();
    for src in sources {
      if let Some(stem) = src.file_stem().and_then(|s| s.to_str()) {
        push_inferred(crate_name(stem), src.clone());
      }
    }
  }

  bins
}
