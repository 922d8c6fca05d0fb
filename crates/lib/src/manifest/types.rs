//! Manifest types for kiln.
//!
//! A package manifest names a package and the targets cargo will build for
//! it. Only the parts the invoker needs are modelled; everything else in the
//! TOML document is ignored.
//!
//! # Target discovery
//!
//! Targets come from two places, mirroring cargo's rules:
//! - Explicit `[lib]` and `[[bin]]` tables
//! - Conventional sources (`src/lib.rs`, `src/main.rs`, `src/bin/*.rs`),
//!   unless `autolib` / `autobins` is disabled in `[package]`

use std::path::PathBuf;

use serde::Deserialize;

/// Crate types that make a target a library.
pub const LIB_CRATE_TYPES: &[&str] = &["lib", "rlib", "dylib", "cdylib", "staticlib", "proc-macro"];

/// The raw TOML document, as far as kiln cares.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawManifest {
  pub package: Option<RawPackage>,
  pub workspace: Option<toml::Table>,
  pub lib: Option<RawTarget>,
  #[serde(default)]
  pub bin: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPackage {
  pub name: String,
  pub autolib: Option<bool>,
  pub autobins: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawTarget {
  pub name: Option<String>,
  pub path: Option<PathBuf>,
  #[serde(default, rename = "crate-type", alias = "crate_type")]
  pub crate_type: Option<Vec<String>>,
  #[serde(default, rename = "proc-macro", alias = "proc_macro")]
  pub proc_macro: Option<bool>,
}

/// The kind of a declared target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
  /// A library, with the crate types it is compiled as.
  Lib { crate_types: Vec<String> },
  Bin,
}

/// A target declared by (or inferred from) the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
  /// Crate name: hyphens already replaced with underscores.
  pub name: String,
  pub kind: TargetKind,
  pub src_path: PathBuf,
}

impl Target {
  pub fn is_lib(&self) -> bool {
    matches!(self.kind, TargetKind::Lib { .. })
  }
}

/// A validated package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
  /// Canonical path of the manifest file.
  pub path: PathBuf,
  /// Directory containing the manifest.
  pub root: PathBuf,
  pub package_name: String,
  pub targets: Vec<Target>,
}

impl PackageManifest {
  pub fn lib(&self) -> Option<&Target> {
    self.targets.iter().find(|t| t.is_lib())
  }

  pub fn has_lib(&self) -> bool {
    self.lib().is_some()
  }

  pub fn bins(&self) -> impl Iterator<Item = &Target> {
    self.targets.iter().filter(|t| !t.is_lib())
  }
}

/// Normalise a package or target name the way rustc sees it.
pub fn crate_name(name: &str) -> String {
  name.replace('-', "_")
}
