//! Test utilities for kiln-lib.
//!
//! Provides on-disk package fixtures and [`FakeToolchain`], a stand-in for
//! cargo that writes plausible outputs and reports them the way cargo does.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;

use crate::artifact::Classifier;
use crate::error::BuildError;
use crate::manifest::{self, PackageManifest};
use crate::toolchain::{ArtifactMessage, CompileInvocation, CompileOutput, Message, TargetInfo, Toolchain, WorkspaceMetadata};

/// Write a package under `root` and return its manifest path.
///
/// Always has `src/lib.rs`; `src/main.rs` only when `with_bin` is set.
pub fn write_package(root: &Path, name: &str, crate_types: Option<&[&str]>, with_bin: bool) -> PathBuf {
  let mut toml = format!("[package]\nname = \"{}\"\nversion = \"0.1.0\"\nedition = \"2021\"\n", name);
  if let Some(types) = crate_types {
    let quoted: Vec<String> = types.iter().map(|t| format!("\"{}\"", t)).collect();
    toml.push_str(&format!("\n[lib]\ncrate-type = [{}]\n", quoted.join(", ")));
  }

  std::fs::create_dir_all(root.join("src")).unwrap();
  std::fs::write(root.join("src/lib.rs"), "pub fn answer() -> u32 { 42 }\n").unwrap();
  if with_bin {
    std::fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
  }

  let manifest_path = root.join("Cargo.toml");
  std::fs::write(&manifest_path, toml).unwrap();
  manifest_path
}

/// Build a `compiler-artifact` message.
pub fn artifact_message(manifest_path: &Path, name: &str, kinds: &[&str], files: &[&PathBuf]) -> Message {
  let kind: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
  Message::CompilerArtifact(ArtifactMessage {
    package_id: format!("path+file://{}#0.1.0", manifest_path.parent().unwrap_or(manifest_path).display()),
    manifest_path: Some(manifest_path.to_path_buf()),
    target: TargetInfo {
      name: name.to_string(),
      crate_types: kind.clone(),
      kind,
      src_path: manifest_path.with_file_name("src").join("lib.rs"),
    },
    filenames: files.iter().map(|f| f.to_path_buf()).collect(),
  })
}

/// A loaded package in a temp dir with a ready output root.
pub struct PackageFixture {
  pub temp: TempDir,
  pub manifest: PackageManifest,
  pub output_root: PathBuf,
}

impl PackageFixture {
  pub fn new(name: &str, crate_types: Option<&[&str]>, with_bin: bool) -> Self {
    let temp = TempDir::new().unwrap();
    let manifest_path = write_package(temp.path(), name, crate_types, with_bin);
    let manifest = manifest::load(&manifest_path).unwrap();
    let output_root = temp.path().join("target").join("release");
    std::fs::create_dir_all(&output_root).unwrap();
    let output_root = dunce::canonicalize(&output_root).unwrap();
    Self {
      temp,
      manifest,
      output_root,
    }
  }

  /// Create an empty file under the output root.
  pub fn touch_output(&self, relative: &str) -> PathBuf {
    let path = self.output_root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"").unwrap();
    path
  }

  pub fn classifier(&self, only_lib: bool) -> Classifier<'_> {
    Classifier::new(&self.manifest, &self.output_root, only_lib)
  }
}

/// A declared target of the fake package: name and cargo kinds.
#[derive(Debug, Clone)]
pub struct FakeTarget {
  pub name: String,
  pub kinds: Vec<String>,
}

impl FakeTarget {
  pub fn new(name: &str, kinds: &[&str]) -> Self {
    Self {
      name: name.to_string(),
      kinds: kinds.iter().map(|k| k.to_string()).collect(),
    }
  }

  fn is_lib(&self) -> bool {
    self.kinds.iter().any(|k| manifest::LIB_CRATE_TYPES.contains(&k.as_str()))
  }

  fn file_names(&self) -> Vec<String> {
    if !self.is_lib() {
      return vec![self.name.clone()];
    }
    self
      .kinds
      .iter()
      .filter_map(|kind| match kind.as_str() {
        "lib" | "rlib" => Some(format!("lib{}.rlib", self.name)),
        "dylib" | "cdylib" => Some(format!("lib{}.so", self.name)),
        "staticlib" => Some(format!("lib{}.a", self.name)),
        _ => None,
      })
      .collect()
  }
}

/// A toolchain that behaves like cargo without compiling anything.
///
/// `compile` writes one file per crate type into the output root implied by
/// the invocation, plus a dependency rlib under `deps/`, and reports them.
pub struct FakeToolchain {
  pub target_directory: PathBuf,
  pub targets: Vec<FakeTarget>,
  /// When set, compiles fail with these diagnostics.
  pub failure: Option<String>,
  pub compiles: Mutex<Vec<CompileInvocation>>,
  pub metadata_calls: AtomicUsize,
}

impl FakeToolchain {
  pub fn new(target_directory: impl Into<PathBuf>, targets: Vec<FakeTarget>) -> Self {
    Self {
      target_directory: target_directory.into(),
      targets,
      failure: None,
      compiles: Mutex::new(Vec::new()),
      metadata_calls: AtomicUsize::new(0),
    }
  }

  pub fn failing(mut self, diagnostics: &str) -> Self {
    self.failure = Some(diagnostics.to_string());
    self
  }

  pub fn compile_count(&self) -> usize {
    self.compiles.lock().unwrap().len()
  }

  pub fn last_compile(&self) -> Option<CompileInvocation> {
    self.compiles.lock().unwrap().last().cloned()
  }
}

impl Toolchain for FakeToolchain {
  async fn metadata(&self, _manifest_path: &Path, _offline: bool) -> Result<WorkspaceMetadata, BuildError> {
    self.metadata_calls.fetch_add(1, Ordering::SeqCst);
    Ok(WorkspaceMetadata {
      target_directory: self.target_directory.clone(),
    })
  }

  async fn compile(&self, invocation: &CompileInvocation) -> Result<CompileOutput, BuildError> {
    self.compiles.lock().unwrap().push(invocation.clone());

    if let Some(diagnostics) = &self.failure {
      return Ok(CompileOutput {
        success: false,
        code: Some(101),
        messages: vec![Message::BuildFinished { success: false }],
        diagnostics: diagnostics.clone(),
      });
    }

    let target_dir = invocation.target_dir.as_ref().unwrap_or(&self.target_directory);
    let root = invocation.profile.output_root(target_dir, invocation.target.as_deref());
    let write = |relative: &str| -> Result<PathBuf, BuildError> {
      let path = root.join(relative);
      if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| BuildError::io_at(parent, e))?;
      }
      std::fs::write(&path, b"").map_err(|e| BuildError::io_at(&path, e))?;
      Ok(path)
    };

    let mut messages = Vec::new();

    let dep = write("deps/libdep-0000.rlib")?;
    messages.push(artifact_message(
      &root.join("registry/dep/Cargo.toml"),
      "dep",
      &["lib"],
      &[&dep],
    ));

    for target in &self.targets {
      if invocation.only_lib && !target.is_lib() {
        continue;
      }
      let files = target
        .file_names()
        .iter()
        .map(|name| write(name.as_str()))
        .collect::<Result<Vec<_>, _>>()?;
      let refs: Vec<&PathBuf> = files.iter().collect();
      let kinds: Vec<&str> = target.kinds.iter().map(String::as_str).collect();
      messages.push(artifact_message(&invocation.manifest_path, &target.name, &kinds, &refs));
    }

    messages.push(Message::BuildFinished { success: true });

    Ok(CompileOutput {
      success: true,
      code: Some(0),
      messages,
      diagnostics: "   Compiling fake v0.1.0\n    Finished `release` profile\n".to_string(),
    })
  }
}
