//! Translation of a [`BuildRequest`] into a cargo command line.

use std::ffi::OsString;
use std::path::PathBuf;

use crate::request::{BuildRequest, Profile, Verbosity};

/// A fully resolved `cargo build` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileInvocation {
  pub manifest_path: PathBuf,
  pub only_lib: bool,
  pub verbose: Verbosity,
  pub profile: Profile,
  pub target: Option<String>,
  pub features: Vec<String>,
  pub all_features: bool,
  pub no_default_features: bool,
  /// Only set when the caller or configuration overrides cargo's own choice.
  pub target_dir: Option<PathBuf>,
  pub jobs: Option<u32>,
  pub offline: bool,
}

impl CompileInvocation {
  pub fn new(request: &BuildRequest, manifest_path: PathBuf, target_dir: Option<PathBuf>) -> Self {
    Self {
      manifest_path,
      only_lib: request.only_lib,
      verbose: request.verbose,
      profile: request.profile.clone(),
      target: request.target.clone(),
      features: request.features.clone(),
      all_features: request.all_features,
      no_default_features: request.no_default_features,
      target_dir,
      jobs: request.jobs,
      offline: request.offline,
    }
  }

  /// Arguments following the cargo binary.
  pub fn args(&self) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
      "build".into(),
      "--manifest-path".into(),
      self.manifest_path.clone().into(),
      "--message-format=json-render-diagnostics".into(),
      "--color=never".into(),
    ];

    match &self.profile {
      Profile::Release => args.push("--release".into()),
      Profile::Dev => {}
      Profile::Custom(name) => {
        args.push("--profile".into());
        args.push(name.into());
      }
    }

    if self.only_lib {
      args.push("--lib".into());
    }

    if let Some(flag) = self.verbose.cargo_flag() {
      args.push(flag.into());
    }

    if let Some(triple) = &self.target {
      args.push("--target".into());
      args.push(triple.into());
    }

    if self.all_features {
      args.push("--all-features".into());
    } else if !self.features.is_empty() {
      args.push("--features".into());
      args.push(self.features.join(",").into());
    }

    if self.no_default_features {
      args.push("--no-default-features".into());
    }

    if let Some(dir) = &self.target_dir {
      args.push("--target-dir".into());
      args.push(dir.clone().into());
    }

    if let Some(jobs) = self.jobs {
      args.push("--jobs".into());
      args.push(jobs.to_string().into());
    }

    if self.offline {
      args.push("--offline".into());
    }

    args
  }
}
