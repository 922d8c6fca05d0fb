//! Build requests.
//!
//! Callers may supply any subset of fields; [`PartialBuildRequest::resolve`]
//! fills every absent field from a fixed default table, producing a fully
//! populated [`BuildRequest`]. Only `manifestPath` is mandatory.
//!
//! # Wire shape
//!
//! ```json
//! { "manifestPath": "/pkg/Cargo.toml", "onlyLib": true, "verbose": 0 }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// How much diagnostic output the toolchain produces.
///
/// Verbosity never changes what gets built or where it lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Verbosity {
  #[default]
  Standard = 0,
  Verbose = 1,
  VeryVerbose = 2,
}

impl Verbosity {
  /// The cargo flag for this level, if any.
  pub fn cargo_flag(self) -> Option<&'static str> {
    match self {
      Verbosity::Standard => None,
      Verbosity::Verbose => Some("-v"),
      Verbosity::VeryVerbose => Some("-vv"),
    }
  }

  /// Clamp an occurrence count (`-v`, `-vv`, ...) to a level.
  pub fn from_occurrences(count: u8) -> Self {
    match count {
      0 => Verbosity::Standard,
      1 => Verbosity::Verbose,
      _ => Verbosity::VeryVerbose,
    }
  }
}

impl TryFrom<u8> for Verbosity {
  type Error = String;

  fn try_from(value: u8) -> Result<Self, Self::Error> {
    match value {
      0 => Ok(Verbosity::Standard),
      1 => Ok(Verbosity::Verbose),
      2 => Ok(Verbosity::VeryVerbose),
      other => Err(format!("verbose must be 0, 1 or 2, got {}", other)),
    }
  }
}

impl From<Verbosity> for u8 {
  fn from(value: Verbosity) -> Self {
    value as u8
  }
}

/// The cargo profile to build with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Profile {
  #[default]
  Release,
  Dev,
  Custom(String),
}

impl Profile {
  pub fn parse(name: &str) -> Result<Self, BuildError> {
    match name {
      "release" => Ok(Profile::Release),
      "dev" | "debug" => Ok(Profile::Dev),
      "" => Err(BuildError::InvalidRequest("profile name is empty".to_string())),
      custom => {
        let valid = custom.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
          return Err(BuildError::InvalidRequest(format!("invalid profile name: {}", custom)));
        }
        Ok(Profile::Custom(custom.to_string()))
      }
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Profile::Release => "release",
      Profile::Dev => "dev",
      Profile::Custom(name) => name,
    }
  }

  /// Directory cargo places this profile's outputs in, below the target dir.
  ///
  /// The built-in `test` and `bench` profiles share the `debug` and
  /// `release` directories; every other custom profile gets its own.
  pub fn dir_name(&self) -> &str {
    match self {
      Profile::Release => "release",
      Profile::Dev => "debug",
      Profile::Custom(name) => match name.as_str() {
        "test" => "debug",
        "bench" => "release",
        name => name,
      },
    }
  }

  /// The output root for this profile: `<target_dir>[/<triple>]/<profile-dir>`.
  ///
  /// Depends only on the resolved target directory, never on what gets built.
  pub fn output_root(&self, target_dir: &Path, triple: Option<&str>) -> PathBuf {
    let base = match triple {
      Some(triple) => target_dir.join(triple),
      None => target_dir.to_path_buf(),
    };
    base.join(self.dir_name())
  }
}

impl TryFrom<String> for Profile {
  type Error = String;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Profile::parse(&value).map_err(|e| e.to_string())
  }
}

impl From<Profile> for String {
  fn from(value: Profile) -> Self {
    value.name().to_string()
  }
}

impl fmt::Display for Profile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A caller-supplied request with every field optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBuildRequest {
  #[serde(default, alias = "manifest_path", skip_serializing_if = "Option::is_none")]
  pub manifest_path: Option<PathBuf>,
  #[serde(default, alias = "only_lib", alias = "lib_only", skip_serializing_if = "Option::is_none")]
  pub only_lib: Option<bool>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub verbose: Option<Verbosity>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub profile: Option<Profile>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub target: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub features: Option<Vec<String>>,
  #[serde(default, alias = "all_features", skip_serializing_if = "Option::is_none")]
  pub all_features: Option<bool>,
  #[serde(default, alias = "no_default_features", skip_serializing_if = "Option::is_none")]
  pub no_default_features: Option<bool>,
  #[serde(default, alias = "target_dir", skip_serializing_if = "Option::is_none")]
  pub target_dir: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub jobs: Option<u32>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub offline: Option<bool>,
}

impl PartialBuildRequest {
  /// Apply the default table field by field.
  ///
  /// Pure: the same partial request always resolves to the same full request.
  pub fn resolve(self) -> Result<BuildRequest, BuildError> {
    let manifest_path = match self.manifest_path {
      Some(path) if !path.as_os_str().is_empty() => path,
      _ => return Err(BuildError::InvalidRequest("manifestPath is required".to_string())),
    };

    if self.jobs == Some(0) {
      return Err(BuildError::InvalidRequest("jobs must be at least 1".to_string()));
    }

    let target = match self.target {
      Some(triple) if triple.trim().is_empty() => {
        return Err(BuildError::InvalidRequest("target triple is empty".to_string()));
      }
      other => other,
    };

    let features: Vec<String> = self
      .features
      .unwrap_or_default()
      .into_iter()
      .map(|f| f.trim().to_string())
      .filter(|f| !f.is_empty())
      .collect();

    Ok(BuildRequest {
      manifest_path,
      only_lib: self.only_lib.unwrap_or(true),
      verbose: self.verbose.unwrap_or_default(),
      profile: self.profile.unwrap_or_default(),
      target,
      features,
      all_features: self.all_features.unwrap_or(false),
      no_default_features: self.no_default_features.unwrap_or(false),
      target_dir: self.target_dir,
      jobs: self.jobs,
      offline: self.offline.unwrap_or(false),
    })
  }
}

/// A fully populated build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
  pub manifest_path: PathBuf,
  /// Restrict the build to the package's library target.
  pub only_lib: bool,
  pub verbose: Verbosity,
  pub profile: Profile,
  pub target: Option<String>,
  pub features: Vec<String>,
  pub all_features: bool,
  pub no_default_features: bool,
  pub target_dir: Option<PathBuf>,
  pub jobs: Option<u32>,
  pub offline: bool,
}

impl BuildRequest {
  /// A request for `manifest_path` with every other field defaulted.
  pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
    Self {
      manifest_path: manifest_path.into(),
      only_lib: true,
      verbose: Verbosity::Standard,
      profile: Profile::Release,
      target: None,
      features: Vec::new(),
      all_features: false,
      no_default_features: false,
      target_dir: None,
      jobs: None,
      offline: false,
    }
  }

  pub fn with_only_lib(mut self, only_lib: bool) -> Self {
    self.only_lib = only_lib;
    self
  }

  pub fn with_verbose(mut self, verbose: Verbosity) -> Self {
    self.verbose = verbose;
    self
  }

  pub fn with_profile(mut self, profile: Profile) -> Self {
    self.profile = profile;
    self
  }

  pub fn with_target(mut self, triple: &str) -> Self {
    self.target = Some(triple.to_string());
    self
  }

  pub fn with_features<I, S>(mut self, features: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.features = features.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.target_dir = Some(dir.into());
    self
  }

  pub fn with_jobs(mut self, jobs: u32) -> Self {
    self.jobs = Some(jobs);
    self
  }

  pub fn with_offline(mut self, offline: bool) -> Self {
    self.offline = offline;
    self
  }
}

impl From<BuildRequest> for PartialBuildRequest {
  fn from(request: BuildRequest) -> Self {
    Self {
      manifest_path: Some(request.manifest_path),
      only_lib: Some(request.only_lib),
      verbose: Some(request.verbose),
      profile: Some(request.profile),
      target: request.target,
      features: Some(request.features),
      all_features: Some(request.all_features),
      no_default_features: Some(request.no_default_features),
      target_dir: request.target_dir,
      jobs: request.jobs,
      offline: Some(request.offline),
    }
  }
}
