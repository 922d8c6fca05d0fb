//! Implementation of the `kiln build` command.
//!
//! Translates command-line flags into a build request, runs it, and prints
//! the artifact list (or the failure) in the selected format.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use kiln_lib::wire::encode_error;
use kiln_lib::{BuildError, BuildInvoker, BuildRequest, BuildResult, Config, PartialBuildRequest, Profile, Verbosity};

use crate::output::{
  OutputFormat, format_bytes, format_duration, print_error, print_json, print_stat, print_success, print_warning,
  symbols,
};

#[derive(Debug, Args)]
pub struct BuildArgs {
  /// Path to the package manifest
  #[arg(default_value = "Cargo.toml")]
  pub manifest: PathBuf,

  /// Build every target, not just the library
  #[arg(long)]
  pub all_targets: bool,

  /// Build profile (release, dev, or a custom profile name)
  #[arg(long)]
  pub profile: Option<String>,

  /// Target triple to build for
  #[arg(long)]
  pub target: Option<String>,

  /// Features to activate (repeatable or comma separated)
  #[arg(short = 'F', long, value_delimiter = ',')]
  pub features: Vec<String>,

  /// Activate all available features
  #[arg(long)]
  pub all_features: bool,

  /// Do not activate the `default` feature
  #[arg(long)]
  pub no_default_features: bool,

  /// Directory for all generated artifacts
  #[arg(long)]
  pub target_dir: Option<PathBuf>,

  /// Number of parallel jobs
  #[arg(short, long)]
  pub jobs: Option<u32>,

  /// Run without accessing the network
  #[arg(long)]
  pub offline: bool,

  /// Output format
  #[arg(short = 'o', long, value_enum, default_value = "text")]
  pub output: OutputFormat,
}

impl BuildArgs {
  fn to_request(&self, verbose: u8) -> Result<BuildRequest, BuildError> {
    let profile = self.profile.as_deref().map(Profile::parse).transpose()?;

    PartialBuildRequest {
      manifest_path: Some(self.manifest.clone()),
      only_lib: Some(!self.all_targets),
      verbose: Some(Verbosity::from_occurrences(verbose)),
      profile,
      target: self.target.clone(),
      features: Some(self.features.clone()),
      all_features: Some(self.all_features),
      no_default_features: Some(self.no_default_features),
      target_dir: self.target_dir.clone(),
      jobs: self.jobs,
      offline: Some(self.offline),
    }
    .resolve()
  }
}

/// Execute the build command.
///
/// Exits the process with status 1 when the build fails.
pub fn cmd_build(args: BuildArgs, verbose: u8) -> Result<()> {
  let format = args.output;
  let start = Instant::now();

  let outcome = match args.to_request(verbose) {
    Ok(request) => {
      debug!(request = ?request, "resolved build request");
      let invoker = BuildInvoker::from_config(&Config::from_env());
      let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
      rt.block_on(invoker.build(&request))
    }
    Err(e) => Err(e),
  };

  match outcome {
    Ok(result) => {
      if format.is_json() {
        print_json(&result)?;
      } else {
        print_summary(&result, start.elapsed());
      }
      Ok(())
    }
    Err(err) => {
      report_failure(&err, format)?;
      std::process::exit(1);
    }
  }
}

fn print_summary(result: &BuildResult, elapsed: Duration) {
  if result.artifacts.is_empty() {
    print_warning("Build succeeded but produced no artifacts");
  } else {
    print_success(&format!(
      "Built {} artifact(s) in {}",
      result.artifacts.len(),
      format_duration(elapsed)
    ));
  }
  print_stat("Output root", &result.output_root.display().to_string());

  if result.artifacts.is_empty() {
    return;
  }

  println!();
  for artifact in &result.artifacts {
    let relative = artifact
      .output_path
      .strip_prefix(&result.output_root)
      .unwrap_or(&artifact.output_path);
    let size = std::fs::metadata(&artifact.output_path)
      .map(|m| format_bytes(m.len()))
      .unwrap_or_else(|_| "?".to_string());

    println!(
      "  {} {} [{}] ({})",
      symbols::INFO,
      relative.display(),
      artifact.kind_labels().join(", "),
      size
    );
  }
}

fn report_failure(err: &BuildError, format: OutputFormat) -> Result<()> {
  if format.is_json() {
    let body = encode_error(err).context("Failed to serialize error")?;
    println!("{}", String::from_utf8_lossy(&body));
    return Ok(());
  }

  print_error(&err.to_string());
  if let Some(diagnostics) = err.diagnostics() {
    let diagnostics = diagnostics.trim_end();
    if !diagnostics.is_empty() {
      eprintln!();
      eprintln!("{}", diagnostics);
    }
  }
  Ok(())
}
