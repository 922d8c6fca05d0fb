use anyhow::{Context, Result};
use serde::Serialize;

use kiln_lib::consts::APP_NAME;
use kiln_lib::{Cargo, Config};

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_warning};

#[derive(Debug, Serialize)]
struct Info {
  version: &'static str,
  cargo: String,
  cargo_version: Option<String>,
  target_dir: Option<String>,
}

pub fn cmd_info(format: OutputFormat) -> Result<()> {
  let config = Config::from_env();
  let cargo = Cargo::from_config(&config);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let cargo_version = match rt.block_on(cargo.version()) {
    Ok(version) => Some(version),
    Err(e) => {
      tracing::debug!(error = %e, "cargo --version failed");
      None
    }
  };

  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    cargo: config.cargo.display().to_string(),
    cargo_version,
    target_dir: config.target_dir.as_ref().map(|d| d.display().to_string()),
  };

  if format.is_json() {
    return print_json(&info);
  }

  print_info(&format!("{} v{}", APP_NAME, info.version));
  print_stat("Cargo", &info.cargo);
  match &info.cargo_version {
    Some(version) => print_stat("Toolchain", version),
    None => print_warning("Could not run cargo; set KILN_CARGO to point at it"),
  }
  print_stat("Target dir", info.target_dir.as_deref().unwrap_or("(cargo default)"));

  Ok(())
}
