//! Implementation of the `kiln request` command.
//!
//! Reads one JSON build request from a file or stdin, serves it, and writes
//! the JSON response to stdout. The process exits with status 1 when the
//! response is an error envelope.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use kiln_lib::wire::{Response, dispatch};
use kiln_lib::{BuildInvoker, Config};

pub fn cmd_request(file: &Path) -> Result<()> {
  let input = read_input(file)?;

  let invoker = BuildInvoker::from_config(&Config::from_env());
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let body = rt.block_on(dispatch(&invoker, &input));

  println!("{}", String::from_utf8_lossy(&body));

  if matches!(serde_json::from_slice::<Response>(&body), Ok(Response::Err { .. })) {
    std::process::exit(1);
  }
  Ok(())
}

fn read_input(file: &Path) -> Result<Vec<u8>> {
  if file == Path::new("-") {
    let mut input = Vec::new();
    std::io::stdin()
      .read_to_end(&mut input)
      .context("Failed to read request from stdin")?;
    return Ok(input);
  }

  std::fs::read(file).with_context(|| format!("Failed to read request file: {}", file.display()))
}
