mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cmd::{BuildArgs, cmd_build, cmd_info, cmd_request};
use output::OutputFormat;

/// kiln - build Rust packages and report their artifacts
#[derive(Parser)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase verbosity (-v, -vv)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build a package and list its artifacts
  Build(BuildArgs),

  /// Serve a JSON build request and print the JSON response
  Request {
    /// Request file, or `-` for stdin
    #[arg(default_value = "-")]
    file: PathBuf,
  },

  /// Show resolved configuration and toolchain
  Info {
    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  match cli.command {
    Commands::Build(args) => cmd_build(args, cli.verbose),
    Commands::Request { file } => cmd_request(&file),
    Commands::Info { output } => cmd_info(output),
  }
}

/// `RUST_LOG` wins unless `-v` was given.
fn init_logging(verbose: u8) {
  let filter = match verbose {
    0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    1 => EnvFilter::new("debug"),
    _ => EnvFilter::new("trace"),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}
