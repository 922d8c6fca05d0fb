//! kiln-lib: build invoker for Rust packages
//!
//! Given a package manifest, kiln drives cargo to compile it and reports the
//! produced files as classified [`Artifact`]s:
//! - `request`: what to build (`BuildRequest`) and its defaults
//! - `manifest`: validation and target discovery for `Cargo.toml`
//! - `toolchain`: the `Toolchain` seam and the `Cargo` implementation
//! - `artifact`: build results and artifact classification
//! - `invoker`: the single `build` operation tying these together
//! - `wire`: JSON encoding of requests, results and errors

pub mod artifact;
pub mod config;
pub mod consts;
pub mod error;
pub mod invoker;
pub mod manifest;
pub mod request;
pub mod toolchain;
pub mod util;
pub mod wire;

pub use artifact::{Artifact, BuildResult};
pub use config::Config;
pub use error::{BuildError, ErrorKind};
pub use invoker::BuildInvoker;
pub use request::{BuildRequest, PartialBuildRequest, Profile, Verbosity};
pub use toolchain::{Cargo, Toolchain};
