pub const APP_NAME: &str = "kiln";

/// Overrides the cargo binary used for builds.
pub const ENV_CARGO: &str = "KILN_CARGO";

/// Set by cargo itself for build scripts and `cargo run`/`cargo test` children.
pub const ENV_CARGO_FALLBACK: &str = "CARGO";

/// Default target directory when a request does not name one.
pub const ENV_TARGET_DIR: &str = "KILN_TARGET_DIR";

pub const DEFAULT_CARGO: &str = "cargo";
