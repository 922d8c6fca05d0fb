//! Build results and artifact classification.
//!
//! # Submodules
//!
//! - [`classify`] - Mapping of toolchain output to classified artifacts

pub mod classify;
mod types;

pub use classify::Classifier;
pub use types::*;
