mod build;
mod info;
mod request;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use request::cmd_request;
