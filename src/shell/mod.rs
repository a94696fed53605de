//! Command execution and host platform queries.

pub mod command;
pub mod platform;

pub use command::{execute, CommandLine, CommandOptions, CommandResult};
pub use platform::{
    default_os_marker, host_arch, is_ci, is_executable, resolve_tool_path, split_search_path,
};
