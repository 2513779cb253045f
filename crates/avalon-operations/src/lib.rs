pub mod batch;
pub mod context;
pub mod types;

pub mod install;
pub mod list;
pub mod targets;
pub mod uninstall;
pub mod update;
pub mod upgrade;

pub use context::AvalonContext;
pub use types::*;

#[cfg(test)]
pub(crate) mod test_utils;
