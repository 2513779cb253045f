use error::AvalonError;

pub mod cache;
pub mod constants;
pub mod error;
pub mod progress;
pub mod provider;
pub mod registry;
pub mod store;
pub mod task;

pub type AvalonResult<T> = std::result::Result<T, AvalonError>;

#[cfg(test)]
pub(crate) mod test_support;
