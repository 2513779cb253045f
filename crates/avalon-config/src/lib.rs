pub mod annotations;
pub mod config;
pub mod error;
pub mod provider;

#[cfg(test)]
pub mod test_utils;
