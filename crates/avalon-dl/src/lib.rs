pub mod download;
pub mod error;
pub mod feed;
pub mod filter;
pub mod github;
pub mod gitlab;
pub mod http;
pub mod http_client;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;
