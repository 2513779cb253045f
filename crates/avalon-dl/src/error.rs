use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(avalon_dl::invalid_url))]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    #[diagnostic(
        code(avalon_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(avalon_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error(transparent)]
    #[diagnostic(code(avalon_dl::io))]
    Io(#[from] std::io::Error),

    #[error("No asset matches `{pattern}`")]
    #[diagnostic(
        code(avalon_dl::no_match),
        help("Available assets:\n{}", .available.join("\n"))
    )]
    NoMatch {
        pattern: String,
        available: Vec<String>,
    },

    #[error("Invalid asset pattern `{pattern}`")]
    #[diagnostic(code(avalon_dl::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid response from {url}: {reason}")]
    #[diagnostic(code(avalon_dl::invalid_response))]
    InvalidResponse { url: String, reason: String },

    #[error("Release feed {url} returned no releases")]
    #[diagnostic(code(avalon_dl::empty_feed))]
    EmptyFeed { url: String },

    #[error("Transfer ended early: received {received} of {expected} bytes")]
    #[diagnostic(
        code(avalon_dl::incomplete),
        help("The connection was closed before the whole file arrived, try again")
    )]
    Incomplete { expected: u64, received: u64 },
}

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
