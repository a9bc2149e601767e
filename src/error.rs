use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("invalid database URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP Error {status} for {url}")]
    Status { status: u16, url: String },

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to download {filename}: {reason}")]
    #[diagnostic(help("partial downloads were removed; rerun to fetch the remaining databases"))]
    Incomplete { filename: String, reason: String },
}
