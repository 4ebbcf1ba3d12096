//! InfoPoint client error types.

/// Errors from the InfoPoint HTTP client.
///
/// Any of these means the affected stop gets no data this run; the run
/// loop omits the stop from the new snapshot rather than pretending the
/// feed reported nothing.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },
}
