/// Errors from the remote generation and download layers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No API key available, neither per-job nor process-wide.
    #[error("API key is not configured: {0}")]
    Configuration(String),

    /// The generation service rejected or failed the operation.
    #[error("Video generation failed: {0}")]
    RemoteService(String),

    /// Artifact download returned a non-success response.
    #[error("Failed to download video ({status}): {body}")]
    Download {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}
