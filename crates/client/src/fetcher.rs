//! Artifact download.
//!
//! Turns an [`ArtifactRef`] into a locally held [`ArtifactHandle`] by
//! fetching the video bytes over HTTP. The service requires the
//! operation's API key as a query parameter; a session cookie, when the
//! job captured one, rides along as a header.

use veobatch_core::{ArtifactHandle, AuthContext};

use crate::error::ClientError;
use crate::generator::ArtifactRef;

/// Downloads generated artifacts.
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl Default for ArtifactFetcher {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl ArtifactFetcher {
    /// Create a fetcher reusing an existing connection pool.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download the artifact behind `artifact`, attaching the cookie
    /// from `auth` when present.
    ///
    /// Fails with [`ClientError::Download`] carrying the status code and
    /// response body on any non-success response.
    pub async fn fetch(
        &self,
        artifact: &ArtifactRef,
        auth: &AuthContext,
    ) -> Result<ArtifactHandle, ClientError> {
        let url = download_url(&artifact.uri, &artifact.api_key);

        let mut request = self.client.get(&url);
        if let Some(cookie) = auth.cookie.as_deref().filter(|c| !c.is_empty()) {
            request = request.header(reqwest::header::COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(ClientError::Download {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        tracing::debug!(url = %artifact.uri, size = bytes.len(), "Artifact downloaded");
        Ok(ArtifactHandle::new(bytes.to_vec()))
    }
}

/// Append the API key as a query parameter, respecting whether the URI
/// already carries a query string.
fn download_url(uri: &str, api_key: &str) -> String {
    let separator = if uri.contains('?') { '&' } else { '?' };
    format!("{uri}{separator}key={api_key}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
