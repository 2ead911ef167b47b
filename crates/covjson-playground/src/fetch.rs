//! HTTP and file-system transport for the editor loaders.

use covjson_editor::{FetchError, FetchResponse, Fetcher};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Fetches `http(s)://` URLs with `reqwest` and everything else from the file system.
///
/// Relative paths (such as the bundled `coverages/*.covjson` examples) resolve against
/// `root`. Missing files answer `404 Not Found`, like a static file server would.
#[derive(Debug, Clone)]
pub struct PlaygroundFetcher {
    client: reqwest::Client,
    root: PathBuf,
}

impl PlaygroundFetcher {
    /// Create a fetcher serving relative paths from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_client(reqwest::Client::new(), root)
    }

    /// Create a fetcher with a preconfigured HTTP client.
    pub fn with_client(client: reqwest::Client, root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            root: root.into(),
        }
    }

    async fn fetch_http(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::new(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| FetchError::new(err.to_string()))?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "http fetch");

        Ok(FetchResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    async fn fetch_file(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let path = match url.strip_prefix("file://") {
            Some(path) => PathBuf::from(path),
            None => self.root.join(url),
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => {
                debug!(path = %path.display(), bytes = body.len(), "file fetch");
                Ok(FetchResponse::ok(body))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(FetchResponse {
                status: 404,
                status_text: "Not Found".to_string(),
                body: String::new(),
            }),
            Err(err) => Err(FetchError::new(format!("{}: {err}", path.display()))),
        }
    }
}

impl Fetcher for PlaygroundFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url).await
        } else {
            self.fetch_file(url).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PlaygroundFetcher {
        PlaygroundFetcher::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
    }

    #[tokio::test]
    async fn test_relative_path_reads_file() {
        let response = fixtures().fetch("coverages/grid.covjson").await.unwrap();
        assert!(response.is_success());
        assert!(response.body.contains("\"Grid\""));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let response = fixtures().fetch("coverages/nope.covjson").await.unwrap();
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }
}
