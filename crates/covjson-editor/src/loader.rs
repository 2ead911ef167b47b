//! Loading documents and schemas over the network.
//!
//! Fetching is delegated to a [`Fetcher`]. Failures never escape as panics or silent drops:
//! the editor surfaces them as [`EditorEvent::Notice`](crate::EditorEvent::Notice) and leaves
//! its previous text / schema in place.
//!
//! [`JsonEditor::load_from_url`] and [`JsonEditor::load_json_schema`] borrow the editor for the
//! duration of the request, so loads issued through them are serialized. Callers that want
//! overlapping requests use [`fetch_document`] / [`fetch_schema`] directly and apply whichever
//! result arrives last (`set_text` / `set_schema`). There is no cancellation and no timeout
//! beyond the transport's own.

use crate::editor::{JsonEditor, ValidationReport};
use crate::error::{FetchError, LoadError};
use crate::format::{FormatOptions, prettify_json_with};
use crate::schema::Schema;
use std::future::Future;
use tracing::{debug, warn};

/// A raw HTTP-like response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// Response body.
    pub body: String,
}

impl FetchResponse {
    /// A `200 OK` response carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport used to retrieve documents and schemas.
pub trait Fetcher {
    /// Retrieve `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchResponse, FetchError>>;
}

async fn fetch_text<F: Fetcher>(fetcher: &F, url: &str) -> Result<String, LoadError> {
    let response = fetcher
        .fetch(url)
        .await
        .map_err(|source| LoadError::Network {
            url: url.to_string(),
            source,
        })?;

    if !response.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: response.status,
            status_text: response.status_text,
        });
    }
    Ok(response.body)
}

/// Fetch a document and apply the single-line reformatting heuristic.
pub async fn fetch_document<F: Fetcher>(
    fetcher: &F,
    url: &str,
    options: &FormatOptions,
) -> Result<String, LoadError> {
    let body = fetch_text(fetcher, url).await?;
    Ok(prettify_json_with(&body, options).into_owned())
}

/// Fetch, parse and compile a schema.
pub async fn fetch_schema<F: Fetcher>(fetcher: &F, url: &str) -> Result<Schema, LoadError> {
    let body = fetch_text(fetcher, url).await?;
    Schema::from_json_str(&body).map_err(|source| LoadError::Schema {
        url: url.to_string(),
        source,
    })
}

impl JsonEditor {
    /// Load a document from `url` into the editor without emitting `change`.
    ///
    /// Loading the same URL twice is harmless: the second load simply replaces the text again.
    pub async fn load_from_url<F: Fetcher>(
        &mut self,
        fetcher: &F,
        url: &str,
    ) -> Result<ValidationReport, LoadError> {
        let format = self.options().format;
        match fetch_document(fetcher, url, &format).await {
            Ok(text) => {
                debug!(url, bytes = text.len(), "document loaded");
                Ok(self.set_text(text))
            }
            Err(err) => {
                warn!(url, error = %err, "document load failed");
                self.notify(err.to_string());
                Err(err)
            }
        }
    }

    /// Load a schema from `url` and make it the active schema.
    ///
    /// The current text is revalidated against the new schema. On failure the previous schema
    /// (or none) stays active.
    pub async fn load_json_schema<F: Fetcher>(
        &mut self,
        fetcher: &F,
        url: &str,
    ) -> Result<ValidationReport, LoadError> {
        match fetch_schema(fetcher, url).await {
            Ok(schema) => {
                debug!(url, "schema loaded");
                self.set_schema(schema);
                Ok(self.revalidate())
            }
            Err(err) => {
                warn!(url, error = %err, "schema load failed");
                self.notify(err.to_string());
                Err(err)
            }
        }
    }
}
