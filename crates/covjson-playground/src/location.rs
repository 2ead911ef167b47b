//! Document and schema addressed through the location fragment.
//!
//! The fragment uses query-string syntax: `#url=<document>&schema=<schema>`. Links from older
//! playground versions put the document URL directly after the `#`.

use reqwest::Url;

/// Parsed location fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationHash {
    /// Document to load.
    pub url: Option<String>,
    /// Schema to validate against.
    pub schema: Option<String>,
}

impl LocationHash {
    /// Parse a fragment, with or without the leading `#`.
    pub fn parse(fragment: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);

        if fragment.starts_with("http") {
            return Self {
                url: Some(fragment.to_string()),
                schema: None,
            };
        }

        let mut hash = Self::default();
        let Ok(parsed) = Url::parse(&format!("http://localhost/?{fragment}")) else {
            return hash;
        };
        for (name, value) in parsed.query_pairs() {
            if value.is_empty() {
                continue;
            }
            let slot = match name.as_ref() {
                "url" => &mut hash.url,
                "schema" => &mut hash.schema,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        hash
    }

    /// Encode as a fragment (without the leading `#`).
    pub fn to_fragment(&self) -> String {
        let pairs = [("url", &self.url), ("schema", &self.schema)]
            .into_iter()
            .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)));
        Url::parse_with_params("http://localhost/", pairs)
            .ok()
            .and_then(|url| url.query().map(str::to_string))
            .unwrap_or_default()
    }
}

/// What to (re)load after the fragment changed. Schemas are loaded before documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationChange {
    /// New schema URL, if it changed.
    pub schema: Option<String>,
    /// New document URL, if it changed.
    pub url: Option<String>,
}

impl LocationChange {
    /// Returns `true` if nothing needs loading.
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.url.is_none()
    }
}

/// Remembers the last fragment so only changed parts are reloaded.
#[derive(Debug, Clone, Default)]
pub struct LocationTracker {
    last: LocationHash,
}

impl LocationTracker {
    /// Create a tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last fragment seen.
    pub fn last(&self) -> &LocationHash {
        &self.last
    }

    /// Record a new fragment and report which parts changed.
    pub fn update(&mut self, fragment: &str) -> LocationChange {
        let hash = LocationHash::parse(fragment);
        let change = LocationChange {
            schema: hash.schema.clone().filter(|s| self.last.schema.as_ref() != Some(s)),
            url: hash.url.clone().filter(|u| self.last.url.as_ref() != Some(u)),
        };
        self.last = hash;
        change
    }
}
