//! Playground configuration.
//!
//! Everything has a default matching the hosted playground; a JSON file may override any
//! subset of the fields.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default schema every document is validated against.
pub const DEFAULT_SCHEMA_URL: &str = "https://schemas.opengis.net/covjson/1.0/coveragejson.json";

/// One entry of the examples menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Menu title.
    pub title: String,
    /// Document location, relative to the playground root or absolute.
    pub url: String,
}

impl Example {
    fn bundled(title: &str, basename: &str) -> Self {
        Self {
            title: title.to_string(),
            url: format!("coverages/{basename}.covjson"),
        }
    }
}

/// Tile layer shown under the coverages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseMap {
    /// Tile URL template.
    pub url: String,
    /// Attribution text.
    pub attribution: String,
}

impl Default for BaseMap {
    fn default() -> Self {
        Self {
            url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
        }
    }
}

/// Playground settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaygroundConfig {
    /// Schema loaded when the location does not name one.
    pub schema_url: String,
    /// Examples menu. The first entry is loaded when the location does not name a document.
    pub examples: Vec<Example>,
    /// Initial map center as `[lat, lon]`.
    pub initial_map_center: [f64; 2],
    /// Initial map zoom level.
    pub initial_map_zoom: u8,
    /// Base map tiles.
    pub base_map: BaseMap,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            schema_url: DEFAULT_SCHEMA_URL.to_string(),
            examples: vec![
                Example::bundled("Grid", "grid"),
                Example::bundled("Grid (Categorical)", "grid-categorical"),
                Example::bundled("Grid (Tiled)", "grid-tiled"),
                Example::bundled("Trajectory", "trajectory"),
                Example::bundled("Profile", "profile"),
                Example::bundled("PointSeries", "pointseries"),
                Example::bundled("Point", "point"),
                Example::bundled("Point Collection", "point-collection"),
                Example::bundled("Profile Collection", "profile-collection"),
                Example::bundled("MultiPolygon", "multipolygon"),
                Example::bundled("PolygonSeries", "polygonseries"),
                Example::bundled("Grid (Domain)", "grid-domain"),
                Example::bundled("Grid BNG (Domain)", "grid-domain-bng"),
            ],
            initial_map_center: [10.0, 0.0],
            initial_map_zoom: 2,
            base_map: BaseMap::default(),
        }
    }
}

impl PlaygroundConfig {
    /// Parse a JSON configuration. Missing fields take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        if config.examples.is_empty() {
            return Err(ConfigError::NoExamples);
        }
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// The document shown when nothing else is requested.
    pub fn default_example(&self) -> Option<&Example> {
        self.examples.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlaygroundConfig::default();
        assert_eq!(config.examples.len(), 13);
        assert_eq!(
            config.default_example().map(|e| e.url.as_str()),
            Some("coverages/grid.covjson")
        );
        assert_eq!(config.initial_map_center, [10.0, 0.0]);
        assert_eq!(config.initial_map_zoom, 2);
    }

    #[test]
    fn test_partial_override() {
        let config =
            PlaygroundConfig::from_json_str(r#"{"schemaUrl": "schema.json", "initialMapZoom": 5}"#)
                .unwrap();
        assert_eq!(config.schema_url, "schema.json");
        assert_eq!(config.initial_map_zoom, 5);
        assert_eq!(config.examples.len(), 13);
    }

    #[test]
    fn test_rejects_empty_examples() {
        assert!(matches!(
            PlaygroundConfig::from_json_str(r#"{"examples": []}"#),
            Err(ConfigError::NoExamples)
        ));
        assert!(matches!(
            PlaygroundConfig::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
