#![warn(missing_docs)]
//! CovJSON Playground - Application Glue
//!
//! # Overview
//!
//! The playground shows a CoverageJSON document on a map next to a live-validating editor.
//! This crate wires the pieces together without owning any rendering:
//!
//! - [`covjson_editor::JsonEditor`] holds the text and emits `change` for parseable edits.
//! - A [`CoverageReader`] turns the parsed document into a [`Coverage`].
//! - A [`LayerFactory`] creates one map layer per parameter (or per collection member).
//! - [`covjson_param_sync::ParamSync`] keeps palettes consistent across layers that show
//!   the same parameter.
//! - [`LocationHash`] / [`LocationTracker`] address the document and schema via the
//!   location fragment.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use covjson_playground::{
//!     HeadlessLayerFactory, JsonCoverageReader, Playground, PlaygroundConfig, PlaygroundFetcher,
//! };
//!
//! # async fn run() -> Result<(), covjson_param_sync::SyncError> {
//! let mut playground = Playground::new(
//!     PlaygroundConfig::default(),
//!     PlaygroundFetcher::new("."),
//!     JsonCoverageReader,
//!     HeadlessLayerFactory::new(),
//! );
//! playground.start("#url=coverages/grid.covjson").await?;
//!
//! for diagnostic in playground.editor().diagnostics() {
//!     println!("{diagnostic}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod coverage;
pub mod error;
pub mod fetch;
pub mod layers;
pub mod location;

pub use config::{BaseMap, DEFAULT_SCHEMA_URL, Example, PlaygroundConfig};
pub use controller::{DisplayOutcome, Playground};
pub use coverage::{Coverage, CoverageKind, CoverageReader, JsonCoverageReader};
pub use error::{ConfigError, DisplayError, ReadError};
pub use fetch::PlaygroundFetcher;
pub use layers::{
    DataLayer, HeadlessLayerFactory, LayerFactory, LayerGroup, MapEvent, MapEventCallback,
    SUPPORTED_COLLECTION_DOMAIN_TYPES, SUPPORTED_DOMAIN_TYPES,
};
pub use location::{LocationChange, LocationHash, LocationTracker};
