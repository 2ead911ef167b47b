#![warn(missing_docs)]
//! CovJSON ParamSync - Style Synchronization Across Coverage Layers
//!
//! # Overview
//!
//! When several map layers display the same coverage parameter (for example one layer per
//! member of a coverage collection), they should share one palette and one colour extent, and
//! the legend should be shown once per parameter rather than once per layer. [`ParamSync`]
//! groups layers by [`ParameterKey`], merges their synchronized properties with per-property
//! reducers and pushes the merged values back onto every member.
//!
//! A [`VirtualLayer`] stands in for each parameter. It mirrors the merged values and is what
//! legend-like observers attach to via [`SyncEvent::ParameterAdded`].
//!
//! Everything here is single-threaded: layers are shared as `Rc<RefCell<dyn SyncLayer>>`.
//!
//! # Quick Start
//!
//! ```rust
//! use covjson_param_sync::{LayerId, ParamSync, ParameterKey, SyncEvent, SyncLayer};
//! use serde_json::{Value, json};
//! use std::cell::RefCell;
//! use std::collections::HashMap;
//! use std::rc::Rc;
//!
//! struct Layer {
//!     id: LayerId,
//!     props: HashMap<String, Value>,
//! }
//!
//! impl SyncLayer for Layer {
//!     fn id(&self) -> LayerId {
//!         self.id
//!     }
//!     fn parameter_key(&self) -> Option<ParameterKey> {
//!         Some(ParameterKey::new("SST"))
//!     }
//!     fn property(&self, name: &str) -> Option<Value> {
//!         self.props.get(name).cloned()
//!     }
//!     fn set_property(&mut self, name: &str, value: Value) {
//!         self.props.insert(name.to_string(), value);
//!     }
//! }
//!
//! let layer = |id, palette: &str| {
//!     Rc::new(RefCell::new(Layer {
//!         id: LayerId::new(id),
//!         props: HashMap::from([("palette".to_string(), json!(palette))]),
//!     }))
//! };
//!
//! let mut sync = ParamSync::default();
//! sync.subscribe(|event| {
//!     if let SyncEvent::ParameterAdded { key, .. } = event {
//!         println!("show legend for {key}");
//!     }
//! });
//!
//! let first = layer(1, "viridis");
//! let second = layer(2, "magma");
//! sync.add_layer(first.clone()).unwrap();
//! sync.add_layer(second.clone()).unwrap();
//!
//! assert_eq!(second.borrow().props["palette"], json!("viridis"));
//! ```

pub mod error;
pub mod layer;
pub mod reducer;
pub mod sync;
pub mod virtual_layer;

pub use error::{ReducerError, SyncError};
pub use layer::{LayerEvent, LayerEventKind, LayerId, ParameterKey, SharedLayer, SyncLayer};
pub use reducer::{Reducer, SyncProperties, extent_union, keep_first};
pub use sync::{ParamSync, Registration, SyncEvent, SyncEventCallback};
pub use virtual_layer::VirtualLayer;
