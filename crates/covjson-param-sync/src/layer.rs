//! The layer capability ParamSync works against.

use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Opaque identifier of a concrete map layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(u64);

impl LayerId {
    /// Wrap a numeric id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of the variable a layer displays (the coverage parameter key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParameterKey(String);

impl ParameterKey {
    /// Create a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParameterKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ParameterKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A rendered layer whose style can be synchronized.
///
/// Implementations expose a property bag: at least `palette` and `paletteExtent` for the
/// playground's coverage layers.
pub trait SyncLayer {
    /// Stable identifier of this layer instance.
    fn id(&self) -> LayerId;

    /// The single parameter this layer displays, or `None` if it displays zero or several.
    fn parameter_key(&self) -> Option<ParameterKey>;

    /// Current value of a property, `None` if the layer has no such property.
    fn property(&self, name: &str) -> Option<Value>;

    /// Overwrite a property.
    fn set_property(&mut self, name: &str, value: Value);
}

/// Shared handle to a layer. The map owns layers; ParamSync only holds handles.
pub type SharedLayer = Rc<RefCell<dyn SyncLayer>>;

/// What happened to a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEventKind {
    /// The layer was added to the map view.
    Added,
    /// The layer was removed from the map view.
    Removed,
    /// The layer started loading data.
    DataLoading,
    /// The layer finished loading data.
    DataLoaded,
    /// The user moved a time or vertical axis.
    AxisChanged {
        /// Axis name, e.g. `"time"`.
        axis: String,
    },
    /// One of the layer's properties was changed from outside ParamSync.
    PropertyChanged {
        /// Property name.
        property: String,
    },
    /// The layer failed to render.
    Error {
        /// Error message.
        message: String,
    },
}

/// A lifecycle notification raised by a layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEvent {
    /// The layer the event is about.
    pub layer: LayerId,
    /// What happened.
    pub kind: LayerEventKind,
}

impl LayerEvent {
    /// Create an event.
    pub fn new(layer: LayerId, kind: LayerEventKind) -> Self {
        Self { layer, kind }
    }
}
