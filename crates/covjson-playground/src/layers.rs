//! Map layers and map-level notifications.

use crate::coverage::Coverage;
use crate::error::DisplayError;
use covjson_param_sync::{LayerId, ParameterKey, SharedLayer, SyncLayer};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Domain types a single coverage can be rendered as.
pub const SUPPORTED_DOMAIN_TYPES: &[&str] = &[
    "Grid",
    "Point",
    "PointSeries",
    "VerticalProfile",
    "Trajectory",
    "MultiPolygon",
    "PolygonSeries",
];

/// Domain types a whole collection can be rendered as (one layer per parameter).
pub const SUPPORTED_COLLECTION_DOMAIN_TYPES: &[&str] = &["Point", "VerticalProfile"];

/// Creates map layers for coverages.
pub trait LayerFactory {
    /// Returns `true` if `coverage` can be rendered as one layer per parameter.
    ///
    /// Collections for which this is `false` are rendered member by member.
    fn supports(&self, coverage: &Coverage) -> bool {
        let supported = match coverage.coverages {
            Some(_) => SUPPORTED_COLLECTION_DOMAIN_TYPES,
            None => SUPPORTED_DOMAIN_TYPES,
        };
        coverage
            .domain_type()
            .is_some_and(|domain_type| supported.contains(&domain_type))
    }

    /// Create a layer showing parameter `key` of `coverage`.
    fn create(
        &mut self,
        coverage: &Coverage,
        key: &ParameterKey,
    ) -> Result<SharedLayer, DisplayError>;
}

/// The layers created for one parameter, toggled together in the layer control.
#[derive(Clone)]
pub struct LayerGroup {
    key: ParameterKey,
    layers: Vec<(LayerId, SharedLayer)>,
}

impl LayerGroup {
    pub(crate) fn new(key: ParameterKey) -> Self {
        Self {
            key,
            layers: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, id: LayerId, layer: SharedLayer) {
        self.layers.push((id, layer));
    }

    /// The parameter shown by this group.
    pub fn key(&self) -> &ParameterKey {
        &self.key
    }

    /// Layer ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.iter().map(|(id, _)| *id)
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the group has no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub(crate) fn find(&self, id: LayerId) -> Option<&SharedLayer> {
        self.layers
            .iter()
            .find(|(layer_id, _)| *layer_id == id)
            .map(|(_, layer)| layer)
    }
}

impl std::fmt::Debug for LayerGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerGroup")
            .field("key", &self.key)
            .field("layers", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}

/// Map-level notifications bridged by the playground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// Coverage data started loading.
    DataLoading,
    /// Coverage data finished loading (successfully or not).
    DataLoaded,
    /// A coverage layer was created (not yet shown).
    CovLayerCreate {
        /// The layer.
        layer: LayerId,
        /// Parameter it shows.
        key: ParameterKey,
    },
    /// A coverage layer was added to the map.
    CovLayerAdd {
        /// The layer.
        layer: LayerId,
    },
    /// A coverage layer was removed from the map.
    CovLayerRemove {
        /// The layer.
        layer: LayerId,
    },
    /// A layer failed.
    Error {
        /// Error message.
        message: String,
    },
}

/// Map event callback function type
pub type MapEventCallback = Box<dyn FnMut(&MapEvent)>;

/// Property-bag layer with no rendering, used by the command line front end.
///
/// Relative palette extents (`"subset"`, `"fov"`) resolve to the extent of the inline range
/// values, or `null` when none are known.
#[derive(Debug, Clone)]
pub struct DataLayer {
    id: LayerId,
    key: ParameterKey,
    domain_type: Option<String>,
    extent: Option<[f64; 2]>,
    properties: BTreeMap<String, Value>,
}

impl DataLayer {
    /// Create a layer for `key` of `coverage`.
    pub fn new(id: LayerId, coverage: &Coverage, key: &ParameterKey) -> Self {
        let mut layer = Self {
            id,
            key: key.clone(),
            domain_type: coverage.domain_type.clone(),
            extent: coverage_extent(coverage, key),
            properties: BTreeMap::new(),
        };
        layer.set_property("palette", json!("default"));
        layer.set_property("paletteExtent", json!("fov"));
        layer
    }

    /// Domain type of the coverage shown.
    pub fn domain_type(&self) -> Option<&str> {
        self.domain_type.as_deref()
    }
}

impl SyncLayer for DataLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn parameter_key(&self) -> Option<ParameterKey> {
        Some(self.key.clone())
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: Value) {
        let value = match (name, value.as_str()) {
            ("paletteExtent", Some("subset" | "fov")) => {
                self.extent.map_or(Value::Null, |extent| json!(extent))
            }
            _ => value,
        };
        self.properties.insert(name.to_string(), value);
    }
}

fn coverage_extent(coverage: &Coverage, key: &ParameterKey) -> Option<[f64; 2]> {
    let own = coverage.value_extents.get(key).copied();
    let members = coverage
        .coverages
        .iter()
        .flatten()
        .filter_map(|member| coverage_extent(member, key));
    own.into_iter()
        .chain(members)
        .reduce(|[a_min, a_max], [b_min, b_max]| [a_min.min(b_min), a_max.max(b_max)])
}

/// Creates [`DataLayer`]s with sequential ids.
#[derive(Debug, Default)]
pub struct HeadlessLayerFactory {
    next_id: u64,
}

impl HeadlessLayerFactory {
    /// Create a factory whose first layer gets id 1.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayerFactory for HeadlessLayerFactory {
    fn create(
        &mut self,
        coverage: &Coverage,
        key: &ParameterKey,
    ) -> Result<SharedLayer, DisplayError> {
        if !coverage.has_parameter(key) {
            return Err(DisplayError::Layer(format!("coverage has no parameter \"{key}\"")));
        }
        self.next_id += 1;
        let layer = DataLayer::new(LayerId::new(self.next_id), coverage, key);
        Ok(Rc::new(RefCell::new(layer)))
    }
}
