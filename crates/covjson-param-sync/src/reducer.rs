//! Property reducers.
//!
//! A reducer combines the value already merged for a parameter with the value of another
//! member layer. Reducers are applied in member registration order, so a reducer that is not
//! commutative makes the merged value depend on the order layers were added.

use crate::error::ReducerError;
use serde_json::Value;
use std::fmt;

/// Binary merge function for one property.
pub type Reducer = Box<dyn Fn(&Value, &Value) -> Result<Value, ReducerError>>;

/// Keeps the value of the layer that joined first.
pub fn keep_first(first: &Value, _other: &Value) -> Result<Value, ReducerError> {
    Ok(first.clone())
}

/// Union of two `[min, max]` extents, `null` unless both sides are numeric extents.
pub fn extent_union(a: &Value, b: &Value) -> Result<Value, ReducerError> {
    match (extent(a), extent(b)) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => {
            Ok(serde_json::json!([a_min.min(b_min), a_max.max(b_max)]))
        }
        _ => Ok(Value::Null),
    }
}

fn extent(value: &Value) -> Option<(f64, f64)> {
    match value.as_array()?.as_slice() {
        [min, max] => Some((min.as_f64()?, max.as_f64()?)),
        _ => None,
    }
}

/// The set of synchronized properties and their reducers.
///
/// Properties without a reducer are not synchronized: each layer keeps its own value.
#[derive(Default)]
pub struct SyncProperties {
    reducers: Vec<(String, Reducer)>,
}

impl SyncProperties {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// The playground configuration: `palette` keeps the first value, `paletteExtent` is the
    /// union of all extents.
    pub fn playground() -> Self {
        Self::new()
            .with("palette", keep_first)
            .with("paletteExtent", extent_union)
    }

    /// Register (or replace) the reducer for `name`.
    pub fn with<F>(mut self, name: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, ReducerError> + 'static,
    {
        let name = name.into();
        let reducer: Reducer = Box::new(reducer);
        match self.reducers.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = reducer,
            None => self.reducers.push((name, reducer)),
        }
        self
    }

    /// Synchronized property names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reducers.iter().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if `name` is synchronized.
    pub fn contains(&self, name: &str) -> bool {
        self.reducers.iter().any(|(existing, _)| existing == name)
    }

    /// Number of synchronized properties.
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Returns `true` if nothing is synchronized.
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    /// Fold `values` with the reducer for `name`. `None` if there are no values or no reducer.
    pub(crate) fn fold<'a>(
        &self,
        name: &str,
        mut values: impl Iterator<Item = &'a Value>,
    ) -> Option<Result<Value, ReducerError>> {
        let (_, reducer) = self.reducers.iter().find(|(existing, _)| existing == name)?;
        let first = values.next()?.clone();
        Some(values.try_fold(first, |acc, value| reducer(&acc, value)))
    }
}

impl fmt::Debug for SyncProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
