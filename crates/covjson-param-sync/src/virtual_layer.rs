//! The non-rendering stand-in observed by legends.

use crate::layer::ParameterKey;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug)]
struct VirtualState {
    key: ParameterKey,
    properties: BTreeMap<String, Value>,
    removed: bool,
    revision: u64,
}

/// Proxy for the unified style of one synchronized parameter.
///
/// Cloning yields another handle to the same proxy. The proxy mirrors the merged values of
/// its sync record; once the record is torn down it is marked removed and never updated again.
#[derive(Debug, Clone)]
pub struct VirtualLayer {
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualLayer {
    pub(crate) fn new(key: ParameterKey) -> Self {
        Self {
            state: Rc::new(RefCell::new(VirtualState {
                key,
                properties: BTreeMap::new(),
                removed: false,
                revision: 0,
            })),
        }
    }

    /// The parameter this proxy stands for.
    pub fn key(&self) -> ParameterKey {
        self.state.borrow().key.clone()
    }

    /// Merged value of a synchronized property.
    pub fn property(&self, name: &str) -> Option<Value> {
        self.state.borrow().properties.get(name).cloned()
    }

    /// Snapshot of all merged values.
    pub fn properties(&self) -> BTreeMap<String, Value> {
        self.state.borrow().properties.clone()
    }

    /// Returns `true` once every real layer for the parameter has been removed.
    pub fn is_removed(&self) -> bool {
        self.state.borrow().removed
    }

    /// Incremented whenever a merged value changes.
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Returns `true` if both handles refer to the same proxy.
    pub fn ptr_eq(&self, other: &VirtualLayer) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn set_property(&self, name: &str, value: Value) {
        let mut state = self.state.borrow_mut();
        if state.properties.get(name) != Some(&value) {
            state.properties.insert(name.to_string(), value);
            state.revision += 1;
        }
    }

    pub(crate) fn mark_removed(&self) {
        self.state.borrow_mut().removed = true;
    }
}
