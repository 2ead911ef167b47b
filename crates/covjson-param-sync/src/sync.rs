//! Sync records and the ParamSync engine.
//!
//! ```text
//! add_layer(L) ──► key(L)? ──none──► Ignored
//!                    │
//!                    ▼
//!           record for key? ──no──► create record + VirtualLayer ──► ParameterAdded
//!                    │
//!                    ▼
//!       merged = fold(reducer, members' own values in join order)
//!                    ▼
//!       push changed merged values to every member and the VirtualLayer
//! ```
//!
//! Removing the last member tears the record down and emits `ParameterRemoved`. A later
//! layer with the same key starts over with a fresh record and proxy.

use crate::error::SyncError;
use crate::layer::{LayerEvent, LayerEventKind, LayerId, ParameterKey, SharedLayer};
use crate::reducer::SyncProperties;
use crate::virtual_layer::VirtualLayer;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Notifications for legend-like observers.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The first layer for a parameter was added.
    ParameterAdded {
        /// The parameter.
        key: ParameterKey,
        /// Proxy carrying the merged style.
        layer: VirtualLayer,
    },
    /// The last layer for a parameter was removed.
    ParameterRemoved {
        /// The parameter.
        key: ParameterKey,
        /// The torn-down proxy (already marked removed).
        layer: VirtualLayer,
    },
}

/// ParamSync event callback function type
pub type SyncEventCallback = Box<dyn FnMut(&SyncEvent)>;

/// Outcome of [`ParamSync::add_layer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The layer created a new record for its parameter.
    Created(ParameterKey),
    /// The layer joined an existing record.
    Joined(ParameterKey),
    /// The layer displays no single parameter and is not synchronized.
    Ignored,
}

struct Member {
    id: LayerId,
    layer: SharedLayer,
    /// The layer's own values, before merged values were pushed onto it.
    own: HashMap<String, Value>,
}

struct SyncRecord {
    members: Vec<Member>,
    proxy: VirtualLayer,
}

/// Keeps synchronized properties consistent across layers showing the same parameter.
pub struct ParamSync {
    properties: SyncProperties,
    records: HashMap<ParameterKey, SyncRecord>,
    memberships: HashMap<LayerId, ParameterKey>,
    callbacks: Vec<SyncEventCallback>,
}

impl ParamSync {
    /// Create an engine synchronizing `properties`.
    pub fn new(properties: SyncProperties) -> Self {
        Self {
            properties,
            records: HashMap::new(),
            memberships: HashMap::new(),
            callbacks: Vec::new(),
        }
    }

    /// Subscribe to parameter added/removed notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SyncEvent) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// The synchronized properties.
    pub fn properties(&self) -> &SyncProperties {
        &self.properties
    }

    /// Number of live records (distinct parameters on the map).
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if `id` is a member of some record.
    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.memberships.contains_key(&id)
    }

    /// The proxy for `key`, if a record exists.
    pub fn virtual_layer(&self, key: &ParameterKey) -> Option<VirtualLayer> {
        self.records.get(key).map(|record| record.proxy.clone())
    }

    /// Member layer ids for `key`, in join order.
    pub fn members(&self, key: &ParameterKey) -> Vec<LayerId> {
        self.records
            .get(key)
            .map(|record| record.members.iter().map(|member| member.id).collect())
            .unwrap_or_default()
    }

    /// Register a layer and converge all layers of its parameter onto the merged values.
    ///
    /// Each layer instance must be added at most once while it is registered. If a reducer
    /// fails, nothing is changed and the error is returned.
    pub fn add_layer(&mut self, layer: SharedLayer) -> Result<Registration, SyncError> {
        let (id, key, own) = {
            let current = layer.try_borrow().map_err(|_| SyncError::NewLayerBusy)?;
            let id = current.id();
            let Some(key) = current.parameter_key() else {
                debug!(layer = %id, "layer has no single parameter, not synchronized");
                return Ok(Registration::Ignored);
            };
            let own: HashMap<String, Value> = self
                .properties
                .names()
                .filter_map(|name| current.property(name).map(|value| (name.to_string(), value)))
                .collect();
            (id, key, own)
        };

        if self.memberships.contains_key(&id) {
            return Err(SyncError::AlreadyRegistered(id));
        }

        let member = Member { id, layer, own };
        let created = !self.records.contains_key(&key);

        let mut members: Vec<&HashMap<String, Value>> = match self.records.get(&key) {
            Some(record) => record.members.iter().map(|m| &m.own).collect(),
            None => Vec::new(),
        };
        members.push(&member.own);
        let merged = merge(&self.properties, &members)?;
        drop(members);

        let record = self.records.entry(key.clone()).or_insert_with(|| SyncRecord {
            members: Vec::new(),
            proxy: VirtualLayer::new(key.clone()),
        });
        record.members.push(member);
        if let Err(err) = apply(record, &merged) {
            record.members.pop();
            if created {
                self.records.remove(&key);
            }
            return Err(err);
        }
        self.memberships.insert(id, key.clone());

        if created {
            debug!(layer = %id, parameter = %key, "sync record created");
            let event = SyncEvent::ParameterAdded {
                key: key.clone(),
                layer: record.proxy.clone(),
            };
            self.emit(&event);
            Ok(Registration::Created(key))
        } else {
            debug!(layer = %id, parameter = %key, "layer joined sync record");
            Ok(Registration::Joined(key))
        }
    }

    /// Evict a layer. Returns `false` if it was not a member.
    ///
    /// Remaining members are re-merged from their own values. Evicting the last member tears
    /// the record down.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<bool, SyncError> {
        let Some(key) = self.memberships.get(&id).cloned() else {
            return Ok(false);
        };
        let Some(record) = self.records.get_mut(&key) else {
            self.memberships.remove(&id);
            return Ok(false);
        };
        let Some(index) = record.members.iter().position(|member| member.id == id) else {
            self.memberships.remove(&id);
            return Ok(false);
        };

        if record.members.len() == 1 {
            self.memberships.remove(&id);
            if let Some(record) = self.records.remove(&key) {
                record.proxy.mark_removed();
                debug!(layer = %id, parameter = %key, "sync record removed");
                self.emit(&SyncEvent::ParameterRemoved {
                    key,
                    layer: record.proxy,
                });
            }
            return Ok(true);
        }

        let remaining: Vec<&HashMap<String, Value>> = record
            .members
            .iter()
            .filter(|member| member.id != id)
            .map(|member| &member.own)
            .collect();
        let merged = merge(&self.properties, &remaining)?;
        drop(remaining);

        let evicted = record.members.remove(index);
        if let Err(err) = apply(record, &merged) {
            record.members.insert(index, evicted);
            return Err(err);
        }
        self.memberships.remove(&id);
        debug!(layer = %id, parameter = %key, "layer left sync record");
        Ok(true)
    }

    /// Re-read `name` from a member layer whose property changed outside ParamSync, then
    /// re-merge and propagate.
    pub fn property_changed(&mut self, id: LayerId, name: &str) -> Result<(), SyncError> {
        if !self.properties.contains(name) {
            return Ok(());
        }
        let record = self
            .memberships
            .get(&id)
            .and_then(|key| self.records.get_mut(key))
            .ok_or(SyncError::NotRegistered(id))?;
        let index = record
            .members
            .iter()
            .position(|member| member.id == id)
            .ok_or(SyncError::NotRegistered(id))?;

        let value = record.members[index]
            .layer
            .try_borrow()
            .map_err(|_| SyncError::LayerBusy(id))?
            .property(name);
        let mut own = record.members[index].own.clone();
        match value {
            Some(value) => own.insert(name.to_string(), value),
            None => own.remove(name),
        };

        let members: Vec<&HashMap<String, Value>> = record
            .members
            .iter()
            .enumerate()
            .map(|(i, member)| if i == index { &own } else { &member.own })
            .collect();
        let merged = merge(&self.properties, &members)?;
        drop(members);

        apply(record, &merged)?;
        record.members[index].own = own;
        Ok(())
    }

    /// Route a layer lifecycle notification.
    ///
    /// `Removed` evicts the layer and `PropertyChanged` re-merges. Additions need the layer
    /// handle and go through [`add_layer`](Self::add_layer); everything else is ignored.
    pub fn handle_layer_event(&mut self, event: &LayerEvent) -> Result<(), SyncError> {
        match &event.kind {
            LayerEventKind::Removed => self.remove_layer(event.layer).map(|_| ()),
            LayerEventKind::PropertyChanged { property } => {
                if self.contains_layer(event.layer) {
                    self.property_changed(event.layer, property)
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    fn emit(&mut self, event: &SyncEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}

impl Default for ParamSync {
    fn default() -> Self {
        Self::new(SyncProperties::playground())
    }
}

fn merge(
    properties: &SyncProperties,
    members: &[&HashMap<String, Value>],
) -> Result<HashMap<String, Value>, SyncError> {
    let mut merged = HashMap::new();
    for name in properties.names() {
        let values = members.iter().filter_map(|own| own.get(name));
        if let Some(result) = properties.fold(name, values) {
            let value = result.map_err(|source| SyncError::Reducer {
                property: name.to_string(),
                source,
            })?;
            merged.insert(name.to_string(), value);
        }
    }
    Ok(merged)
}

/// Push merged values to every member and the proxy. Fails before writing anything if a
/// member is borrowed elsewhere.
fn apply(record: &SyncRecord, merged: &HashMap<String, Value>) -> Result<(), SyncError> {
    let mut layers = Vec::with_capacity(record.members.len());
    for member in &record.members {
        let layer = member
            .layer
            .try_borrow_mut()
            .map_err(|_| SyncError::LayerBusy(member.id))?;
        layers.push(layer);
    }

    for (name, value) in merged {
        for layer in &mut layers {
            if layer.property(name).as_ref() != Some(value) {
                layer.set_property(name, value.clone());
            }
        }
        record.proxy.set_property(name, value.clone());
    }
    Ok(())
}
