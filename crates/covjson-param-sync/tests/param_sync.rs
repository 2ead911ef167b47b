//! Layer registration, convergence and record teardown.

use covjson_param_sync::{
    LayerEvent, LayerEventKind, LayerId, ParamSync, ParameterKey, Registration, SyncEvent,
    SyncLayer,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct MapLayer {
    id: LayerId,
    key: Option<ParameterKey>,
    props: HashMap<String, Value>,
}

impl SyncLayer for MapLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn parameter_key(&self) -> Option<ParameterKey> {
        self.key.clone()
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.props.get(name).cloned()
    }

    fn set_property(&mut self, name: &str, value: Value) {
        self.props.insert(name.to_string(), value);
    }
}

fn map_layer(id: u64, key: &str, palette: &str, extent: [f64; 2]) -> Rc<RefCell<MapLayer>> {
    Rc::new(RefCell::new(MapLayer {
        id: LayerId::new(id),
        key: Some(ParameterKey::new(key)),
        props: HashMap::from([
            ("palette".to_string(), json!(palette)),
            ("paletteExtent".to_string(), json!(extent)),
        ]),
    }))
}

fn prop(layer: &Rc<RefCell<MapLayer>>, name: &str) -> Value {
    layer.borrow().props[name].clone()
}

#[derive(Debug, PartialEq)]
enum Seen {
    Added(String),
    Removed(String),
}

fn recording(sync: &mut ParamSync) -> Rc<RefCell<Vec<Seen>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_clone = Rc::clone(&seen);
    sync.subscribe(move |event| {
        let entry = match event {
            SyncEvent::ParameterAdded { key, .. } => Seen::Added(key.to_string()),
            SyncEvent::ParameterRemoved { key, .. } => Seen::Removed(key.to_string()),
        };
        seen_clone.borrow_mut().push(entry);
    });
    seen
}

#[test]
fn test_layers_sharing_a_parameter_converge_on_first_palette() {
    let mut sync = ParamSync::default();
    let seen = recording(&mut sync);
    let l1 = map_layer(1, "SST", "viridis", [270.0, 290.0]);
    let l2 = map_layer(2, "SST", "magma", [280.0, 300.0]);

    assert_eq!(
        sync.add_layer(l1.clone()).unwrap(),
        Registration::Created(ParameterKey::new("SST"))
    );
    assert_eq!(
        sync.add_layer(l2.clone()).unwrap(),
        Registration::Joined(ParameterKey::new("SST"))
    );

    assert_eq!(prop(&l1, "palette"), json!("viridis"));
    assert_eq!(prop(&l2, "palette"), json!("viridis"));
    assert_eq!(prop(&l1, "paletteExtent"), json!([270.0, 300.0]));
    assert_eq!(prop(&l2, "paletteExtent"), json!([270.0, 300.0]));
    assert_eq!(*seen.borrow(), vec![Seen::Added("SST".to_string())]);

    let proxy = sync.virtual_layer(&ParameterKey::new("SST")).unwrap();
    assert_eq!(proxy.property("palette"), Some(json!("viridis")));
    assert_eq!(proxy.property("paletteExtent"), Some(json!([270.0, 300.0])));
}

#[test]
fn test_distinct_parameters_are_independent() {
    let mut sync = ParamSync::default();
    let seen = recording(&mut sync);
    let sst = map_layer(1, "SST", "viridis", [0.0, 1.0]);
    let sal = map_layer(2, "SALINITY", "magma", [30.0, 40.0]);

    sync.add_layer(sst.clone()).unwrap();
    sync.add_layer(sal.clone()).unwrap();

    assert_eq!(sync.record_count(), 2);
    assert_eq!(prop(&sal, "palette"), json!("magma"));
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_removal_remerges_from_remaining_layers() {
    let mut sync = ParamSync::default();
    let l1 = map_layer(1, "SST", "viridis", [0.0, 10.0]);
    let l2 = map_layer(2, "SST", "magma", [5.0, 20.0]);
    let l3 = map_layer(3, "SST", "inferno", [8.0, 12.0]);
    for layer in [&l1, &l2, &l3] {
        sync.add_layer(layer.clone()).unwrap();
    }
    assert_eq!(prop(&l3, "paletteExtent"), json!([0.0, 20.0]));

    assert!(sync.remove_layer(LayerId::new(1)).unwrap());

    assert_eq!(
        sync.members(&ParameterKey::new("SST")),
        vec![LayerId::new(2), LayerId::new(3)]
    );
    assert_eq!(prop(&l2, "palette"), json!("magma"));
    assert_eq!(prop(&l3, "palette"), json!("magma"));
    assert_eq!(prop(&l3, "paletteExtent"), json!([5.0, 20.0]));
}

#[test]
fn test_teardown_and_fresh_record() {
    let mut sync = ParamSync::default();
    let seen = recording(&mut sync);
    let l1 = map_layer(1, "SST", "viridis", [0.0, 1.0]);
    let l2 = map_layer(2, "SST", "magma", [0.0, 1.0]);
    sync.add_layer(l1.clone()).unwrap();
    sync.add_layer(l2.clone()).unwrap();
    let old_proxy = sync.virtual_layer(&ParameterKey::new("SST")).unwrap();

    sync.handle_layer_event(&LayerEvent::new(LayerId::new(1), LayerEventKind::Removed))
        .unwrap();
    assert_eq!(seen.borrow().len(), 1);
    sync.handle_layer_event(&LayerEvent::new(LayerId::new(2), LayerEventKind::Removed))
        .unwrap();

    assert!(old_proxy.is_removed());
    assert_eq!(sync.record_count(), 0);
    assert!(sync.virtual_layer(&ParameterKey::new("SST")).is_none());

    let l3 = map_layer(3, "SST", "cividis", [2.0, 3.0]);
    assert_eq!(
        sync.add_layer(l3.clone()).unwrap(),
        Registration::Created(ParameterKey::new("SST"))
    );
    let new_proxy = sync.virtual_layer(&ParameterKey::new("SST")).unwrap();
    assert!(!new_proxy.ptr_eq(&old_proxy));
    assert_eq!(new_proxy.property("palette"), Some(json!("cividis")));
    assert_eq!(
        *seen.borrow(),
        vec![
            Seen::Added("SST".to_string()),
            Seen::Removed("SST".to_string()),
            Seen::Added("SST".to_string()),
        ]
    );
}

#[test]
fn test_removed_layer_can_rejoin() {
    let mut sync = ParamSync::default();
    let l1 = map_layer(1, "SST", "viridis", [0.0, 1.0]);
    sync.add_layer(l1.clone()).unwrap();
    sync.remove_layer(LayerId::new(1)).unwrap();
    assert!(!sync.remove_layer(LayerId::new(1)).unwrap());
    assert!(sync.add_layer(l1).is_ok());
}

#[test]
fn test_axis_change_resets_extent_to_subset() {
    let mut sync = ParamSync::default();
    let l1 = map_layer(1, "SST", "viridis", [0.0, 10.0]);
    let l2 = map_layer(2, "SST", "magma", [5.0, 20.0]);
    sync.add_layer(l1.clone()).unwrap();
    sync.add_layer(l2.clone()).unwrap();

    // A layer that was scrolled to a new time step recomputes its own extent.
    l2.borrow_mut()
        .set_property("paletteExtent", json!([6.0, 7.0]));
    sync.handle_layer_event(&LayerEvent::new(
        LayerId::new(2),
        LayerEventKind::PropertyChanged {
            property: "paletteExtent".to_string(),
        },
    ))
    .unwrap();

    assert_eq!(prop(&l1, "paletteExtent"), json!([0.0, 10.0]));
    assert_eq!(prop(&l2, "paletteExtent"), json!([0.0, 10.0]));
}

#[test]
fn test_other_lifecycle_events_are_ignored() {
    let mut sync = ParamSync::default();
    let l1 = map_layer(1, "SST", "viridis", [0.0, 1.0]);
    sync.add_layer(l1).unwrap();

    for kind in [
        LayerEventKind::Added,
        LayerEventKind::DataLoading,
        LayerEventKind::DataLoaded,
        LayerEventKind::AxisChanged {
            axis: "time".to_string(),
        },
        LayerEventKind::Error {
            message: "tile failed".to_string(),
        },
    ] {
        sync.handle_layer_event(&LayerEvent::new(LayerId::new(1), kind))
            .unwrap();
    }
    assert!(sync.contains_layer(LayerId::new(1)));
}
