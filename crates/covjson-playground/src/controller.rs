//! The playground controller.
//!
//! ```text
//! location / example menu ──► load schema, load document (silent)
//!                                         │
//! user edit ──► JsonEditor ──change──► display(value)
//!                                         │
//!      clear_error, remove layers, dataloading, read coverage, dataload
//!                                         │
//!            one layer group per parameter ──► covlayercreate
//!                                         │
//!                     show first group ──► ParamSync + covlayeradd
//! ```
//!
//! Read and display failures are handed back to the editor with `set_error`. The callers that
//! own the editor text (`handle_edit`, `load_document`) then revalidate so the error shows.

use crate::config::PlaygroundConfig;
use crate::coverage::{Coverage, CoverageReader};
use crate::error::DisplayError;
use crate::layers::{LayerFactory, LayerGroup, MapEvent, MapEventCallback};
use crate::location::LocationTracker;
use covjson_editor::{Fetcher, JsonEditor, ValidationReport};
use covjson_param_sync::{
    LayerEvent, LayerEventKind, LayerId, ParamSync, ParameterKey, SharedLayer, SyncError,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

/// Result of showing a parsed document on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayOutcome {
    /// Layers were created.
    Displayed {
        /// Number of layer groups (one per parameter).
        groups: usize,
        /// Parameter of the group added to the map, if any.
        shown: Option<ParameterKey>,
    },
    /// The document could not be shown; the error is pending in the editor.
    Failed {
        /// What went wrong.
        error: DisplayError,
    },
}

/// The playground: editor, coverage layers, parameter sync and location state.
pub struct Playground<F, R, L> {
    config: PlaygroundConfig,
    editor: JsonEditor,
    sync: ParamSync,
    fetcher: F,
    reader: R,
    factory: L,
    location: LocationTracker,
    groups: Vec<LayerGroup>,
    on_map: Vec<LayerId>,
    callbacks: Vec<MapEventCallback>,
}

impl<F, R, L> Playground<F, R, L>
where
    F: Fetcher,
    R: CoverageReader,
    L: LayerFactory,
{
    /// Create a playground. Nothing is loaded until [`start`](Self::start).
    pub fn new(config: PlaygroundConfig, fetcher: F, reader: R, factory: L) -> Self {
        Self {
            config,
            editor: JsonEditor::new(),
            sync: ParamSync::default(),
            fetcher,
            reader,
            factory,
            location: LocationTracker::new(),
            groups: Vec::new(),
            on_map: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    /// Configuration.
    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    /// The editor.
    pub fn editor(&self) -> &JsonEditor {
        &self.editor
    }

    /// The editor, e.g. to subscribe to `resize` or notices.
    pub fn editor_mut(&mut self) -> &mut JsonEditor {
        &mut self.editor
    }

    /// The parameter sync engine.
    pub fn param_sync(&self) -> &ParamSync {
        &self.sync
    }

    /// The parameter sync engine, e.g. to attach legends on `ParameterAdded`.
    pub fn param_sync_mut(&mut self) -> &mut ParamSync {
        &mut self.sync
    }

    /// Layer groups of the current document, in parameter order.
    pub fn groups(&self) -> &[LayerGroup] {
        &self.groups
    }

    /// Coverage layers currently on the map.
    pub fn layers_on_map(&self) -> &[LayerId] {
        &self.on_map
    }

    /// Subscribe to map-level notifications.
    pub fn subscribe<C>(&mut self, callback: C)
    where
        C: FnMut(&MapEvent) + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    /// Initial load: the schema and document named by `fragment`, falling back to the
    /// configured schema and the first example.
    pub async fn start(&mut self, fragment: &str) -> Result<Option<DisplayOutcome>, SyncError> {
        self.location.update(fragment);
        let hash = self.location.last().clone();
        let schema = hash.schema.unwrap_or_else(|| self.config.schema_url.clone());
        let url = hash
            .url
            .or_else(|| self.config.default_example().map(|e| e.url.clone()));

        self.load_schema(&schema).await;
        match url {
            Some(url) => self.load_document(&url).await,
            None => Ok(None),
        }
    }

    /// React to a location fragment change: reload whatever changed, schema first.
    pub async fn handle_location_hash(
        &mut self,
        fragment: &str,
    ) -> Result<Option<DisplayOutcome>, SyncError> {
        let change = self.location.update(fragment);
        if let Some(schema) = change.schema {
            self.load_schema(&schema).await;
        }
        match change.url {
            Some(url) => self.load_document(&url).await,
            None => Ok(None),
        }
    }

    /// Load the example at `index` of the examples menu.
    pub async fn load_example(
        &mut self,
        index: usize,
    ) -> Result<Option<DisplayOutcome>, SyncError> {
        let Some(example) = self.config.examples.get(index) else {
            warn!(index, "no such example");
            return Ok(None);
        };
        let url = example.url.clone();
        self.load_document(&url).await
    }

    /// Load a document into the editor and show it. Load failures are already reported to
    /// the user as an editor notice and yield `Ok(None)`.
    pub async fn load_document(
        &mut self,
        url: &str,
    ) -> Result<Option<DisplayOutcome>, SyncError> {
        let report = match self.editor.load_from_url(&self.fetcher, url).await {
            Ok(report) => report,
            Err(_) => return Ok(None),
        };
        let Some(value) = report.value else {
            return Ok(None);
        };
        let outcome = self.display(&value, true).await?;
        if let DisplayOutcome::Failed { .. } = outcome {
            self.editor.revalidate();
        }
        Ok(Some(outcome))
    }

    async fn load_schema(&mut self, url: &str) {
        if self.editor.load_json_schema(&self.fetcher, url).await.is_ok() {
            debug!(url, "schema active");
        }
    }

    /// Replace the editor text as a user edit and show the result if it parses.
    pub async fn replace_text(
        &mut self,
        text: impl Into<String>,
    ) -> Result<ValidationReport, SyncError> {
        let report = self.editor.replace_text(text);
        self.handle_edit(report).await
    }

    /// Follow up on a validation pass: a pass that emitted `change` is displayed.
    ///
    /// Returns the report of the last validation pass. When displaying fails, the text is
    /// revalidated so the report carries the display error.
    pub async fn handle_edit(
        &mut self,
        report: ValidationReport,
    ) -> Result<ValidationReport, SyncError> {
        let Some(value) = report.value.as_ref().filter(|_| report.change_emitted) else {
            return Ok(report);
        };
        match self.display(value, true).await? {
            DisplayOutcome::Failed { .. } => Ok(self.editor.revalidate()),
            DisplayOutcome::Displayed { .. } => Ok(report),
        }
    }

    /// Replace all coverage layers with the layers for `document`.
    ///
    /// With `show`, the first parameter's layers are added to the map. A failure is left as
    /// the editor's pending error; it is shown by the next validation pass.
    pub async fn display(
        &mut self,
        document: &Value,
        show: bool,
    ) -> Result<DisplayOutcome, SyncError> {
        self.editor.clear_error();
        self.remove_layers()?;
        self.emit(&MapEvent::DataLoading);

        let groups = match self.build_groups(document).await {
            Ok(groups) => groups,
            Err(error) => {
                self.emit(&MapEvent::DataLoaded);
                warn!(%error, "coverage could not be displayed");
                self.editor.set_error(error.to_string());
                return Ok(DisplayOutcome::Failed { error });
            }
        };

        self.groups = groups;
        let shown = match self.groups.first() {
            Some(group) if show => Some(group.key().clone()),
            _ => None,
        };
        if let Some(key) = &shown {
            self.show_group(key)?;
        }
        Ok(DisplayOutcome::Displayed {
            groups: self.groups.len(),
            shown,
        })
    }

    async fn build_groups(&mut self, document: &Value) -> Result<Vec<LayerGroup>, DisplayError> {
        let mut coverage = self.reader.read(document).await?;
        if coverage.is_domain() {
            coverage = Coverage::from_domain(coverage);
        }
        self.emit(&MapEvent::DataLoaded);
        info!(
            domain_type = coverage.domain_type().unwrap_or("-"),
            parameters = coverage.parameter_keys().len(),
            members = coverage.coverages.as_ref().map_or(0, Vec::len),
            "coverage loaded"
        );

        let mut groups = Vec::new();
        let supported = self.factory.supports(&coverage);
        match &coverage.coverages {
            Some(members) if !supported => {
                let Some(keys) = &coverage.parameters else {
                    return Err(DisplayError::CollectionWithoutParameters);
                };
                for key in keys {
                    let mut group = LayerGroup::new(key.clone());
                    for member in members.iter().filter(|m| m.has_parameter(key)) {
                        let layer = self.factory.create(member, key)?;
                        self.created(&mut group, layer);
                    }
                    groups.push(group);
                }
            }
            _ if supported => {
                for key in coverage.parameter_keys() {
                    let mut group = LayerGroup::new(key.clone());
                    let layer = self.factory.create(&coverage, key)?;
                    self.created(&mut group, layer);
                    groups.push(group);
                }
            }
            _ => return Err(DisplayError::UnsupportedDomainType),
        }
        Ok(groups)
    }

    fn created(&mut self, group: &mut LayerGroup, layer: SharedLayer) {
        let id = layer.borrow().id();
        self.emit(&MapEvent::CovLayerCreate {
            layer: id,
            key: group.key().clone(),
        });
        group.push(id, layer);
    }

    /// Add every layer of the group for `key` to the map. Returns `false` if there is none.
    pub fn show_group(&mut self, key: &ParameterKey) -> Result<bool, SyncError> {
        let Some(group) = self.groups.iter().find(|g| g.key() == key) else {
            return Ok(false);
        };
        let ids: Vec<LayerId> = group.ids().collect();
        for id in ids {
            self.handle_layer_event(LayerEvent::new(id, LayerEventKind::Added))?;
        }
        Ok(true)
    }

    /// Remove every layer of the group for `key` from the map. Returns `false` if there is none.
    pub fn hide_group(&mut self, key: &ParameterKey) -> Result<bool, SyncError> {
        let Some(group) = self.groups.iter().find(|g| g.key() == key) else {
            return Ok(false);
        };
        let ids: Vec<LayerId> = group.ids().collect();
        for id in ids {
            self.handle_layer_event(LayerEvent::new(id, LayerEventKind::Removed))?;
        }
        Ok(true)
    }

    fn remove_layers(&mut self) -> Result<(), SyncError> {
        let on_map = self.on_map.clone();
        for id in on_map {
            self.handle_layer_event(LayerEvent::new(id, LayerEventKind::Removed))?;
        }
        self.groups.clear();
        Ok(())
    }

    /// Route a lifecycle notification raised by a coverage layer.
    pub fn handle_layer_event(&mut self, event: LayerEvent) -> Result<(), SyncError> {
        let id = event.layer;
        match &event.kind {
            LayerEventKind::Added => {
                if self.on_map.contains(&id) {
                    return Ok(());
                }
                let Some(layer) = self.find_layer(id) else {
                    warn!(layer = %id, "added layer is not managed by the playground");
                    return Ok(());
                };
                self.sync.add_layer(layer)?;
                self.on_map.push(id);
                self.emit(&MapEvent::CovLayerAdd { layer: id });
            }
            LayerEventKind::Removed => {
                if !self.on_map.contains(&id) {
                    return Ok(());
                }
                self.sync.remove_layer(id)?;
                self.on_map.retain(|on_map| *on_map != id);
                self.emit(&MapEvent::CovLayerRemove { layer: id });
            }
            LayerEventKind::AxisChanged { axis } => {
                debug!(layer = %id, axis, "axis changed, palette extent follows the subset");
                if let Some(layer) = self.find_layer(id) {
                    layer
                        .try_borrow_mut()
                        .map_err(|_| SyncError::LayerBusy(id))?
                        .set_property("paletteExtent", json!("subset"));
                }
                if self.sync.contains_layer(id) {
                    self.sync.property_changed(id, "paletteExtent")?;
                }
            }
            LayerEventKind::PropertyChanged { .. } => self.sync.handle_layer_event(&event)?,
            LayerEventKind::DataLoading => self.emit(&MapEvent::DataLoading),
            LayerEventKind::DataLoaded => self.emit(&MapEvent::DataLoaded),
            LayerEventKind::Error { message } => {
                self.emit(&MapEvent::Error {
                    message: message.clone(),
                });
                self.editor.set_error(message.clone());
            }
        }
        Ok(())
    }

    fn find_layer(&self, id: LayerId) -> Option<SharedLayer> {
        self.groups.iter().find_map(|group| group.find(id)).cloned()
    }

    fn emit(&mut self, event: &MapEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}
