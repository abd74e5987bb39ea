//! Editing session: the versioned document plus the transient state around it.

mod panels;
mod surface;

use std::path::Path;
use std::time::Instant;

use image::RgbaImage;

use crate::autosave::{AutosaveResult, Autosaver, RESTORE_LABEL};
use crate::background::BackgroundImage;
use crate::config::EditorConfig;
use crate::document::{Document, LayerId, LayerMove, LayerPatch, TextLayer};
use crate::export::{write_png, ExportError, ExportPlan, ExportResult};
use crate::geometry::Size;
use crate::history::{History, Update};
use crate::input::{
    resolve_shortcut, InputContext, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
use crate::selection::{Selection, SelectionPolicy};
use crate::storage::KeyValueStore;
use crate::transform::{
    reconcile, Gesture, HandleConfig, NodeTransform, UPDATE_LAYERS_LABEL, UPDATE_LAYER_LABEL,
};
use crate::viewport::Viewport;

pub use panels::{history_footer, history_rows, layer_rows, HistoryRow, LayerRow};
pub use surface::{DetachedSurface, RenderSurface};

pub const NEW_LAYER_TEXT: &str = "Double-click to edit";
const NEW_LAYER_LABEL: &str = "Add text layer";
const DELETE_LAYER_LABEL: &str = "Delete layer";
const DELETE_LAYERS_LABEL: &str = "Delete layers";
const REORDER_LAYERS_LABEL: &str = "Reorder layers";
const EDIT_TEXT_LABEL: &str = "Edit text";
const SET_BACKGROUND_LABEL: &str = "Set background";
const REMOVE_BACKGROUND_LABEL: &str = "Remove background";

const FALLBACK_BACKGROUND: Size = Size::new(800.0, 600.0);
const NEW_LAYER_OFFSET_RATIO: f64 = 0.1;
const NEW_LAYER_WIDTH_RATIO: f64 = 0.5;
const NEW_LAYER_MIN_WIDTH: f64 = 200.0;

/// In-progress text edit on one layer. The document is untouched until commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub layer: LayerId,
    pub draft: String,
}

/// Outcome of [`EditorSession::restore_autosave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub layers: usize,
    /// The snapshot was taken while a background image was loaded.
    pub has_image: bool,
    background_present: bool,
    pub timestamp: u64,
}

impl RestoreReport {
    pub fn needs_background(&self) -> bool {
        self.has_image && !self.background_present
    }
}

pub struct EditorSession<R, S> {
    history: History<Document>,
    selection: Selection,
    text_edit: Option<TextEdit>,
    viewport: Viewport,
    background: Option<BackgroundImage>,
    autosaver: Autosaver<S>,
    surface: R,
    next_id: u64,
}

impl<R: RenderSurface, S: KeyValueStore> EditorSession<R, S> {
    pub fn new(surface: R, autosaver: Autosaver<S>, history_capacity: usize) -> Self {
        Self {
            history: History::new(Document::new(), history_capacity),
            selection: Selection::new(),
            text_edit: None,
            viewport: Viewport::new(),
            background: None,
            autosaver,
            surface,
            next_id: 1,
        }
    }

    pub fn with_config(surface: R, store: S, config: &EditorConfig) -> Self {
        let autosaver = Autosaver::new(
            store,
            config.autosave_key.clone(),
            config.autosave_delay(),
        );
        Self::new(surface, autosaver, config.history_capacity)
    }

    pub fn document(&self) -> &Document {
        self.history.value()
    }

    pub fn history(&self) -> &History<Document> {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn autosaver(&self) -> &Autosaver<S> {
        &self.autosaver
    }

    /// Loaded background handle, present only while the document shows a background.
    pub fn background_image(&self) -> Option<&BackgroundImage> {
        self.document().background().and(self.background.as_ref())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn layer_rows(&self) -> Vec<LayerRow> {
        layer_rows(self.document(), &self.selection)
    }

    pub fn history_rows(&self) -> Vec<HistoryRow> {
        history_rows(&self.history)
    }

    pub fn history_footer(&self) -> String {
        history_footer(&self.history)
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn reserve_ids_after(&mut self, document: &Document) {
        if let Some(LayerId(max)) = document.max_id() {
            self.next_id = self.next_id.max(max.saturating_add(1));
        }
    }

    /// Runs `edit` on a copy of the present document and records it when it changed.
    fn record(&mut self, label: &str, edit: impl FnOnce(&mut Document) -> bool) -> bool {
        let mut next = self.history.value().clone();
        if !edit(&mut next) || next == *self.history.value() {
            tracing::debug!(label, "edit produced no change; nothing recorded");
            return false;
        }
        self.history.set(next, label);
        true
    }

    fn sync_handles(&mut self) {
        let ids = match self.text_edit {
            Some(_) => Vec::new(),
            None => self.selection.to_vec(),
        };
        let config = HandleConfig::for_policy(self.selection.policy());
        self.surface.attach_handles(&ids, config);
    }

    fn after_history_move(&mut self) {
        let document = self.history.value();
        let selection_changed = self.selection.retain_existing(document);
        let edit_orphaned = self
            .text_edit
            .as_ref()
            .is_some_and(|edit| !document.contains(edit.layer));
        if edit_orphaned {
            tracing::debug!("text edit target disappeared; cancelling edit");
            self.text_edit = None;
        }
        if selection_changed || edit_orphaned {
            self.sync_handles();
        }
    }

    pub fn add_text_layer(&mut self) -> LayerId {
        let background = self
            .document()
            .background()
            .map(|info| Size::new(f64::from(info.width), f64::from(info.height)))
            .unwrap_or(FALLBACK_BACKGROUND);
        let id = self.allocate_id();
        let layer = TextLayer::new(id, NEW_LAYER_TEXT)
            .at(
                background.width * NEW_LAYER_OFFSET_RATIO,
                background.height * NEW_LAYER_OFFSET_RATIO,
            )
            .with_width(NEW_LAYER_MIN_WIDTH.max(background.width * NEW_LAYER_WIDTH_RATIO));
        let append = Update::apply(move |document: &Document| {
            let mut next = document.clone();
            next.push(layer);
            next
        });
        self.history.set(append, NEW_LAYER_LABEL);
        tracing::info!(%id, "text layer added");
        self.select_only(Some(id));
        id
    }

    pub fn remove_selected(&mut self) -> usize {
        if self.selection.is_empty() {
            return 0;
        }
        let ids = self.selection.ids().clone();
        let label = if ids.len() == 1 {
            DELETE_LAYER_LABEL
        } else {
            DELETE_LAYERS_LABEL
        };
        let mut removed = 0;
        self.record(label, |document| {
            removed = document.remove_layers(&ids);
            removed > 0
        });
        if let Some(edit) = &self.text_edit {
            if ids.contains(&edit.layer) {
                self.text_edit = None;
            }
        }
        self.clear_selection();
        tracing::info!(removed, "selected layers deleted");
        removed
    }

    pub fn move_layer(&mut self, id: LayerId, direction: LayerMove) -> bool {
        self.record(direction.label(), |document| document.move_layer(id, direction))
    }

    pub fn reorder_layers(&mut self, from: usize, to: usize) -> bool {
        self.record(REORDER_LAYERS_LABEL, |document| {
            document.reorder_layers(from, to)
        })
    }

    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        self.record(UPDATE_LAYER_LABEL, |document| document.update_layer(id, patch))
    }

    pub fn update_selected(&mut self, patch: &LayerPatch) -> bool {
        let label = match self.selection.policy() {
            SelectionPolicy::Empty => return false,
            SelectionPolicy::Single(_) => UPDATE_LAYER_LABEL,
            SelectionPolicy::Multiple => UPDATE_LAYERS_LABEL,
        };
        let ids = self.selection.to_vec();
        self.record(label, |document| {
            ids.iter()
                .fold(false, |changed, id| document.update_layer(*id, patch) || changed)
        })
    }

    /// Installs or removes the background and fits the stage to it inside `container`.
    pub fn set_background(&mut self, background: Option<BackgroundImage>, container: Size) -> bool {
        let info = background.as_ref().map(BackgroundImage::info);
        let label = if info.is_some() {
            SET_BACKGROUND_LABEL
        } else {
            REMOVE_BACKGROUND_LABEL
        };
        match info {
            Some(info) => self.viewport.fit_background(info, container),
            None => self.viewport = Viewport::new(),
        }
        self.background = background;
        self.record(label, |document| {
            document.set_background(info);
            true
        })
    }

    /// Loads a background from disk. A failed load leaves the session without a background.
    pub fn load_background(&mut self, path: impl AsRef<Path>, container: Size) -> bool {
        let background = BackgroundImage::open_or_none(path);
        let loaded = background.is_some();
        self.set_background(background, container);
        loaded
    }

    pub fn set_zoom(&mut self, scale: f64) {
        self.viewport.set_scale(scale);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn select_only(&mut self, id: Option<LayerId>) -> bool {
        if id.is_some_and(|id| !self.document().contains(id)) {
            return false;
        }
        let changed = self.selection.select_only(id);
        if changed {
            self.sync_handles();
        }
        changed
    }

    pub fn toggle_selection(&mut self, id: LayerId) -> bool {
        if !self.document().contains(id) {
            return false;
        }
        self.selection.toggle(id);
        self.sync_handles();
        true
    }

    pub fn select_all(&mut self) -> bool {
        let ids = self.document().ids();
        let changed = self.selection.select_all(ids);
        if changed {
            self.sync_handles();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        let changed = self.selection.clear();
        if changed {
            self.sync_handles();
        }
        changed
    }

    /// Layers that travel with a drag of `dragged`: the whole selection when `dragged` belongs
    /// to it, otherwise `dragged` alone.
    pub fn drag_targets(&self, dragged: LayerId) -> Vec<LayerId> {
        if self.selection.contains(dragged) {
            self.selection.to_vec()
        } else {
            vec![dragged]
        }
    }

    /// Reads back the nodes of `targets` from the surface and records the normalized result.
    pub fn finish_gesture(&mut self, gesture: Gesture, targets: &[LayerId]) -> bool {
        let reports: Vec<(LayerId, NodeTransform)> = targets
            .iter()
            .filter_map(|id| self.surface.node(*id).map(|report| (*id, report)))
            .collect();
        self.apply_gesture(gesture, &reports)
    }

    pub fn finish_drag(&mut self, dragged: LayerId) -> bool {
        let targets = self.drag_targets(dragged);
        self.finish_gesture(Gesture::Drag, &targets)
    }

    pub fn finish_transform(&mut self) -> bool {
        let targets = self.selection.to_vec();
        self.finish_gesture(Gesture::Transform, &targets)
    }

    /// Records a gesture from explicit reports, for surfaces that push readbacks instead.
    pub fn apply_gesture(
        &mut self,
        gesture: Gesture,
        reports: &[(LayerId, NodeTransform)],
    ) -> bool {
        let Some(reconciliation) = reconcile(self.document(), &self.selection, gesture, reports)
        else {
            return false;
        };
        tracing::debug!(
            label = reconciliation.label,
            changed = reconciliation.changed.len(),
            "gesture reconciled"
        );
        self.history.set(reconciliation.document, reconciliation.label);
        true
    }

    /// Opens a text edit on `id`. An edit already open on another layer is committed first.
    pub fn begin_edit(&mut self, id: LayerId) -> Option<String> {
        if let Some(active) = &self.text_edit {
            if active.layer == id {
                return Some(active.draft.clone());
            }
        }
        let text = self.document().layer(id)?.text.clone();
        if let Some(previous) = self.text_edit.take() {
            tracing::debug!(layer = %previous.layer, "committing open text edit before switching");
            self.commit_edit(previous.layer, previous.draft);
        }
        self.text_edit = Some(TextEdit {
            layer: id,
            draft: text.clone(),
        });
        self.sync_handles();
        Some(text)
    }

    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        match &mut self.text_edit {
            Some(edit) => {
                edit.draft = text.into();
                true
            }
            None => false,
        }
    }

    /// Ends the edit on `id` and records `text`. Unchanged text ends the edit without an entry.
    pub fn commit_edit(&mut self, id: LayerId, text: impl Into<String>) -> bool {
        if self.text_edit.as_ref().is_some_and(|edit| edit.layer == id) {
            self.text_edit = None;
            self.sync_handles();
        }
        let patch = LayerPatch::text(text);
        self.record(EDIT_TEXT_LABEL, |document| document.update_layer(id, &patch))
    }

    pub fn cancel_edit(&mut self, id: LayerId) -> bool {
        if !self.text_edit.as_ref().is_some_and(|edit| edit.layer == id) {
            return false;
        }
        self.text_edit = None;
        self.sync_handles();
        true
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            self.after_history_move();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            self.after_history_move();
        }
        moved
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        let moved = self.history.jump_to(index);
        if moved {
            self.after_history_move();
        }
        moved
    }

    /// Resolves a key press against the current mode and runs the bound action.
    pub fn handle_key(
        &mut self,
        key: ShortcutKey,
        modifiers: ShortcutModifiers,
    ) -> Option<ShortcutAction> {
        let context = InputContext {
            text_edit_active: self.text_edit.is_some(),
            in_editor: true,
        };
        let action = resolve_shortcut(key, modifiers, context)?;
        self.run_action(action);
        Some(action)
    }

    pub fn run_action(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::TextCommit => {
                if let Some(edit) = self.text_edit.clone() {
                    self.commit_edit(edit.layer, edit.draft);
                }
            }
            ShortcutAction::TextCancel => {
                if let Some(layer) = self.text_edit.as_ref().map(|edit| edit.layer) {
                    self.cancel_edit(layer);
                }
            }
            ShortcutAction::EditorUndo => {
                self.undo();
            }
            ShortcutAction::EditorRedo => {
                self.redo();
            }
            ShortcutAction::EditorSelectAll => {
                self.select_all();
            }
            ShortcutAction::EditorClearSelection => {
                self.clear_selection();
            }
            ShortcutAction::EditorDeleteSelection => {
                self.remove_selected();
            }
        }
    }

    /// Replaces the layers and viewport with the stored snapshot, if any.
    ///
    /// Call once at session start, before the first [`tick`](Self::tick). A loaded background
    /// is kept since snapshots never carry one. [`RestoreReport::needs_background`] tells the
    /// caller when the image has to be supplied again.
    pub fn restore_autosave(&mut self) -> Option<RestoreReport> {
        let snapshot = self.autosaver.load()?;
        let mut restored = snapshot.to_document();
        restored.set_background(self.document().background());
        self.reserve_ids_after(&restored);
        self.viewport = snapshot.viewport();
        let report = RestoreReport {
            layers: restored.len(),
            has_image: snapshot.has_image,
            background_present: restored.background().is_some(),
            timestamp: snapshot.timestamp,
        };
        self.history.set(restored, RESTORE_LABEL);
        self.after_history_move();
        tracing::info!(
            layers = report.layers,
            had_image = report.has_image,
            "session restored from autosave"
        );
        if report.needs_background() {
            tracing::warn!("autosave was taken with a background image; it must be re-supplied");
        }
        Some(report)
    }

    pub fn clear_autosave(&self) -> bool {
        self.autosaver.clear()
    }

    /// Feeds the present state to autosave and flushes it when its delay has elapsed.
    pub fn tick(&mut self, now: Instant) -> Option<AutosaveResult<()>> {
        self.autosaver.observe(self.history.value(), self.viewport, now);
        self.autosaver.poll(now)
    }

    /// Tears the session down. Any pending autosave is dropped.
    pub fn close(&mut self) {
        self.autosaver.cancel();
        self.text_edit = None;
        tracing::debug!("editor session closed");
    }

    /// Rasterizes the document at the background's native size.
    pub fn export(&mut self) -> ExportResult<RgbaImage> {
        let plan = ExportPlan::for_document(self.document())?;
        self.clear_selection();
        let raster = self
            .surface
            .rasterize(&plan)
            .map_err(|message| ExportError::Render { message })?;
        plan.check_raster(&raster)?;
        Ok(raster)
    }

    pub fn export_to(&mut self, path: &Path) -> ExportResult<()> {
        let raster = self.export()?;
        write_png(&raster, path)
    }
}
