use crate::dashboard::widgets::{Widget, WidgetRegistry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const LAYOUT_FILE: &str = "layout.json";

/// One active widget on the home screen. The renderable is resolved through
/// the registry when the instance is built and is never persisted.
pub struct WidgetInstance {
    pub id: String,
    pub widget: Box<dyn Widget>,
}

#[derive(Serialize, Deserialize, Default)]
struct LayoutFile {
    #[serde(default)]
    widgets: Vec<LayoutEntry>,
}

#[derive(Serialize, Deserialize)]
struct LayoutEntry {
    id: String,
}

/// Source of truth for which widgets are active and in what order.
///
/// Every mutation mirrors the id sequence to `layout.json`; the write is best
/// effort and the in-memory layout stays authoritative for the session if it
/// fails. Rehydration happens synchronously in [`LayoutStore::new`], before
/// the first frame renders.
pub struct LayoutStore {
    path: PathBuf,
    data_dir: PathBuf,
    registry: WidgetRegistry,
    widgets: Vec<WidgetInstance>,
}

impl LayoutStore {
    pub fn new(path: impl AsRef<Path>, registry: WidgetRegistry) -> Self {
        let path = path.as_ref().to_path_buf();
        let data_dir = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let widgets = rehydrate(&path, &data_dir, &registry);
        Self {
            path,
            data_dir,
            registry,
            widgets,
        }
    }

    pub fn widgets(&self) -> &[WidgetInstance] {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut [WidgetInstance] {
        &mut self.widgets
    }

    pub fn ids(&self) -> Vec<String> {
        self.widgets.iter().map(|w| w.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.widgets.iter().any(|w| w.id == id)
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Replace the whole layout. Uniqueness of ids is the caller's contract
    /// on this path; the toggle/drag paths go through the checked operations.
    pub fn set_layout(&mut self, widgets: Vec<WidgetInstance>) {
        self.widgets = widgets;
        self.persist();
    }

    /// Append a widget. A duplicate or unknown id is ignored.
    pub fn add_widget(&mut self, id: &str) {
        if self.contains(id) {
            return;
        }
        let Some(widget) = self.registry.create(id, &self.data_dir) else {
            tracing::warn!(widget = %id, "unknown widget ignored");
            return;
        };
        self.widgets.push(WidgetInstance {
            id: id.to_string(),
            widget,
        });
        self.persist();
    }

    /// Remove a widget if present, then delete the durable files its
    /// descriptor declares so forgotten widgets do not leave selections
    /// behind.
    pub fn remove_widget(&mut self, id: &str) {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != id);
        if self.widgets.len() == before {
            return;
        }
        self.persist();
        let Some(descriptor) = self.registry.descriptor(id) else {
            return;
        };
        for file in descriptor.cleanup_files() {
            let path = self.data_dir.join(file);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("failed to remove {}: {e}", path.display()),
            }
        }
    }

    /// Move the element at `from` so it ends up at index `to` (a stable move,
    /// not a swap). An out-of-range `from` is rejected; `to` is clamped.
    pub fn reorder_widgets(&mut self, from: usize, to: usize) {
        if from >= self.widgets.len() {
            tracing::warn!(from, to, "reorder source index out of range");
            return;
        }
        let to = to.min(self.widgets.len() - 1);
        if from == to {
            return;
        }
        let item = self.widgets.remove(from);
        self.widgets.insert(to, item);
        self.persist();
    }

    pub fn clear_layout(&mut self) {
        self.widgets.clear();
        self.persist();
    }

    fn persist(&self) {
        let file = LayoutFile {
            widgets: self
                .widgets
                .iter()
                .map(|w| LayoutEntry { id: w.id.clone() })
                .collect(),
        };
        let json = match serde_json::to_string_pretty(&file) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("failed to serialize layout: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!("failed to persist layout to {}: {e}", self.path.display());
        }
    }
}

/// Rebuild the in-memory layout from the persisted id list. Ids that no
/// longer resolve in the registry are dropped, as are duplicates from a
/// hand-edited file; an unreadable file yields an empty layout.
fn rehydrate(path: &Path, data_dir: &Path, registry: &WidgetRegistry) -> Vec<WidgetInstance> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Vec::new();
    }
    let file: LayoutFile = match serde_json::from_str(&content) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!("invalid layout file {}: {e}", path.display());
            return Vec::new();
        }
    };
    let mut out: Vec<WidgetInstance> = Vec::new();
    for entry in file.widgets {
        if out.iter().any(|w| w.id == entry.id) {
            tracing::warn!(widget = %entry.id, "duplicate layout entry dropped");
            continue;
        }
        match registry.create(&entry.id, data_dir) {
            Some(widget) => out.push(WidgetInstance {
                id: entry.id,
                widget,
            }),
            None => tracing::warn!(widget = %entry.id, "unknown layout widget dropped"),
        }
    }
    out
}
