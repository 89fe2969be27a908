use crate::api::ApiClient;
use crate::dashboard::data_cache::DashboardDataCache;
use crate::dashboard::drag::{reorder_plan, DragSurface};
use crate::dashboard::store::LayoutStore;
use crate::dashboard::widgets::WidgetEvent;
use eframe::egui;
use std::path::Path;
use std::sync::Arc;

/// Context shared with widgets at render time.
pub struct DashboardContext<'a> {
    pub api: &'a Arc<ApiClient>,
    pub data: &'a Arc<DashboardDataCache>,
    pub data_dir: &'a Path,
    pub default_city: &'a str,
    pub currencies: &'a [String],
    pub poll_id: i64,
    pub ai_provider: &'a str,
}

/// Renders the ordered widget list with drag handles and routes completed
/// drags into the layout store.
pub struct Dashboard {
    store: LayoutStore,
    drag: DragSurface,
}

impl Dashboard {
    pub fn new(store: LayoutStore) -> Self {
        Self {
            store,
            drag: DragSurface::default(),
        }
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut LayoutStore {
        &mut self.store
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Vec<WidgetEvent> {
        let mut events = Vec::new();
        self.drag.begin_frame();

        egui::ScrollArea::vertical()
            .id_source("dashboard-list")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for instance in self.store.widgets_mut() {
                    let dragging = self.drag.dragging() == Some(instance.id.as_str());
                    let mut frame = egui::Frame::group(ui.style());
                    if dragging {
                        frame = frame.fill(ui.visuals().faint_bg_color);
                    }
                    let row = frame.show(ui, |ui| {
                        let handle = drag_handle(ui, &instance.id);
                        if let Some(event) = instance.widget.render(ui, ctx) {
                            events.push(event);
                        }
                        handle
                    });
                    self.drag
                        .update(&instance.id, row.response.rect, &row.inner);
                    ui.add_space(6.0);
                }
            });

        if let Some((source, dest)) = self.drag.end_frame(ui.ctx()) {
            if let Some((from, to)) = reorder_plan(&self.store.ids(), &source, dest.as_deref()) {
                self.store.reorder_widgets(from, to);
            }
        }
        events
    }
}

/// Grip row at the top of each widget. Dragging it (mouse or touch) moves the
/// widget; the body below keeps normal interaction.
fn drag_handle(ui: &mut egui::Ui, widget_id: &str) -> egui::Response {
    let desired = egui::vec2(ui.available_width(), 16.0);
    let (_, rect) = ui.allocate_space(desired);
    let response = ui.interact(
        rect,
        ui.id().with(("drag-handle", widget_id)),
        egui::Sense::drag(),
    );
    let visuals = ui.style().interact(&response);
    ui.painter()
        .rect_filled(rect, 3.0, visuals.bg_fill.gamma_multiply(0.4));
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "· · ·",
        egui::FontId::proportional(12.0),
        ui.visuals().weak_text_color(),
    );
    response.on_hover_cursor(egui::CursorIcon::Grab)
}
