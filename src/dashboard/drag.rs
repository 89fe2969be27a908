use eframe::egui;

/// Tracks a pointer drag across the widget rows. The surface only observes
/// handle responses and row rects; the actual move goes through the layout
/// store once a drag ends over a valid row.
#[derive(Default)]
pub struct DragSurface {
    active: Option<String>,
    released: bool,
    rects: Vec<(String, egui::Rect)>,
}

impl DragSurface {
    pub fn begin_frame(&mut self) {
        self.rects.clear();
        self.released = false;
    }

    /// Record a row's rect and fold its handle response into the drag state.
    pub fn update(&mut self, id: &str, rect: egui::Rect, handle: &egui::Response) {
        self.rects.push((id.to_string(), rect));
        if handle.drag_started() {
            self.active = Some(id.to_string());
        }
        if handle.drag_stopped() && self.active.as_deref() == Some(id) {
            self.released = true;
        }
    }

    /// Id currently being dragged, if any.
    pub fn dragging(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Resolve the frame's outcome. When the active drag was released this
    /// returns `(source_id, destination_id)`, where the destination is the
    /// row under the pointer, or `None` if the drop landed outside every row.
    pub fn end_frame(&mut self, ctx: &egui::Context) -> Option<(String, Option<String>)> {
        if !self.released {
            // The dragged row can disappear mid-gesture (e.g. removed through
            // the menu); clear the stale drag once the pointer is up.
            if self.active.is_some() && !ctx.input(|i| i.pointer.any_down()) {
                self.active = None;
            }
            return None;
        }
        self.released = false;
        let source = self.active.take()?;
        let pos = ctx.input(|i| i.pointer.interact_pos().or_else(|| i.pointer.latest_pos()));
        let dest = pos.and_then(|p| {
            self.rects
                .iter()
                .find(|(_, rect)| rect.contains(p))
                .map(|(id, _)| id.clone())
        });
        Some((source, dest))
    }
}

/// Translate a completed drag into indices for the store. Returns `None`
/// when the drop landed outside the list, either id is stale, or the move
/// would be a no-op, so an abandoned drag never touches the layout.
pub fn reorder_plan(ids: &[String], source: &str, dest: Option<&str>) -> Option<(usize, usize)> {
    let dest = dest?;
    let from = ids.iter().position(|id| id == source)?;
    let to = ids.iter().position(|id| id == dest)?;
    if from == to {
        return None;
    }
    Some((from, to))
}
