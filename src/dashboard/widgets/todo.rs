use super::{report_mutation_error, Widget, WidgetEvent};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;
use std::sync::Arc;

/// Server-backed todo list: add, toggle completion, delete.
#[derive(Default)]
pub struct TodoWidget {
    input: String,
    fetched: bool,
}

impl TodoWidget {
    fn submit(&mut self, ui: &egui::Ui, ctx: &DashboardContext<'_>) {
        let task = self.input.trim().to_string();
        if task.is_empty() {
            return;
        }
        self.input.clear();
        let api = Arc::clone(ctx.api);
        let data = Arc::clone(ctx.data);
        let egui_ctx = ui.ctx().clone();
        std::thread::spawn(move || {
            if let Err(e) = api.create_todo(&task) {
                report_mutation_error(&data, "todo create", &e);
            }
            data.refresh_todos(&api);
            egui_ctx.request_repaint();
        });
    }
}

impl Widget for TodoWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent> {
        let snapshot = ctx.data.snapshot();

        if !self.fetched {
            self.fetched = true;
            let api = Arc::clone(ctx.api);
            let data = Arc::clone(ctx.data);
            let egui_ctx = ui.ctx().clone();
            std::thread::spawn(move || {
                data.refresh_todos(&api);
                egui_ctx.request_repaint();
            });
        }

        ui.horizontal(|ui| {
            ui.strong("Todo");
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                let api = Arc::clone(ctx.api);
                let data = Arc::clone(ctx.data);
                let egui_ctx = ui.ctx().clone();
                std::thread::spawn(move || {
                    data.refresh_todos(&api);
                    egui_ctx.request_repaint();
                });
            }
        });

        if let Some(err) = &snapshot.todos_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }

        let mut submit = false;
        ui.horizontal(|ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut self.input).hint_text("What needs doing?"),
            );
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }
            if ui.button("Add").clicked() {
                submit = true;
            }
        });
        if submit {
            self.submit(ui, ctx);
        }

        let todos = Arc::clone(&snapshot.todos);
        if todos.is_empty() && snapshot.todos_error.is_none() {
            ui.weak("No todos yet.");
        }
        for todo in todos.iter() {
            ui.horizontal(|ui| {
                let mut done = todo.completed;
                if ui.checkbox(&mut done, &todo.task).changed() {
                    let api = Arc::clone(ctx.api);
                    let data = Arc::clone(ctx.data);
                    let egui_ctx = ui.ctx().clone();
                    let id = todo.id;
                    std::thread::spawn(move || {
                        if let Err(e) = api.set_todo_completed(id, done) {
                            report_mutation_error(&data, "todo toggle", &e);
                        }
                        data.refresh_todos(&api);
                        egui_ctx.request_repaint();
                    });
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("✖").on_hover_text("Delete").clicked() {
                        let api = Arc::clone(ctx.api);
                        let data = Arc::clone(ctx.data);
                        let egui_ctx = ui.ctx().clone();
                        let id = todo.id;
                        std::thread::spawn(move || {
                            if let Err(e) = api.delete_todo(id) {
                                report_mutation_error(&data, "todo delete", &e);
                            }
                            data.refresh_todos(&api);
                            egui_ctx.request_repaint();
                        });
                    }
                });
            });
        }
        None
    }
}
