use super::{report_mutation_error, Widget, WidgetEvent};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;
use std::sync::Arc;

/// Poll viewer with vote submission.
#[derive(Default)]
pub struct PollWidget {
    fetched: bool,
    selected: Option<i64>,
}

impl PollWidget {
    fn fetch(&mut self, ui: &egui::Ui, ctx: &DashboardContext<'_>) {
        self.fetched = true;
        let api = Arc::clone(ctx.api);
        let data = Arc::clone(ctx.data);
        let egui_ctx = ui.ctx().clone();
        let poll_id = ctx.poll_id;
        std::thread::spawn(move || {
            data.refresh_poll(&api, poll_id);
            egui_ctx.request_repaint();
        });
    }
}

impl Widget for PollWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent> {
        if !self.fetched {
            self.fetch(ui, ctx);
        }

        ui.horizontal(|ui| {
            ui.strong("Poll");
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                self.fetch(ui, ctx);
            }
        });

        let snapshot = ctx.data.snapshot();
        if let Some(err) = &snapshot.poll_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        let poll = match snapshot.poll.as_ref() {
            Some(poll) => poll.clone(),
            None => {
                if snapshot.poll_error.is_none() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.weak("Loading poll…");
                    });
                }
                return None;
            }
        };

        ui.label(&poll.title);
        if !poll.description.is_empty() {
            ui.weak(&poll.description);
        }

        let mut options = poll.options.clone();
        options.sort_by_key(|o| o.display_order);
        let voted = poll.user_voted_option_id;
        for option in &options {
            let label = if voted == Some(option.id) {
                format!(
                    "✔ {} · {} votes ({:.0}%)",
                    option.option_text, option.vote_count, option.percentage
                )
            } else {
                format!(
                    "{} · {} votes ({:.0}%)",
                    option.option_text, option.vote_count, option.percentage
                )
            };
            ui.radio_value(&mut self.selected, Some(option.id), label);
        }
        ui.weak(format!("{} votes total", poll.total_votes));

        let can_vote = self.selected.is_some() && (voted.is_none() || poll.allow_change_vote);
        if ui
            .add_enabled(can_vote, egui::Button::new("Vote"))
            .clicked()
        {
            let Some(option_id) = self.selected else {
                return None;
            };
            let api = Arc::clone(ctx.api);
            let data = Arc::clone(ctx.data);
            let egui_ctx = ui.ctx().clone();
            let poll_id = poll.id;
            std::thread::spawn(move || {
                if let Err(e) = api.submit_vote(poll_id, option_id) {
                    report_mutation_error(&data, "vote", &e);
                }
                data.refresh_poll(&api, poll_id);
                egui_ctx.request_repaint();
            });
            return Some(WidgetEvent::Toast("Vote submitted".into()));
        }
        None
    }
}
