use super::{Widget, WidgetEvent};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;
use egui_extras::{Column, TableBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const EXCHANGE_STATE_FILE: &str = "exchange_widget.json";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExchangeState {
    /// Currency the user pinned for emphasis. Empty means no pin.
    #[serde(default)]
    pub currency: String,
}

pub fn load_state(path: impl AsRef<Path>) -> anyhow::Result<ExchangeState> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(ExchangeState::default());
    }
    Ok(serde_json::from_str(&content)?)
}

pub fn save_state(path: impl AsRef<Path>, state: &ExchangeState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Exchange-rate table with a remembered highlighted currency.
pub struct ExchangeRateWidget {
    state: ExchangeState,
    state_path: PathBuf,
    fetched: bool,
}

impl ExchangeRateWidget {
    pub fn new(data_dir: &Path) -> Self {
        let state_path = data_dir.join(EXCHANGE_STATE_FILE);
        let state = load_state(&state_path).unwrap_or_default();
        Self {
            state,
            state_path,
            fetched: false,
        }
    }

    fn fetch(&mut self, ui: &egui::Ui, ctx: &DashboardContext<'_>) {
        self.fetched = true;
        let api = Arc::clone(ctx.api);
        let data = Arc::clone(ctx.data);
        let egui_ctx = ui.ctx().clone();
        let currencies = ctx.currencies.to_vec();
        std::thread::spawn(move || {
            data.refresh_rates(&api, &currencies);
            egui_ctx.request_repaint();
        });
    }
}

impl Widget for ExchangeRateWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent> {
        if !self.fetched {
            self.fetch(ui, ctx);
        }

        ui.horizontal(|ui| {
            ui.strong("Exchange Rates");
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                self.fetch(ui, ctx);
            }
        });

        let snapshot = ctx.data.snapshot();
        if let Some(err) = &snapshot.rates_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        let rates = Arc::clone(&snapshot.rates);
        if rates.is_empty() {
            if snapshot.rates_error.is_none() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Loading rates…");
                });
            }
            return None;
        }

        let mut picked: Option<String> = None;
        ui.push_id(("exchange-table", &self.state_path), |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto().at_least(70.0))
                .column(Column::remainder())
                .header(18.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Currency");
                    });
                    header.col(|ui| {
                        ui.strong("KRW");
                    });
                })
                .body(|mut body| {
                    for rate in rates.iter() {
                        let selected = rate.currency == self.state.currency;
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                if ui.selectable_label(selected, &rate.currency).clicked() {
                                    picked = Some(if selected {
                                        String::new()
                                    } else {
                                        rate.currency.clone()
                                    });
                                }
                            });
                            row.col(|ui| {
                                if selected {
                                    ui.strong(&rate.rate);
                                } else {
                                    ui.label(&rate.rate);
                                }
                            });
                        });
                    }
                });
        });

        if let Some(currency) = picked {
            self.state.currency = currency;
            if let Err(e) = save_state(&self.state_path, &self.state) {
                tracing::warn!("failed to save exchange currency: {e}");
            }
        }
        None
    }
}
