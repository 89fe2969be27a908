use super::{Widget, WidgetEvent};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const WEATHER_STATE_FILE: &str = "weather_widget.json";

/// Cities offered by the picker; the backend resolves them within KR.
const CITIES: &[&str] = &["Seoul", "Busan", "Incheon", "Daegu", "Daejeon", "Gwangju", "Jeju"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WeatherState {
    #[serde(default)]
    pub city: String,
}

pub fn load_state(path: impl AsRef<Path>) -> anyhow::Result<WeatherState> {
    let content = std::fs::read_to_string(path).unwrap_or_default();
    if content.trim().is_empty() {
        return Ok(WeatherState::default());
    }
    Ok(serde_json::from_str(&content)?)
}

pub fn save_state(path: impl AsRef<Path>, state: &WeatherState) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Weather viewer with a remembered city selection.
pub struct WeatherWidget {
    state: WeatherState,
    state_path: PathBuf,
    fetched_for: Option<String>,
}

impl WeatherWidget {
    pub fn new(data_dir: &Path) -> Self {
        let state_path = data_dir.join(WEATHER_STATE_FILE);
        let state = load_state(&state_path).unwrap_or_default();
        Self {
            state,
            state_path,
            fetched_for: None,
        }
    }

    fn effective_city<'a>(&'a self, ctx: &'a DashboardContext<'_>) -> &'a str {
        if self.state.city.is_empty() {
            ctx.default_city
        } else {
            &self.state.city
        }
    }

    fn fetch(&mut self, ui: &egui::Ui, ctx: &DashboardContext<'_>, city: &str) {
        self.fetched_for = Some(city.to_string());
        let api = Arc::clone(ctx.api);
        let data = Arc::clone(ctx.data);
        let egui_ctx = ui.ctx().clone();
        let city = city.to_string();
        std::thread::spawn(move || {
            data.refresh_weather(&api, &city);
            egui_ctx.request_repaint();
        });
    }
}

impl Widget for WeatherWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent> {
        let city = self.effective_city(ctx).to_string();
        if self.fetched_for.as_deref() != Some(city.as_str()) {
            self.fetch(ui, ctx, &city);
        }

        ui.horizontal(|ui| {
            ui.strong("Weather");
            let mut selected = city.clone();
            egui::ComboBox::from_id_source(("weather-city", &self.state_path))
                .selected_text(selected.clone())
                .show_ui(ui, |ui| {
                    for candidate in CITIES {
                        ui.selectable_value(&mut selected, candidate.to_string(), *candidate);
                    }
                });
            if selected != city {
                self.state.city = selected.clone();
                if let Err(e) = save_state(&self.state_path, &self.state) {
                    tracing::warn!("failed to save weather city: {e}");
                }
                self.fetch(ui, ctx, &selected);
            }
            if ui.small_button("⟳").on_hover_text("Refresh").clicked() {
                self.fetch(ui, ctx, &city);
            }
        });

        let snapshot = ctx.data.snapshot();
        if let Some(err) = &snapshot.weather_error {
            ui.colored_label(ui.visuals().error_fg_color, err);
        }
        match snapshot.weather.as_ref() {
            Some(report) => {
                ui.label(format!("{:.1} °C in {}", report.main.temp, report.name));
                if let Some(condition) = report.weather.first() {
                    ui.label(&condition.description);
                }
                ui.weak(format!(
                    "Feels like {:.1} °C · humidity {:.0}% · wind {:.1} m/s",
                    report.main.feels_like, report.main.humidity, report.wind.speed
                ));
            }
            None if snapshot.weather_error.is_none() => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.weak("Loading weather…");
                });
            }
            None => {}
        }
        None
    }
}
