use eframe::egui;
use homeboard::dashboard::store::{LayoutStore, LAYOUT_FILE};
use homeboard::dashboard::widgets::WidgetRegistry;
use homeboard::gui::HomeboardApp;
use homeboard::logging;
use homeboard::settings::{self, Settings};

fn main() -> anyhow::Result<()> {
    let data_dir = settings::config_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;
    let settings = Settings::load(data_dir.join("settings.json"))?;
    logging::init(settings.debug_logging);

    let registry = WidgetRegistry::with_defaults();
    let store = LayoutStore::new(data_dir.join(LAYOUT_FILE), registry);

    let size = settings.window_size.unwrap_or((420.0, 760.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([size.0, size.1])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    let app = HomeboardApp::new(settings, data_dir, store);
    if let Err(e) = eframe::run_native(
        "Homeboard",
        native_options,
        Box::new(move |_cc| Box::new(app)),
    ) {
        tracing::error!("ui loop failed: {e}");
    }
    Ok(())
}
