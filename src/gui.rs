use crate::api::ApiClient;
use crate::auth::{self, Session, TokenStatus, SESSION_FILE};
use crate::dashboard::dashboard::{Dashboard, DashboardContext};
use crate::dashboard::data_cache::DashboardDataCache;
use crate::dashboard::store::LayoutStore;
use crate::dashboard::widgets::WidgetEvent;
use crate::settings::Settings;
use crate::toast_log::append_toast_log;
use chrono::Utc;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::path::PathBuf;
use std::sync::Arc;

pub struct HomeboardApp {
    settings: Settings,
    data_dir: PathBuf,
    session_path: PathBuf,
    session: Option<Session>,
    api: Option<Arc<ApiClient>>,
    data: Arc<DashboardDataCache>,
    dashboard: Dashboard,
    toasts: Toasts,
    token_input: String,
    login_error: Option<String>,
    bootstrapped: bool,
}

impl HomeboardApp {
    pub fn new(settings: Settings, data_dir: PathBuf, store: LayoutStore) -> Self {
        let session_path = data_dir.join(SESSION_FILE);
        let session = auth::load_session(&session_path)
            .unwrap_or_else(|e| {
                tracing::warn!("failed to load session: {e}");
                None
            })
            .filter(Session::is_valid);
        let api = session.as_ref().and_then(|s| {
            match ApiClient::new(&settings.api_base_url, &s.token) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::error!("failed to build api client: {e}");
                    None
                }
            }
        });
        let toasts = Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]);
        Self {
            settings,
            data_dir,
            session_path,
            session,
            api,
            data: Arc::new(DashboardDataCache::new()),
            dashboard: Dashboard::new(store),
            toasts,
            token_input: String::new(),
            login_error: None,
            bootstrapped: false,
        }
    }

    fn push_toast(&mut self, text: String, kind: ToastKind) {
        if !self.settings.enable_toasts {
            return;
        }
        append_toast_log(&self.data_dir, &text);
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.settings.toast_duration as f64),
        });
    }

    fn sign_in(&mut self, egui_ctx: &egui::Context) {
        let token = self.token_input.trim().to_string();
        match auth::validate_token(&token, Utc::now().timestamp()) {
            TokenStatus::Valid => {}
            TokenStatus::Expired => {
                self.login_error = Some("That token has already expired.".into());
                return;
            }
            TokenStatus::Malformed => {
                self.login_error = Some("That does not look like a valid token.".into());
                return;
            }
        }
        let client = match ApiClient::new(&self.settings.api_base_url, &token) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                self.login_error = Some(format!("Bad backend URL: {e}"));
                return;
            }
        };
        let session = Session::new(token);
        if let Err(e) = auth::save_session(&self.session_path, &session) {
            tracing::warn!("failed to save session: {e}");
        }
        self.session = Some(session);
        self.api = Some(client);
        self.token_input.clear();
        self.login_error = None;
        self.bootstrapped = false;
        self.push_toast("Signed in".into(), ToastKind::Success);
        egui_ctx.request_repaint();
    }

    fn sign_out(&mut self, reason: &str) {
        if let Err(e) = auth::clear_session(&self.session_path) {
            tracing::warn!("failed to clear session: {e}");
        }
        self.session = None;
        self.api = None;
        self.bootstrapped = false;
        self.data = Arc::new(DashboardDataCache::new());
        self.push_toast(reason.to_string(), ToastKind::Info);
    }

    /// Warm every widget's data right after sign-in so the first dashboard
    /// frame is not a wall of spinners.
    fn spawn_initial_refresh(&self, egui_ctx: &egui::Context) {
        let Some(api) = self.api.clone() else {
            return;
        };
        let data = Arc::clone(&self.data);
        let city = self.settings.default_city.clone();
        let currencies = self.settings.currencies.clone();
        let poll_id = self.settings.poll_id;
        let egui_ctx = egui_ctx.clone();
        std::thread::spawn(move || {
            data.refresh_todos(&api);
            data.refresh_weather(&api, &city);
            data.refresh_rates(&api, &currencies);
            data.refresh_poll(&api, poll_id);
            egui_ctx.request_repaint();
        });
    }

    fn login_ui(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.heading("Homeboard");
                ui.weak("Sign in to assemble your home screen.");
                ui.add_space(20.0);

                if ui.button("Open login page").clicked() {
                    match auth::login_url(&self.settings.auth_url) {
                        Ok(url) => {
                            if let Err(e) = open::that(url.as_str()) {
                                tracing::error!("failed to open browser: {e}");
                                self.login_error = Some(format!("Could not open browser: {e}"));
                            }
                        }
                        Err(e) => {
                            self.login_error = Some(format!("Bad auth URL: {e}"));
                        }
                    }
                }
                ui.add_space(10.0);
                ui.weak("Paste the issued token below:");

                let mut submit = false;
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut self.token_input)
                        .hint_text("token")
                        .desired_width(260.0),
                );
                if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit = true;
                }
                if ui.button("Sign in").clicked() {
                    submit = true;
                }
                if submit {
                    self.sign_in(ctx);
                }

                if let Some(err) = &self.login_error {
                    ui.add_space(6.0);
                    ui.colored_label(ui.visuals().error_fg_color, err);
                }
            });
        });
    }

    fn top_bar(&mut self, ctx: &egui::Context) {
        let mut toast_messages: Vec<(String, ToastKind)> = Vec::new();
        let mut signed_out = false;

        egui::TopBottomPanel::top("homeboard-topbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Homeboard");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Log out").clicked() {
                        signed_out = true;
                    }
                    if !self.dashboard.store().is_empty() && ui.button("🗑 Remove all").clicked() {
                        self.dashboard.store_mut().clear_layout();
                        toast_messages.push(("All widgets removed".into(), ToastKind::Info));
                    }
                    ui.menu_button("➕ Add widget", |ui| {
                        let names = self.dashboard.store().registry().names();
                        for id in names {
                            let display = self
                                .dashboard
                                .store()
                                .registry()
                                .display_name(&id)
                                .unwrap_or("?");
                            let mut active = self.dashboard.store().contains(&id);
                            if ui.checkbox(&mut active, display).changed() {
                                let store = self.dashboard.store_mut();
                                if active {
                                    store.add_widget(&id);
                                    toast_messages.push((
                                        format!("{display} widget added"),
                                        ToastKind::Success,
                                    ));
                                } else {
                                    store.remove_widget(&id);
                                    toast_messages.push((
                                        format!("{display} widget removed"),
                                        ToastKind::Info,
                                    ));
                                }
                            }
                        }
                    });
                });
            });
        });

        for (text, kind) in toast_messages {
            self.push_toast(text, kind);
        }
        if signed_out {
            self.sign_out("Logged out");
        }
    }

    fn dashboard_ui(&mut self, ctx: &egui::Context) {
        let mut events: Vec<WidgetEvent> = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.dashboard.store().is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(ui.available_height() * 0.4);
                    ui.label("Add a widget to get started!");
                    ui.weak("Use the \"Add widget\" menu in the top right.");
                });
                return;
            }
            let Some(api) = self.api.clone() else {
                return;
            };
            let data = Arc::clone(&self.data);
            let widget_ctx = DashboardContext {
                api: &api,
                data: &data,
                data_dir: &self.data_dir,
                default_city: &self.settings.default_city,
                currencies: &self.settings.currencies,
                poll_id: self.settings.poll_id,
                ai_provider: &self.settings.ai_provider,
            };
            events = self.dashboard.ui(ui, &widget_ctx);
        });
        for event in events {
            match event {
                WidgetEvent::Toast(text) => self.push_toast(text, ToastKind::Success),
            }
        }
    }
}

impl eframe::App for HomeboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.data.take_auth_expired() {
            self.sign_out("Session expired, sign in again");
        }

        if self.session.is_none() || self.api.is_none() {
            self.login_ui(ctx);
        } else {
            if !self.bootstrapped {
                self.bootstrapped = true;
                self.spawn_initial_refresh(ctx);
            }
            self.top_bar(ctx);
            self.dashboard_ui(ctx);
        }

        self.toasts.show(ctx);
    }
}
