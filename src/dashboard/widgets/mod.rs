use crate::api::ApiError;
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::data_cache::DashboardDataCache;
use eframe::egui;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub mod ai_chat;
pub mod exchange_rate;
pub mod poll;
pub mod todo;
pub mod weather;

pub use ai_chat::AiChatWidget;
pub use exchange_rate::ExchangeRateWidget;
pub use poll::PollWidget;
pub use todo::TodoWidget;
pub use weather::WeatherWidget;

/// Feedback a widget hands back to the surrounding app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Toast(String),
}

/// Widget trait implemented by all dashboard widgets. Rendering happens on
/// the UI thread; anything slow is pushed to a background thread that reports
/// through the data cache.
pub trait Widget: Send {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetEvent>;
}

/// Catalog entry for one widget type: display name, constructor, and the
/// durable files to delete when the widget is removed from the layout.
/// Keeping the cleanup declaration here means the registry and the cleanup
/// set cannot drift apart.
#[derive(Clone)]
pub struct WidgetDescriptor {
    display_name: &'static str,
    cleanup_files: &'static [&'static str],
    ctor: Arc<dyn Fn(&Path) -> Box<dyn Widget> + Send + Sync>,
}

impl WidgetDescriptor {
    pub fn new(
        display_name: &'static str,
        ctor: impl Fn(&Path) -> Box<dyn Widget> + Send + Sync + 'static,
    ) -> Self {
        Self {
            display_name,
            cleanup_files: &[],
            ctor: Arc::new(ctor),
        }
    }

    pub fn with_cleanup(mut self, files: &'static [&'static str]) -> Self {
        self.cleanup_files = files;
        self
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn cleanup_files(&self) -> &'static [&'static str] {
        self.cleanup_files
    }

    /// Build a fresh widget instance. `data_dir` is where per-widget state
    /// files live.
    pub fn create(&self, data_dir: &Path) -> Box<dyn Widget> {
        (self.ctor)(data_dir)
    }
}

/// The closed set of widget types. The default registry is generated from
/// this enum, so adding a variant without supplying its id and descriptor is
/// a compile error rather than a silent lookup miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Todo,
    Weather,
    ExchangeRate,
    AiChat,
    Poll,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 5] = [
        WidgetKind::Todo,
        WidgetKind::Weather,
        WidgetKind::ExchangeRate,
        WidgetKind::AiChat,
        WidgetKind::Poll,
    ];

    /// Stable identifier used in the persisted layout.
    pub fn id(self) -> &'static str {
        match self {
            WidgetKind::Todo => "todo",
            WidgetKind::Weather => "weather",
            WidgetKind::ExchangeRate => "exchange-rate",
            WidgetKind::AiChat => "ai-chat",
            WidgetKind::Poll => "poll",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    fn descriptor(self) -> WidgetDescriptor {
        match self {
            WidgetKind::Todo => WidgetDescriptor::new("Todo", |_| Box::<TodoWidget>::default()),
            WidgetKind::Weather => {
                WidgetDescriptor::new("Weather", |dir| Box::new(WeatherWidget::new(dir)))
                    .with_cleanup(&[weather::WEATHER_STATE_FILE])
            }
            WidgetKind::ExchangeRate => WidgetDescriptor::new("Exchange Rates", |dir| {
                Box::new(ExchangeRateWidget::new(dir))
            })
            .with_cleanup(&[exchange_rate::EXCHANGE_STATE_FILE]),
            WidgetKind::AiChat => {
                WidgetDescriptor::new("AI Chat", |dir| Box::new(AiChatWidget::new(dir)))
                    .with_cleanup(&[ai_chat::AI_CHAT_HISTORY_FILE])
            }
            WidgetKind::Poll => WidgetDescriptor::new("Poll", |_| Box::<PollWidget>::default()),
        }
    }
}

#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<String, WidgetDescriptor>,
}

impl WidgetRegistry {
    /// The built-in widget catalog.
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        for kind in WidgetKind::ALL {
            reg.register(kind.id(), kind.descriptor());
        }
        reg
    }

    pub fn register(&mut self, id: &str, descriptor: WidgetDescriptor) {
        self.map.insert(id.to_string(), descriptor);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    pub fn descriptor(&self, id: &str) -> Option<&WidgetDescriptor> {
        self.map.get(id)
    }

    pub fn display_name(&self, id: &str) -> Option<&'static str> {
        self.map.get(id).map(|d| d.display_name())
    }

    pub fn create(&self, id: &str, data_dir: &Path) -> Option<Box<dyn Widget>> {
        self.map.get(id).map(|d| d.create(data_dir))
    }

    /// Ids in a stable order for menus.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.map.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Shared handling for background mutation failures: an auth rejection flips
/// the session gate, everything else is logged and surfaced on the next
/// refresh.
pub(crate) fn report_mutation_error(data: &DashboardDataCache, what: &str, err: &ApiError) {
    if matches!(err, ApiError::Unauthorized) {
        data.mark_auth_expired();
    } else {
        tracing::warn!("{what} failed: {err}");
    }
}
