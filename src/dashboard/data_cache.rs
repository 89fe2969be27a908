use crate::api::{ApiClient, ApiError, ExchangeRate, Poll, Todo, WeatherReport};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Immutable view of the backend data the widgets render from. Refreshes swap
/// in a new snapshot; readers keep whatever they cloned for the frame.
#[derive(Clone, Default)]
pub struct DashboardDataSnapshot {
    pub todos: Arc<Vec<Todo>>,
    pub weather: Arc<Option<WeatherReport>>,
    pub rates: Arc<Vec<ExchangeRate>>,
    pub poll: Arc<Option<Poll>>,
    pub todos_error: Option<String>,
    pub weather_error: Option<String>,
    pub rates_error: Option<String>,
    pub poll_error: Option<String>,
}

impl DashboardDataSnapshot {
    fn with_todos(&self, todos: Vec<Todo>) -> Self {
        Self {
            todos: Arc::new(todos),
            todos_error: None,
            ..self.clone()
        }
    }

    fn with_todos_error(&self, msg: String) -> Self {
        Self {
            todos_error: Some(msg),
            ..self.clone()
        }
    }

    fn with_weather(&self, weather: WeatherReport) -> Self {
        Self {
            weather: Arc::new(Some(weather)),
            weather_error: None,
            ..self.clone()
        }
    }

    fn with_weather_error(&self, msg: String) -> Self {
        Self {
            weather_error: Some(msg),
            ..self.clone()
        }
    }

    fn with_rates(&self, rates: Vec<ExchangeRate>) -> Self {
        Self {
            rates: Arc::new(rates),
            rates_error: None,
            ..self.clone()
        }
    }

    fn with_rates_error(&self, msg: String) -> Self {
        Self {
            rates_error: Some(msg),
            ..self.clone()
        }
    }

    fn with_poll(&self, poll: Poll) -> Self {
        Self {
            poll: Arc::new(Some(poll)),
            poll_error: None,
            ..self.clone()
        }
    }

    fn with_poll_error(&self, msg: String) -> Self {
        Self {
            poll_error: Some(msg),
            ..self.clone()
        }
    }
}

/// Shared cache between the UI thread and the background fetch threads.
pub struct DashboardDataCache {
    state: Mutex<Arc<DashboardDataSnapshot>>,
    version: AtomicU64,
    auth_expired: AtomicBool,
}

impl DashboardDataCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Arc::new(DashboardDataSnapshot::default())),
            version: AtomicU64::new(0),
            auth_expired: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Arc<DashboardDataSnapshot> {
        self.state
            .lock()
            .map(|state| Arc::clone(&state))
            .unwrap_or_default()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn mark_auth_expired(&self) {
        self.auth_expired.store(true, Ordering::SeqCst);
    }

    /// Read and reset the auth flag; the GUI polls this once per frame to
    /// drive the session gate.
    pub fn take_auth_expired(&self) -> bool {
        self.auth_expired.swap(false, Ordering::SeqCst)
    }

    fn swap(&self, f: impl FnOnce(&DashboardDataSnapshot) -> DashboardDataSnapshot) {
        if let Ok(mut state) = self.state.lock() {
            let next = Arc::new(f(&state));
            *state = next;
            self.version.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fail(
        &self,
        what: &str,
        err: ApiError,
        f: impl FnOnce(&DashboardDataSnapshot, String) -> DashboardDataSnapshot,
    ) {
        if matches!(err, ApiError::Unauthorized) {
            self.mark_auth_expired();
            return;
        }
        tracing::warn!("{what} refresh failed: {err}");
        self.swap(|s| f(s, err.to_string()));
    }

    pub fn refresh_todos(&self, api: &ApiClient) {
        match api.list_todos() {
            Ok(todos) => self.swap(|s| s.with_todos(todos)),
            Err(e) => self.fail("todo", e, |s, msg| s.with_todos_error(msg)),
        }
    }

    pub fn refresh_weather(&self, api: &ApiClient, city: &str) {
        match api.weather(city) {
            Ok(weather) => self.swap(|s| s.with_weather(weather)),
            Err(e) => self.fail("weather", e, |s, msg| s.with_weather_error(msg)),
        }
    }

    pub fn refresh_rates(&self, api: &ApiClient, currencies: &[String]) {
        match api.exchange_rates(currencies) {
            Ok(rates) => self.swap(|s| s.with_rates(rates)),
            Err(e) => self.fail("rates", e, |s, msg| s.with_rates_error(msg)),
        }
    }

    pub fn refresh_poll(&self, api: &ApiClient, poll_id: i64) {
        match api.poll(poll_id) {
            Ok(poll) => self.swap(|s| s.with_poll(poll)),
            Err(e) => self.fail("poll", e, |s, msg| s.with_poll_error(msg)),
        }
    }
}

impl Default for DashboardDataCache {
    fn default() -> Self {
        Self::new()
    }
}
