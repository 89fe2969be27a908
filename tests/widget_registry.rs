use homeboard::dashboard::widgets::ai_chat::AI_CHAT_HISTORY_FILE;
use homeboard::dashboard::widgets::exchange_rate::EXCHANGE_STATE_FILE;
use homeboard::dashboard::widgets::weather::WEATHER_STATE_FILE;
use homeboard::dashboard::widgets::{WidgetKind, WidgetRegistry};
use tempfile::tempdir;

#[test]
fn default_catalog_contains_the_five_widgets() {
    let registry = WidgetRegistry::with_defaults();
    assert_eq!(
        registry.names(),
        vec!["ai-chat", "exchange-rate", "poll", "todo", "weather"]
    );
}

#[test]
fn kind_ids_roundtrip_and_cover_the_registry() {
    let registry = WidgetRegistry::with_defaults();
    for kind in WidgetKind::ALL {
        assert_eq!(WidgetKind::from_id(kind.id()), Some(kind));
        assert!(registry.contains(kind.id()));
    }
    assert_eq!(WidgetKind::from_id("retired"), None);
    assert_eq!(registry.names().len(), WidgetKind::ALL.len());
}

#[test]
fn display_names_resolve() {
    let registry = WidgetRegistry::with_defaults();
    assert_eq!(registry.display_name("todo"), Some("Todo"));
    assert_eq!(registry.display_name("weather"), Some("Weather"));
    assert_eq!(registry.display_name("exchange-rate"), Some("Exchange Rates"));
    assert_eq!(registry.display_name("ai-chat"), Some("AI Chat"));
    assert_eq!(registry.display_name("poll"), Some("Poll"));
    assert_eq!(registry.display_name("nope"), None);
}

#[test]
fn cleanup_declarations_match_the_widget_state_files() {
    let registry = WidgetRegistry::with_defaults();
    let cleanup = |id: &str| {
        registry
            .descriptor(id)
            .map(|d| d.cleanup_files().to_vec())
            .expect("descriptor")
    };
    assert_eq!(cleanup("weather"), vec![WEATHER_STATE_FILE]);
    assert_eq!(cleanup("exchange-rate"), vec![EXCHANGE_STATE_FILE]);
    assert_eq!(cleanup("ai-chat"), vec![AI_CHAT_HISTORY_FILE]);
    assert!(cleanup("todo").is_empty());
    assert!(cleanup("poll").is_empty());
}

#[test]
fn create_builds_known_widgets_and_rejects_unknown_ids() {
    let dir = tempdir().expect("tempdir");
    let registry = WidgetRegistry::with_defaults();
    for id in registry.names() {
        assert!(registry.create(&id, dir.path()).is_some(), "{id} missing");
    }
    assert!(registry.create("retired", dir.path()).is_none());
    assert!(!registry.contains("retired"));
}

#[test]
fn widgets_pick_up_their_persisted_state_files() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join(WEATHER_STATE_FILE),
        r#"{ "city": "Busan" }"#,
    )
    .expect("write state");

    let state =
        homeboard::dashboard::widgets::weather::load_state(dir.path().join(WEATHER_STATE_FILE))
            .expect("load state");
    assert_eq!(state.city, "Busan");
}
