use homeboard::dashboard::store::{LayoutStore, LAYOUT_FILE};
use homeboard::dashboard::widgets::WidgetRegistry;
use std::path::Path;
use tempfile::tempdir;

fn new_store(dir: &Path) -> LayoutStore {
    LayoutStore::new(dir.join(LAYOUT_FILE), WidgetRegistry::with_defaults())
}

fn persisted_ids(dir: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(dir.join(LAYOUT_FILE)).expect("layout file");
    let value: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    value["widgets"]
        .as_array()
        .expect("widgets array")
        .iter()
        .map(|w| w["id"].as_str().expect("id string").to_string())
        .collect()
}

#[test]
fn starts_empty_without_a_file() {
    let dir = tempdir().expect("tempdir");
    let store = new_store(dir.path());
    assert!(store.is_empty());
}

#[test]
fn add_is_idempotent_and_ids_stay_unique() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());

    store.add_widget("todo");
    store.add_widget("todo");
    assert_eq!(store.ids(), vec!["todo"]);

    store.add_widget("weather");
    store.add_widget("todo");
    assert_eq!(store.ids(), vec!["todo", "weather"]);
}

#[test]
fn unknown_id_on_add_is_ignored() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    store.add_widget("does-not-exist");
    assert!(store.is_empty());
}

#[test]
fn remove_of_absent_id_is_a_no_op() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    store.add_widget("todo");
    store.remove_widget("weather");
    assert_eq!(store.ids(), vec!["todo"]);
}

#[test]
fn persisted_form_is_an_ordered_id_list() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    store.add_widget("todo");
    assert_eq!(persisted_ids(dir.path()), vec!["todo"]);

    store.add_widget("weather");
    assert_eq!(persisted_ids(dir.path()), vec!["todo", "weather"]);
}

#[test]
fn rehydration_restores_the_saved_order() {
    let dir = tempdir().expect("tempdir");
    {
        let mut store = new_store(dir.path());
        store.add_widget("todo");
        store.add_widget("weather");
        store.reorder_widgets(0, 1);
        assert_eq!(store.ids(), vec!["weather", "todo"]);
    }
    let reloaded = new_store(dir.path());
    assert_eq!(reloaded.ids(), vec!["weather", "todo"]);
}

#[test]
fn rehydration_drops_ids_missing_from_the_registry() {
    let dir = tempdir().expect("tempdir");
    let layout = r#"{ "widgets": [ {"id": "todo"}, {"id": "retired"}, {"id": "weather"} ] }"#;
    std::fs::write(dir.path().join(LAYOUT_FILE), layout).expect("write layout");

    let store = new_store(dir.path());
    assert_eq!(store.ids(), vec!["todo", "weather"]);
}

#[test]
fn rehydration_deduplicates_a_hand_edited_file() {
    let dir = tempdir().expect("tempdir");
    let layout = r#"{ "widgets": [ {"id": "todo"}, {"id": "weather"}, {"id": "todo"} ] }"#;
    std::fs::write(dir.path().join(LAYOUT_FILE), layout).expect("write layout");

    let store = new_store(dir.path());
    assert_eq!(store.ids(), vec!["todo", "weather"]);
}

#[test]
fn rehydration_tolerates_a_corrupt_file() {
    let dir = tempdir().expect("tempdir");
    std::fs::write(dir.path().join(LAYOUT_FILE), "not json {").expect("write layout");
    let store = new_store(dir.path());
    assert!(store.is_empty());
}

#[test]
fn reorder_is_a_move_not_a_swap() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    for id in ["todo", "weather", "exchange-rate", "ai-chat"] {
        store.add_widget(id);
    }
    store.reorder_widgets(0, 2);
    assert_eq!(
        store.ids(),
        vec!["weather", "exchange-rate", "todo", "ai-chat"]
    );
}

#[test]
fn reorder_rejects_out_of_range_source_and_clamps_destination() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    store.add_widget("todo");
    store.add_widget("weather");

    store.reorder_widgets(5, 0);
    assert_eq!(store.ids(), vec!["todo", "weather"]);

    store.reorder_widgets(0, 99);
    assert_eq!(store.ids(), vec!["weather", "todo"]);
}

#[test]
fn clear_empties_and_persists() {
    let dir = tempdir().expect("tempdir");
    {
        let mut store = new_store(dir.path());
        store.add_widget("todo");
        store.add_widget("weather");
        store.clear_layout();
        assert!(store.is_empty());
    }
    assert!(persisted_ids(dir.path()).is_empty());
    let reloaded = new_store(dir.path());
    assert!(reloaded.is_empty());
}

#[test]
fn set_layout_replaces_the_whole_sequence() {
    let dir = tempdir().expect("tempdir");
    let mut store = new_store(dir.path());
    store.add_widget("todo");

    let registry = WidgetRegistry::with_defaults();
    let replacement = ["poll", "weather"]
        .into_iter()
        .map(|id| homeboard::dashboard::store::WidgetInstance {
            id: id.to_string(),
            widget: registry.create(id, dir.path()).expect("known widget"),
        })
        .collect();
    store.set_layout(replacement);

    assert_eq!(store.ids(), vec!["poll", "weather"]);
    assert_eq!(persisted_ids(dir.path()), vec!["poll", "weather"]);
}

#[test]
fn removal_cleans_up_only_that_widgets_files() {
    let dir = tempdir().expect("tempdir");
    let weather_state = dir.path().join("weather_widget.json");
    let exchange_state = dir.path().join("exchange_widget.json");
    std::fs::write(&weather_state, r#"{ "city": "Busan" }"#).expect("write weather state");
    std::fs::write(&exchange_state, r#"{ "currency": "USD" }"#).expect("write exchange state");

    let mut store = new_store(dir.path());
    store.add_widget("weather");
    store.add_widget("exchange-rate");

    store.remove_widget("weather");
    assert!(!weather_state.exists());
    assert!(exchange_state.exists());
    assert_eq!(store.ids(), vec!["exchange-rate"]);
}

#[test]
fn clear_does_not_run_per_widget_cleanup() {
    let dir = tempdir().expect("tempdir");
    let weather_state = dir.path().join("weather_widget.json");
    std::fs::write(&weather_state, r#"{ "city": "Busan" }"#).expect("write weather state");

    let mut store = new_store(dir.path());
    store.add_widget("weather");
    store.clear_layout();

    assert!(store.is_empty());
    assert!(weather_state.exists());
}

#[test]
fn end_to_end_toggle_reorder_reload() {
    let dir = tempdir().expect("tempdir");
    {
        let mut store = new_store(dir.path());
        store.add_widget("todo");
        assert_eq!(persisted_ids(dir.path()), vec!["todo"]);

        store.add_widget("weather");
        assert_eq!(store.ids(), vec!["todo", "weather"]);

        store.reorder_widgets(0, 1);
        assert_eq!(store.ids(), vec!["weather", "todo"]);
        assert_eq!(persisted_ids(dir.path()), vec!["weather", "todo"]);
    }
    let reloaded = new_store(dir.path());
    assert_eq!(reloaded.ids(), vec!["weather", "todo"]);
}
