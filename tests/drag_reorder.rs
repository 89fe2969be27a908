use homeboard::dashboard::drag::reorder_plan;
use homeboard::dashboard::store::{LayoutStore, LAYOUT_FILE};
use homeboard::dashboard::widgets::WidgetRegistry;
use tempfile::tempdir;

fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn plan_moves_source_to_destination_index() {
    let layout = ids(&["todo", "weather", "poll"]);
    assert_eq!(reorder_plan(&layout, "todo", Some("poll")), Some((0, 2)));
    assert_eq!(reorder_plan(&layout, "poll", Some("todo")), Some((2, 0)));
}

#[test]
fn plan_is_none_when_dropped_outside_the_list() {
    let layout = ids(&["todo", "weather"]);
    assert_eq!(reorder_plan(&layout, "todo", None), None);
}

#[test]
fn plan_is_none_for_stale_ids() {
    let layout = ids(&["todo", "weather"]);
    assert_eq!(reorder_plan(&layout, "gone", Some("weather")), None);
    assert_eq!(reorder_plan(&layout, "todo", Some("gone")), None);
}

#[test]
fn plan_is_none_when_source_equals_destination() {
    let layout = ids(&["todo", "weather"]);
    assert_eq!(reorder_plan(&layout, "todo", Some("todo")), None);
}

#[test]
fn abandoned_drag_leaves_the_layout_identical() {
    let dir = tempdir().expect("tempdir");
    let mut store = LayoutStore::new(
        dir.path().join(LAYOUT_FILE),
        WidgetRegistry::with_defaults(),
    );
    store.add_widget("todo");
    store.add_widget("weather");
    store.add_widget("poll");
    let before = store.ids();

    // A drag released outside every row reports no destination.
    if let Some((from, to)) = reorder_plan(&store.ids(), "weather", None) {
        store.reorder_widgets(from, to);
    }
    assert_eq!(store.ids(), before);

    // A drag whose source disappeared mid-gesture resolves to no plan.
    if let Some((from, to)) = reorder_plan(&store.ids(), "removed-mid-drag", Some("poll")) {
        store.reorder_widgets(from, to);
    }
    assert_eq!(store.ids(), before);
}
