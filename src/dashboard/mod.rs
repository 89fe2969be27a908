pub mod dashboard;
pub mod data_cache;
pub mod drag;
pub mod store;
pub mod widgets;

pub use dashboard::{Dashboard, DashboardContext};
pub use data_cache::{DashboardDataCache, DashboardDataSnapshot};
pub use drag::{reorder_plan, DragSurface};
pub use store::{LayoutStore, WidgetInstance, LAYOUT_FILE};
pub use widgets::{WidgetDescriptor, WidgetEvent, WidgetKind, WidgetRegistry};
