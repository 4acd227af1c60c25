//! Floating panels: the selection popup and the per-sample drill-down.

pub mod detail_ui;
pub mod selection_ui;

pub use detail_ui::detail_window;
pub use selection_ui::{selection_window, SelectionAction};
