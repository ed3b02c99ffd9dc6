//! Standard component catalog.
//!
//! A small set of component types with their peers, enough to build real
//! screens and to exercise the engine end to end. Applications register
//! their own types and peers next to (or instead of) these.

mod peers;
mod types;

pub use peers::{standard_peers, ElementPeer};
pub use types::standard_types;

pub const COMPONENT: &str = "Component";
pub const WINDOW: &str = "Window";
pub const CONTENT_PANE: &str = "ContentPane";
pub const COLUMN: &str = "Column";
pub const ROW: &str = "Row";
pub const LABEL: &str = "Label";
pub const SPLIT_PANE: &str = "SplitPane";
pub const TEXT_AREA: &str = "TextArea";
pub const TEXT_AREA_EX: &str = "TextAreaEx";
pub const CALENDAR_SELECT: &str = "CalendarSelect";
pub const PROGRESS_BAR: &str = "ProgressBar";

/// Property names used by the standard catalog.
pub mod props {
    pub const TITLE: &str = "title";
    pub const TEXT: &str = "text";
    pub const TOOL_TIP_TEXT: &str = "toolTipText";
    pub const FOREGROUND: &str = "foreground";
    pub const BACKGROUND: &str = "background";
    pub const ENABLED: &str = "enabled";
    pub const CELL_SPACING: &str = "cellSpacing";
    pub const ALIGNMENT: &str = "alignment";
    pub const ORIENTATION: &str = "orientation";
    pub const RESIZABLE: &str = "resizable";
    pub const SEPARATOR_POSITION: &str = "separatorPosition";
    pub const DATE: &str = "date";
    pub const VALUE: &str = "value";
    pub const MINIMUM: &str = "minimum";
    pub const MAXIMUM: &str = "maximum";
}
