//! Screen navigation for full-terminal applications.
//!
//! A [`Navigator`] owns a registry of screens, keeps a visit history, and
//! runs one screen's edit cycle at a time. Screens steer it through a weak
//! [`NavigatorHandle`]: request the next screen, force an immediate switch,
//! or step back through history. [`Form`] is the stock screen built from
//! widgets, and [`TerminalDriver`] runs a session on the real terminal.

pub mod driver;
pub mod error;
pub mod form;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod navigator;
pub mod registry;
pub mod render;
pub mod screen;
pub mod widgets;
pub mod width;

pub use driver::{DriverError, DriverResult, TerminalDriver};
pub use error::{NavError, Result};
pub use form::{Form, FormHandler};
pub use geometry::Size;
pub use input::{
    EventSource, KeyChord, Keymap, ScreenEvent, ScriptedEvents, TerminalEvents, parse_key_chord,
};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use metrics::{MetricSnapshot, NavigationMetrics};
pub use navigator::audit::{
    NavigationAudit, NavigationAuditEvent, NavigationAuditEventBuilder, NavigationAuditStage,
    NullNavigationAudit, RecordingAudit,
};
pub use navigator::{
    DEFAULT_STARTING_SCREEN, History, Navigator, NavigatorApp, NavigatorConfig, NavigatorHandle,
    NavigatorPhase, Target,
};
pub use registry::{EntryKind, ScreenArgs, ScreenFactory, ScreenId, ScreenRegistry};
pub use render::LineRenderer;
pub use screen::{FocusTarget, Screen, ScreenKind, Surface, interrupt_editing};
pub use widgets::{
    FocusRing, RowState, SelectOne, Selection, TextField, TitledField, TitledSelectOne,
    TitledText, Widget, WidgetFlow,
};
pub use width::display_width;
