//! Input widgets laid out by a [`Form`](crate::form::Form).
//!
//! Every widget is a [`FocusTarget`]: it carries the editing flag the
//! navigator clears on a forced switch. Composite widgets expose their inner
//! entry through [`FocusTarget::entry_mut`].

use std::any::Any;

use crossterm::event::KeyEvent;

use crate::screen::FocusTarget;

mod focus;
mod select_one;
mod text;
mod titled;

pub use focus::FocusRing;
pub use select_one::{RowState, SelectOne, Selection, TitledSelectOne};
pub use text::TextField;
pub use titled::{TitledField, TitledText};

/// What a widget did with a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetFlow {
    /// Not handled; the form may act on it.
    Continue,
    Consumed,
    /// Handled and the widget finished editing; focus moves on.
    Finished,
}

pub trait Widget: FocusTarget + Send {
    /// Rows to draw, each at most `width` columns wide.
    fn lines(&self, width: u16, focused: bool) -> Vec<String>;

    fn handle_key(&mut self, key: &KeyEvent) -> WidgetFlow;

    /// Whether the focus ring may stop on this widget.
    fn focusable(&self) -> bool {
        true
    }

    fn as_focus_target(&mut self) -> &mut dyn FocusTarget;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
