use std::any::Any;

use crossterm::event::KeyEvent;

use super::{TextField, Widget, WidgetFlow};
use crate::render::ansi;
use crate::screen::FocusTarget;
use crate::width::{display_width, truncate_to_width};

const DEFAULT_ENTRY_COLUMN: usize = 16;

/// A label followed by an entry widget on the same row.
///
/// The label and the entry keep separate editing flags. The form raises both
/// on focus; the navigator must clear both on a forced switch, otherwise the
/// entry swallows the next key press.
pub struct TitledField<W> {
    title: String,
    entry: W,
    editing: bool,
    entry_column: usize,
}

/// Labelled single-line text entry.
pub type TitledText = TitledField<TextField>;

impl<W: Widget> TitledField<W> {
    pub fn new(title: impl Into<String>, entry: W) -> Self {
        Self {
            title: title.into(),
            entry,
            editing: false,
            entry_column: DEFAULT_ENTRY_COLUMN,
        }
    }

    /// Column (0-based) where the entry starts.
    pub fn with_entry_column(mut self, column: usize) -> Self {
        self.entry_column = column;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn inner(&self) -> &W {
        &self.entry
    }

    pub fn inner_mut(&mut self) -> &mut W {
        &mut self.entry
    }
}

impl TitledText {
    pub fn text(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(title, TextField::new(value))
    }

    pub fn value(&self) -> &str {
        self.entry.value()
    }
}

impl<W: Widget> FocusTarget for TitledField<W> {
    fn is_editing(&self) -> bool {
        self.editing
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    fn entry_mut(&mut self) -> Option<&mut dyn FocusTarget> {
        Some(self.entry.as_focus_target())
    }
}

impl<W: Widget + 'static> Widget for TitledField<W> {
    fn lines(&self, width: u16, focused: bool) -> Vec<String> {
        let width = width as usize;
        let column = self.entry_column.min(width);
        let label = truncate_to_width(&self.title, column.saturating_sub(1));
        let pad = " ".repeat(column - display_width(&label));
        let label = if focused {
            ansi::bolded(&label)
        } else {
            label
        };

        let entry_width = (width - column) as u16;
        let mut rows = self.entry.lines(entry_width, focused && self.editing);
        if rows.is_empty() {
            rows.push(String::new());
        }
        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                if index == 0 {
                    format!("{label}{pad}{row}")
                } else {
                    format!("{}{row}", " ".repeat(column))
                }
            })
            .collect()
    }

    fn handle_key(&mut self, key: &KeyEvent) -> WidgetFlow {
        let flow = self.entry.handle_key(key);
        if flow == WidgetFlow::Finished {
            self.editing = false;
        }
        flow
    }

    fn focusable(&self) -> bool {
        self.entry.focusable()
    }

    fn as_focus_target(&mut self) -> &mut dyn FocusTarget {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::set_editing_deep;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn label_precedes_entry() {
        let field = TitledText::text("Text:", "hello").with_entry_column(8);
        assert_eq!(field.lines(20, false), vec!["Text:   hello".to_string()]);
    }

    #[test]
    fn long_label_is_clipped() {
        let field = TitledText::text("A very long label", "x").with_entry_column(6);
        assert_eq!(field.lines(10, false), vec!["A ver x".to_string()]);
    }

    #[test]
    fn flags_are_separate() {
        let mut field = TitledText::text("Name:", "");
        field.set_editing(true);
        assert!(field.is_editing());
        assert!(!field.inner().is_editing());

        set_editing_deep(&mut field, true);
        assert!(field.inner().is_editing());
        set_editing_deep(&mut field, false);
        assert!(!field.is_editing() && !field.inner().is_editing());
    }

    #[test]
    fn finishing_entry_ends_outer_edit() {
        let mut field = TitledText::text("Name:", "");
        set_editing_deep(&mut field, true);
        let flow = field.handle_key(&KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(flow, WidgetFlow::Finished);
        assert!(!field.is_editing());
    }
}
