use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use super::{TitledField, Widget, WidgetFlow};
use crate::render::ansi;
use crate::screen::FocusTarget;
use crate::width::truncate_to_width;

/// Selected row indices, always held as a sequence.
///
/// A single index becomes a one-element sequence and an absent value an
/// empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<usize>);

impl Selection {
    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn first(&self) -> Option<usize> {
        self.0.first().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<usize> for Selection {
    fn from(index: usize) -> Self {
        Selection(vec![index])
    }
}

impl From<Option<usize>> for Selection {
    fn from(index: Option<usize>) -> Self {
        Selection(index.into_iter().collect())
    }
}

impl From<Vec<usize>> for Selection {
    fn from(indices: Vec<usize>) -> Self {
        Selection(indices)
    }
}

impl From<&[usize]> for Selection {
    fn from(indices: &[usize]) -> Self {
        Selection(indices.to_vec())
    }
}

/// How one visible row of a [`SelectOne`] is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowState<'a> {
    /// The row index is past the end of the values.
    Hidden,
    Shown {
        label: &'a str,
        bold: bool,
        checked: bool,
    },
}

/// Scrollable list where at most one row is selected.
#[derive(Debug, Clone)]
pub struct SelectOne {
    values: Vec<String>,
    selection: Selection,
    cursor_line: usize,
    start_display_at: usize,
    height: usize,
    editing: bool,
}

/// Labelled [`SelectOne`].
pub type TitledSelectOne = TitledField<SelectOne>;

impl SelectOne {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        let height = values.len().max(1);
        Self {
            values,
            selection: Selection::default(),
            cursor_line: 0,
            start_display_at: 0,
            height,
            editing: false,
        }
    }

    /// Limit the number of rows drawn at once.
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(1);
        self
    }

    pub fn with_value(mut self, value: impl Into<Selection>) -> Self {
        self.set_value(value);
        self
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self) -> &Selection {
        &self.selection
    }

    pub fn set_value(&mut self, value: impl Into<Selection>) {
        self.selection = value.into();
    }

    /// Label of the selected row, if any.
    pub fn selected_label(&self) -> Option<&str> {
        self.selection
            .first()
            .and_then(|index| self.values.get(index))
            .map(String::as_str)
    }

    pub fn cursor_line(&self) -> usize {
        self.cursor_line
    }

    /// Display state of row `index`, derived from selection membership.
    pub fn row_state(&self, index: usize) -> RowState<'_> {
        match self.values.get(index) {
            None => RowState::Hidden,
            Some(label) => {
                let selected = self.selection.contains(index);
                RowState::Shown {
                    label,
                    bold: selected,
                    checked: selected,
                }
            }
        }
    }

    /// Replace the whole selection with the row under the cursor.
    pub fn select_cursor(&mut self) {
        if self.cursor_line < self.values.len() {
            self.selection = Selection::from(self.cursor_line);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.values.is_empty() {
            return;
        }
        let last = self.values.len() - 1;
        self.cursor_line = self.cursor_line.saturating_add_signed(delta).min(last);
        if self.cursor_line < self.start_display_at {
            self.start_display_at = self.cursor_line;
        } else if self.cursor_line >= self.start_display_at.saturating_add(self.height) {
            self.start_display_at = self.cursor_line + 1 - self.height;
        }
    }
}

impl FocusTarget for SelectOne {
    fn is_editing(&self) -> bool {
        self.editing
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }
}

impl Widget for SelectOne {
    fn lines(&self, width: u16, focused: bool) -> Vec<String> {
        let visible = self
            .height
            .min(self.values.len().saturating_sub(self.start_display_at));
        let mut rows = Vec::with_capacity(visible);
        for index in self.start_display_at..self.start_display_at + visible {
            let RowState::Shown { label, bold, checked } = self.row_state(index) else {
                break;
            };
            let marker = if checked { "(X) " } else { "( ) " };
            let text = truncate_to_width(&format!("{marker}{label}"), width as usize);
            let text = if focused && self.editing && index == self.cursor_line {
                ansi::reversed(&text)
            } else if bold {
                ansi::bolded(&text)
            } else {
                text
            };
            rows.push(text);
        }
        rows
    }

    fn handle_key(&mut self, key: &KeyEvent) -> WidgetFlow {
        if key.kind == KeyEventKind::Release {
            return WidgetFlow::Continue;
        }
        let page = isize::try_from(self.height).unwrap_or(isize::MAX);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-page),
            KeyCode::PageDown => self.move_cursor(page),
            KeyCode::Home | KeyCode::Char('g') => self.move_cursor(isize::MIN),
            KeyCode::End | KeyCode::Char('G') => self.move_cursor(isize::MAX),
            KeyCode::Char(' ') | KeyCode::Char('x') => self.select_cursor(),
            KeyCode::Enter => {
                self.select_cursor();
                self.editing = false;
                return WidgetFlow::Finished;
            }
            _ => return WidgetFlow::Continue,
        }
        WidgetFlow::Consumed
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
