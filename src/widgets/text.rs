use std::any::Any;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Widget, WidgetFlow};
use crate::render::ansi;
use crate::screen::FocusTarget;
use crate::width::truncate_to_width;

/// Single-line editable text.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    /// Cursor position in chars.
    cursor: usize,
    editing: bool,
}

impl TextField {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            editing: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    fn remove_at(&mut self, chars: usize) {
        if chars < self.value.chars().count() {
            let at = self.byte_index(chars);
            self.value.remove(at);
        }
    }
}

impl FocusTarget for TextField {
    fn is_editing(&self) -> bool {
        self.editing
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }
}

impl Widget for TextField {
    fn lines(&self, width: u16, focused: bool) -> Vec<String> {
        let width = width as usize;
        if width == 0 {
            return vec![String::new()];
        }
        if !(focused && self.editing) {
            return vec![truncate_to_width(&self.value, width)];
        }

        // Scroll horizontally so the cursor cell stays visible.
        let start = self.cursor.saturating_sub(width - 1);
        let visible: Vec<char> = self.value.chars().skip(start).collect();
        let at = self.cursor - start;
        let before: String = visible.iter().take(at).collect();
        let under = visible.get(at).copied().unwrap_or(' ');
        let after: String = visible.iter().skip(at + 1).collect();
        let before = truncate_to_width(&before, width.saturating_sub(1));
        let room = width.saturating_sub(crate::width::display_width(&before) + 1);
        vec![format!(
            "{before}{}{}",
            ansi::reversed(&under.to_string()),
            truncate_to_width(&after, room)
        )]
    }

    fn handle_key(&mut self, key: &KeyEvent) -> WidgetFlow {
        if key.kind == KeyEventKind::Release {
            return WidgetFlow::Continue;
        }
        match key.code {
            KeyCode::Char(ch) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    || key.modifiers.contains(KeyModifiers::ALT)
                {
                    return WidgetFlow::Continue;
                }
                self.insert(ch);
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => self.remove_at(self.cursor),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.value.chars().count(),
            KeyCode::Enter => {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn press(field: &mut TextField, code: KeyCode) -> WidgetFlow {
        field.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn edits_at_cursor() {
        let mut field = TextField::new("ac");
        press(&mut field, KeyCode::Left);
        press(&mut field, KeyCode::Char('b'));
        assert_eq!(field.value(), "abc");
        press(&mut field, KeyCode::Home);
        press(&mut field, KeyCode::Delete);
        assert_eq!(field.value(), "bc");
        press(&mut field, KeyCode::End);
        press(&mut field, KeyCode::Backspace);
        assert_eq!(field.value(), "b");
    }

    #[test]
    fn handles_multibyte_text() {
        let mut field = TextField::new("日本");
        press(&mut field, KeyCode::Backspace);
        press(&mut field, KeyCode::Char('語'));
        assert_eq!(field.value(), "日語");
    }

    #[test]
    fn control_chords_pass_through() {
        let mut field = TextField::new("");
        let flow = field.handle_key(&KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL));
        assert_eq!(flow, WidgetFlow::Continue);
        assert_eq!(field.value(), "");
    }

    #[test]
    fn enter_finishes_editing() {
        let mut field = TextField::new("done");
        field.set_editing(true);
        assert_eq!(press(&mut field, KeyCode::Enter), WidgetFlow::Finished);
        assert!(!field.is_editing());
    }

    #[test]
    fn editing_render_marks_cursor() {
        let mut field = TextField::new("abc");
        field.set_editing(true);
        let line = &field.lines(10, true)[0];
        assert!(line.starts_with("abc"));
        assert!(line.contains(ansi::reverse()));
        assert_eq!(field.lines(2, false), vec!["ab".to_string()]);
    }
}
