//! Input events delivered to screens and the sources that produce them.

use std::collections::VecDeque;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use crossterm::terminal;

use crate::{Result, Size};

pub mod keymap;

pub use keymap::{KeyChord, Keymap, parse_key_chord};

/// Events a screen's edit cycle reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    Resize(Size),
    FocusGained,
    FocusLost,
}

impl ScreenEvent {
    pub fn describe(&self) -> &'static str {
        match self {
            ScreenEvent::Key(_) => "key",
            ScreenEvent::Mouse(_) => "mouse",
            ScreenEvent::Paste(_) => "paste",
            ScreenEvent::Resize(_) => "resize",
            ScreenEvent::FocusGained => "focus_gained",
            ScreenEvent::FocusLost => "focus_lost",
        }
    }

    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            ScreenEvent::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl From<CrosstermEvent> for ScreenEvent {
    fn from(event: CrosstermEvent) -> Self {
        match event {
            CrosstermEvent::Key(key) => ScreenEvent::Key(key),
            CrosstermEvent::Mouse(mouse) => ScreenEvent::Mouse(mouse),
            CrosstermEvent::Paste(data) => ScreenEvent::Paste(data),
            CrosstermEvent::FocusGained => ScreenEvent::FocusGained,
            CrosstermEvent::FocusLost => ScreenEvent::FocusLost,
            CrosstermEvent::Resize(width, height) => ScreenEvent::Resize(Size::new(width, height)),
        }
    }
}

/// Blocking source of screen events.
///
/// `Ok(None)` means the source is exhausted and no further input will arrive.
/// The navigator then ends the session: the active screen stops editing and
/// any target it had already requested is replaced by [`Target::Stop`].
///
/// [`Target::Stop`]: crate::navigator::Target::Stop
pub trait EventSource {
    fn next_event(&mut self) -> Result<Option<ScreenEvent>>;
    fn size(&self) -> Result<Size>;
}

/// Reads events from the controlling terminal through crossterm.
#[derive(Debug, Default)]
pub struct TerminalEvents;

impl TerminalEvents {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for TerminalEvents {
    fn next_event(&mut self) -> Result<Option<ScreenEvent>> {
        let event = event::read()?;
        Ok(Some(ScreenEvent::from(event)))
    }

    fn size(&self) -> Result<Size> {
        let (width, height) = terminal::size()?;
        Ok(Size::new(width, height))
    }
}

/// Pre-recorded events, replayed in order. Exhausted once the queue drains.
#[derive(Debug, Clone, Default)]
pub struct ScriptedEvents {
    queue: VecDeque<ScreenEvent>,
    size: Size,
}

impl ScriptedEvents {
    pub fn new<I>(events: I) -> Self
    where
        I: IntoIterator<Item = ScreenEvent>,
    {
        Self {
            queue: events.into_iter().collect(),
            size: Size::default(),
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn push(&mut self, event: ScreenEvent) {
        self.queue.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self) -> Result<Option<ScreenEvent>> {
        let next = self.queue.pop_front();
        if let Some(ScreenEvent::Resize(size)) = next.as_ref() {
            self.size = *size;
        }
        Ok(next)
    }

    fn size(&self) -> Result<Size> {
        Ok(self.size)
    }
}

/// Build a key-press event, mostly for scripted sessions.
pub fn key(code: crossterm::event::KeyCode) -> ScreenEvent {
    ScreenEvent::Key(KeyEvent::new(code, crossterm::event::KeyModifiers::NONE))
}

/// Build a ctrl+`ch` key-press event.
pub fn ctrl(ch: char) -> ScreenEvent {
    ScreenEvent::Key(KeyEvent::new(
        crossterm::event::KeyCode::Char(ch),
        crossterm::event::KeyModifiers::CONTROL,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn scripted_events_drain_in_order() {
        let mut events = ScriptedEvents::new([key(KeyCode::Tab), ctrl('t')]);
        assert_eq!(events.remaining(), 2);
        assert_eq!(events.next_event().expect("first"), Some(key(KeyCode::Tab)));
        assert_eq!(events.next_event().expect("second"), Some(ctrl('t')));
        assert_eq!(events.next_event().expect("drained"), None);
    }

    #[test]
    fn scripted_resize_updates_size() {
        let mut events = ScriptedEvents::new([ScreenEvent::Resize(Size::new(100, 40))]);
        assert_eq!(events.size().expect("size"), Size::new(80, 24));
        events.next_event().expect("resize");
        assert_eq!(events.size().expect("size"), Size::new(100, 40));
    }

    #[test]
    fn crossterm_resize_maps_to_size() {
        let event = ScreenEvent::from(CrosstermEvent::Resize(120, 30));
        assert_eq!(event, ScreenEvent::Resize(Size::new(120, 30)));
        assert_eq!(event.describe(), "resize");
    }
}
