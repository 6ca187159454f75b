use std::io::Write;

use crate::input::{EventSource, ScreenEvent};
use crate::navigator::NavigatorHandle;
use crate::{Result, Size};

/// Terminal access handed to a screen while it holds control.
pub struct Surface<'a> {
    out: &'a mut dyn Write,
    events: &'a mut dyn EventSource,
    size: Size,
    navigator: NavigatorHandle,
    exhausted: bool,
}

impl<'a> Surface<'a> {
    pub fn new(
        out: &'a mut dyn Write,
        events: &'a mut dyn EventSource,
        size: Size,
        navigator: NavigatorHandle,
    ) -> Self {
        Self {
            out,
            events,
            size,
            navigator,
            exhausted: false,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        &mut *self.out
    }

    pub fn navigator(&self) -> &NavigatorHandle {
        &self.navigator
    }

    /// Whether the event source has run dry.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Next event for a self-driving screen.
    ///
    /// Returns `None` once a forced switch is pending or the source is
    /// exhausted; either way the screen should return from `activate`.
    pub fn next_event(&mut self) -> Result<Option<ScreenEvent>> {
        if self.navigator.interrupt_pending()? {
            return Ok(None);
        }
        self.read_event()
    }

    /// Raw read used by the standard edit cycle. Tracks size changes and exhaustion.
    pub(crate) fn read_event(&mut self) -> Result<Option<ScreenEvent>> {
        if self.exhausted {
            return Ok(None);
        }
        let event = self.events.next_event()?;
        match event.as_ref() {
            Some(ScreenEvent::Resize(size)) => self.size = *size,
            None => self.exhausted = true,
            _ => {}
        }
        Ok(event)
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
