//! The contract between the navigator and the screens it drives.

use std::io::Write;

use crate::input::ScreenEvent;
use crate::navigator::NavigatorHandle;
use crate::{Result, Size};

mod surface;

pub use surface::Surface;

/// How a screen takes control once activated. Read once per activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    /// The navigator runs the standard edit cycle: `before_edit`, render and
    /// dispatch events until `is_editing` turns false, then `after_edit`.
    EditCycle,
    /// The screen runs its own loop inside [`Screen::activate`]. The edit
    /// hooks are not called.
    SelfDriving,
}

/// A nested input target (a field, a list) with its own editing flag.
pub trait FocusTarget {
    fn is_editing(&self) -> bool;
    fn set_editing(&mut self, editing: bool);

    /// Inner entry of a composite target, e.g. the text entry of a labelled field.
    fn entry_mut(&mut self) -> Option<&mut dyn FocusTarget> {
        None
    }
}

/// One full-terminal unit of UI.
pub trait Screen: Send {
    fn kind(&self) -> ScreenKind {
        ScreenKind::EditCycle
    }

    /// Receive the back-reference to the navigator that now manages this screen.
    fn attach(&mut self, _navigator: NavigatorHandle) {}

    /// Drop the back-reference; called when the registry releases the screen.
    fn detach(&mut self) {}

    /// Called before every activation with the current terminal size.
    fn resize(&mut self, _size: Size) -> Result<()> {
        Ok(())
    }

    /// Entry point for [`ScreenKind::SelfDriving`] screens.
    fn activate(&mut self, _surface: &mut Surface<'_>) -> Result<()> {
        Ok(())
    }

    fn before_edit(&mut self) -> Result<()> {
        Ok(())
    }

    fn after_edit(&mut self) -> Result<()> {
        Ok(())
    }

    fn render(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    fn handle_event(&mut self, event: &ScreenEvent) -> Result<()>;

    fn is_editing(&self) -> bool;
    fn set_editing(&mut self, editing: bool);

    /// The widget currently holding input focus, if any.
    fn focused_widget_mut(&mut self) -> Option<&mut dyn FocusTarget> {
        None
    }
}

/// Force a screen out of its edit cycle.
///
/// Clears the screen's editing flag, the focused widget's flag, and the flag
/// of that widget's nested entry. Clearing only the outer flags would leave a
/// labelled field waiting for one more key press before the next screen sees
/// input. Missing widgets or entries are skipped.
pub fn interrupt_editing(screen: &mut dyn Screen) {
    screen.set_editing(false);
    if let Some(widget) = screen.focused_widget_mut() {
        set_editing_deep(widget, false);
    }
}

/// Set the editing flag of `target` and of its nested entry, if it has one.
pub fn set_editing_deep(target: &mut dyn FocusTarget, editing: bool) {
    target.set_editing(editing);
    if let Some(entry) = target.entry_mut() {
        entry.set_editing(editing);
    }
}
