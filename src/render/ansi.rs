//! ANSI control sequences used by the line renderer and widgets.
//!
//! Helpers return owned `String`s or static slices so callers can append them
//! to a row before writing it out.

const CSI: &str = "\x1b[";

/// Move the cursor to an absolute 1-based `row` and `column`.
pub fn move_to(row: u16, column: u16) -> String {
    format!("{CSI}{row};{column}H")
}

/// Clear from the cursor to the end of the line.
pub fn clear_to_line_end() -> &'static str {
    "\x1b[K"
}

/// Clear the whole screen and home the cursor.
pub fn clear_screen() -> &'static str {
    "\x1b[2J\x1b[H"
}

pub fn hide_cursor() -> &'static str {
    "\x1b[?25l"
}

pub fn show_cursor() -> &'static str {
    "\x1b[?25h"
}

pub fn bold() -> &'static str {
    "\x1b[1m"
}

pub fn reverse() -> &'static str {
    "\x1b[7m"
}

pub fn reset() -> &'static str {
    "\x1b[0m"
}

/// Wrap `text` in bold, resetting afterwards.
pub fn bolded(text: &str) -> String {
    format!("{}{text}{}", bold(), reset())
}

/// Wrap `text` in reverse video, resetting afterwards.
pub fn reversed(text: &str) -> String {
    format!("{}{text}{}", reverse(), reset())
}
