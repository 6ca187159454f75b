//! Key chord parsing and key-to-action tables.
//!
//! Chords are written either in caret notation (`^T`, `^X`) or as
//! `+`-joined modifier lists (`ctrl+t`, `alt+shift+x`, `shift+tab`).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::{NavError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: KeyCode,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyChord {
    pub const fn plain(key: KeyCode) -> Self {
        Self {
            key,
            ctrl: false,
            alt: false,
            shift: false,
        }
    }

    pub const fn ctrl(ch: char) -> Self {
        Self {
            key: KeyCode::Char(ch),
            ctrl: true,
            alt: false,
            shift: false,
        }
    }

    /// Whether a key press matches this chord. Releases never match.
    ///
    /// Character keys compare case-insensitively when ctrl or alt is held,
    /// since terminals disagree on the case they report for those chords.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind == KeyEventKind::Release {
            return false;
        }

        let modifiers = event.modifiers;
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT);
        let shift = modifiers.contains(KeyModifiers::SHIFT);

        match (event.code, self.key) {
            (KeyCode::Char(got), KeyCode::Char(want)) => {
                let same_char = if self.ctrl || self.alt {
                    got.eq_ignore_ascii_case(&want)
                } else {
                    got == want
                };
                // Shift is implied by the character itself unless the chord asks for it.
                same_char && ctrl == self.ctrl && alt == self.alt && (!self.shift || shift)
            }
            (KeyCode::BackTab, KeyCode::BackTab) => ctrl == self.ctrl && alt == self.alt,
            (got, want) => {
                got == want && ctrl == self.ctrl && alt == self.alt && shift == self.shift
            }
        }
    }
}

pub fn parse_key_chord(input: &str) -> Option<KeyChord> {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix('^') {
        let mut chars = rest.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        return Some(KeyChord::ctrl(ch.to_ascii_lowercase()));
    }

    let lowered = trimmed.to_lowercase();
    let parts: Vec<&str> = lowered
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    let mut chord = KeyChord::plain(KeyCode::Null);
    for part in parts {
        match part {
            "ctrl" | "control" => chord.ctrl = true,
            "alt" | "option" | "meta" => chord.alt = true,
            "shift" => chord.shift = true,
            key => {
                if chord.key != KeyCode::Null {
                    return None;
                }
                chord.key = parse_key(key)?;
            }
        }
    }

    if chord.key == KeyCode::Null {
        return None;
    }
    if chord.shift && chord.key == KeyCode::Tab {
        chord.key = KeyCode::BackTab;
    }

    Some(chord)
}

fn parse_key(key: &str) -> Option<KeyCode> {
    match key {
        "esc" | "escape" => Some(KeyCode::Esc),
        "enter" | "return" => Some(KeyCode::Enter),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "backspace" => Some(KeyCode::Backspace),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" => Some(KeyCode::PageUp),
        "pagedown" => Some(KeyCode::PageDown),
        "space" | "spacebar" => Some(KeyCode::Char(' ')),
        _ => {
            if let Some(num) = key.strip_prefix('f') {
                if let Ok(n) = num.parse::<u8>() {
                    return Some(KeyCode::F(n));
                }
            }
            let mut chars = key.chars();
            let first = chars.next()?;
            if chars.next().is_none() {
                Some(KeyCode::Char(first))
            } else {
                None
            }
        }
    }
}

/// Ordered chord-to-action bindings. Rebinding a chord replaces its action.
pub struct Keymap<A> {
    bindings: Vec<(KeyChord, A)>,
}

impl<A> Default for Keymap<A> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<A> Keymap<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a chord written in text form.
    pub fn bind(&mut self, chord: &str, action: A) -> Result<()> {
        let parsed =
            parse_key_chord(chord).ok_or_else(|| NavError::InvalidBinding(chord.to_string()))?;
        self.bind_chord(parsed, action);
        Ok(())
    }

    pub fn bind_chord(&mut self, chord: KeyChord, action: A) {
        if let Some(slot) = self.bindings.iter_mut().find(|(bound, _)| *bound == chord) {
            slot.1 = action;
        } else {
            self.bindings.push((chord, action));
        }
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<&A> {
        self.bindings
            .iter()
            .find(|(chord, _)| chord.matches(event))
            .map(|(_, action)| action)
    }

    pub fn lookup_mut(&mut self, event: &KeyEvent) -> Option<&mut A> {
        self.bindings
            .iter_mut()
            .find(|(chord, _)| chord.matches(event))
            .map(|(_, action)| action)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
