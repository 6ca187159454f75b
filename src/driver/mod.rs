//! Crossterm terminal session around a [`Navigator`].

use std::io::{self, Write};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use thiserror::Error;

use crate::NavError;
use crate::input::TerminalEvents;
use crate::navigator::{Navigator, NavigatorApp};

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("navigator error: {0}")]
    Navigator(#[from] NavError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Owns a navigator and manages raw mode and the alternate screen while it
/// runs. The terminal is restored even when the session fails.
pub struct TerminalDriver {
    navigator: Navigator,
}

impl TerminalDriver {
    pub fn new(navigator: Navigator) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigator_mut(&mut self) -> &mut Navigator {
        &mut self.navigator
    }

    pub fn into_inner(self) -> Navigator {
        self.navigator
    }

    pub fn run<A>(&mut self, app: &mut A) -> DriverResult<()>
    where
        A: NavigatorApp + ?Sized,
    {
        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        let result = self.run_inner(app, &mut stdout);
        self.exit(&mut stdout);
        result
    }

    fn run_inner<A>(&mut self, app: &mut A, stdout: &mut impl Write) -> DriverResult<()>
    where
        A: NavigatorApp + ?Sized,
    {
        let mut events = TerminalEvents::new();
        self.navigator.run(app, stdout, &mut events)?;
        Ok(())
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| DriverError::Terminal(err.to_string()))?;
        execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_errors_convert() {
        let err = DriverError::from(NavError::UnknownScreen("MAIN".to_string()));
        assert_eq!(err.to_string(), "navigator error: screen `MAIN` is not registered");
    }

    #[test]
    fn driver_hands_back_navigator() {
        let mut navigator = Navigator::new();
        navigator.register_deferred(
            "MAIN",
            |_args: &crate::registry::ScreenArgs| Err(NavError::screen("unused")),
            crate::registry::ScreenArgs::new(),
        );
        let driver = TerminalDriver::new(navigator);
        assert!(driver.navigator().registry().contains("MAIN"));
        assert_eq!(driver.into_inner().registry().len(), 1);
    }
}
