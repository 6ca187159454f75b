use thiserror::Error;

use crate::logging::LoggingError;

/// Unified result type for the navigation crate.
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors surfaced by the screen registry, the navigator, and the screens it drives.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("screen `{0}` is not registered")]
    UnknownScreen(String),
    #[error("failed to construct screen `{id}`: {source}")]
    Construction {
        id: String,
        #[source]
        source: Box<NavError>,
    },
    #[error("screen `{0}` is checked out by the running navigator")]
    ScreenInUse(String),
    #[error("navigator handle is detached")]
    Detached,
    #[error("navigation state poisoned")]
    Poisoned,
    #[error("invalid key binding `{0}`")]
    InvalidBinding(String),
    #[error("screen error: {0}")]
    Screen(String),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NavError {
    /// Convenience constructor for application-defined screen or hook failures.
    pub fn screen(message: impl Into<String>) -> Self {
        NavError::Screen(message.into())
    }

    /// Whether this error means the registry had no binding for a requested id.
    pub fn is_unknown_screen(&self) -> bool {
        matches!(self, NavError::UnknownScreen(_))
    }
}
