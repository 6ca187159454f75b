pub mod ansi;
mod core;

pub use self::core::LineRenderer;
