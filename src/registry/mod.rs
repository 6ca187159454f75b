mod core;

pub use self::core::{
    EntryKind, ResolvedScreen, ScreenArgs, ScreenFactory, ScreenId, ScreenRegistry,
};
