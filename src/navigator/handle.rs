use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde_json::json;

use crate::logging::{LogLevel, json_kv};
use crate::registry::ScreenId;
use crate::{NavError, Result};

use super::audit::{NavigationAuditEventBuilder, NavigationAuditStage};
use super::history::History;
use super::telemetry::Telemetry;

/// What the control loop should activate next.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Screen(ScreenId),
    /// Leave the control loop.
    Stop,
}

impl Target {
    pub fn screen(id: impl Into<String>) -> Self {
        Target::from(id.into())
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, Target::Stop)
    }

    pub fn as_screen(&self) -> Option<&str> {
        match self {
            Target::Screen(id) => Some(id),
            Target::Stop => None,
        }
    }

    /// Whether this target is the screen `id`.
    pub fn names(&self, id: &str) -> bool {
        self.as_screen() == Some(id)
    }
}

impl From<String> for Target {
    /// An empty identifier means stop.
    fn from(id: String) -> Self {
        if id.is_empty() {
            Target::Stop
        } else {
            Target::Screen(id)
        }
    }
}

impl From<&str> for Target {
    fn from(id: &str) -> Self {
        Target::from(id.to_string())
    }
}

impl From<&String> for Target {
    fn from(id: &String) -> Self {
        Target::from(id.clone())
    }
}

impl<T> From<Option<T>> for Target
where
    T: Into<Target>,
{
    fn from(id: Option<T>) -> Self {
        id.map(Into::into).unwrap_or(Target::Stop)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Screen(id) => f.write_str(id),
            Target::Stop => f.write_str("<stop>"),
        }
    }
}

/// Mutable navigation state. Only the navigator thread touches it, and only
/// between (never during) calls into screens.
#[derive(Debug)]
pub(crate) struct NavigationState {
    pub(crate) next: Target,
    pub(crate) current: Option<ScreenId>,
    pub(crate) last_active: Option<ScreenId>,
    pub(crate) history: History,
    pub(crate) interrupt: bool,
    pub(crate) starting: ScreenId,
}

impl NavigationState {
    pub(crate) fn new(starting: ScreenId) -> Self {
        Self {
            next: Target::from(starting.clone()),
            current: None,
            last_active: None,
            history: History::new(),
            interrupt: false,
            starting,
        }
    }
}

pub(crate) struct Shared {
    state: Mutex<NavigationState>,
    pub(crate) telemetry: Telemetry,
}

impl Shared {
    pub(crate) fn new(state: NavigationState, telemetry: Telemetry) -> Self {
        Self {
            state: Mutex::new(state),
            telemetry,
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, NavigationState>> {
        self.state.lock().map_err(|_| NavError::Poisoned)
    }

    pub(crate) fn request_next(&self, target: Target) -> Result<()> {
        let mut state = self.lock()?;
        self.telemetry.log(
            LogLevel::Debug,
            "next_requested",
            [
                json_kv("target", json!(target.to_string())),
                json_kv("current", json!(state.current)),
            ],
        );
        self.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::NextRequested)
                .detail("target", target.to_string()),
        );
        state.next = target;
        Ok(())
    }

    pub(crate) fn switch_now(&self, target: Target) -> Result<()> {
        let mut state = self.lock()?;
        self.telemetry.log(
            LogLevel::Info,
            "switch_forced",
            [
                json_kv("target", json!(target.to_string())),
                json_kv("current", json!(state.current)),
            ],
        );
        self.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::SwitchForced)
                .detail("target", target.to_string()),
        );
        self.telemetry.metrics(|m| m.record_forced_switch());
        state.next = target;
        state.interrupt = true;
        Ok(())
    }

    pub(crate) fn set_next_previous(&self, backup: Option<&str>) -> Result<Target> {
        let mut state = self.lock()?;
        let backup = backup.map(str::to_string).unwrap_or_else(|| state.starting.clone());
        let current = state.current.clone();
        let pending = state.next.clone();
        let chosen = state
            .history
            .step_back(current.as_deref(), &pending, &backup);
        if let Some(target) = chosen {
            state.next = target;
        }

        self.telemetry.log(
            LogLevel::Info,
            "switch_previous",
            [
                json_kv("target", json!(state.next.to_string())),
                json_kv("history", json!(state.history.entries())),
            ],
        );
        self.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::SwitchPrevious)
                .detail("target", state.next.to_string())
                .detail("history_len", state.history.len()),
        );
        self.telemetry.metrics(|m| m.record_back_navigation());
        Ok(state.next.clone())
    }

    pub(crate) fn switch_previous(&self, backup: Option<&str>) -> Result<Target> {
        let target = self.set_next_previous(backup)?;
        self.lock()?.interrupt = true;
        self.telemetry.metrics(|m| m.record_forced_switch());
        Ok(target)
    }

    pub(crate) fn history(&self) -> Result<Vec<ScreenId>> {
        Ok(self.lock()?.history.snapshot())
    }

    pub(crate) fn reset_history(&self) -> Result<()> {
        let mut state = self.lock()?;
        let cleared = state.history.len();
        state.history.clear();
        self.telemetry.log(
            LogLevel::Debug,
            "history_reset",
            [json_kv("cleared", json!(cleared))],
        );
        self.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::HistoryReset)
                .detail("cleared", cleared),
        );
        Ok(())
    }

    pub(crate) fn remove_last_from_history(&self) -> Result<Vec<ScreenId>> {
        let mut state = self.lock()?;
        let popped = state.history.pop_last_two();
        self.telemetry.log(
            LogLevel::Debug,
            "history_trimmed",
            [
                json_kv("removed", json!(popped)),
                json_kv("history", json!(state.history.entries())),
            ],
        );
        self.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::HistoryTrimmed)
                .detail("removed", json!(popped))
                .detail("history_len", state.history.len()),
        );
        Ok(popped)
    }

    pub(crate) fn active_screen(&self) -> Result<Option<ScreenId>> {
        Ok(self.lock()?.current.clone())
    }

    pub(crate) fn take_interrupt(&self) -> Result<bool> {
        let mut state = self.lock()?;
        Ok(std::mem::take(&mut state.interrupt))
    }

    pub(crate) fn interrupt_pending(&self) -> Result<bool> {
        Ok(self.lock()?.interrupt)
    }
}

/// Non-owning back-reference from a screen to its navigator.
///
/// Holds a [`Weak`] pointer, so a screen keeping its handle never keeps the
/// navigator alive. Every call fails with [`NavError::Detached`] once the
/// navigator is gone or the handle was never attached.
#[derive(Clone, Default)]
pub struct NavigatorHandle {
    shared: Weak<Shared>,
}

impl fmt::Debug for NavigatorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigatorHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl NavigatorHandle {
    pub(crate) fn new(shared: &Arc<Shared>) -> Self {
        Self {
            shared: Arc::downgrade(shared),
        }
    }

    /// A handle that is not connected to any navigator.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }

    fn shared(&self) -> Result<Arc<Shared>> {
        self.shared.upgrade().ok_or(NavError::Detached)
    }

    /// Choose the screen to activate once the current one finishes.
    pub fn request_next(&self, target: impl Into<Target>) -> Result<()> {
        self.shared()?.request_next(target.into())
    }

    /// End the current edit cycle and activate `target` next.
    pub fn switch_now(&self, target: impl Into<Target>) -> Result<()> {
        self.shared()?.switch_now(target.into())
    }

    /// Request the previously visited screen (or `backup`) without interrupting.
    pub fn set_next_previous(&self, backup: Option<&str>) -> Result<Target> {
        self.shared()?.set_next_previous(backup)
    }

    /// Go back to the previously visited screen now, falling back to `backup`
    /// (or the starting screen) when history is empty.
    pub fn switch_previous(&self, backup: Option<&str>) -> Result<Target> {
        self.shared()?.switch_previous(backup)
    }

    pub fn history(&self) -> Result<Vec<ScreenId>> {
        self.shared()?.history()
    }

    pub fn reset_history(&self) -> Result<()> {
        self.shared()?.reset_history()
    }

    pub fn remove_last_from_history(&self) -> Result<Vec<ScreenId>> {
        self.shared()?.remove_last_from_history()
    }

    pub fn active_screen(&self) -> Result<Option<ScreenId>> {
        self.shared()?.active_screen()
    }

    /// Whether `switch_now` was requested and not yet applied.
    pub fn interrupt_pending(&self) -> Result<bool> {
        self.shared()?.interrupt_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::NavigatorConfig;

    fn shared() -> Arc<Shared> {
        let config = NavigatorConfig::default();
        Arc::new(Shared::new(
            NavigationState::new("MAIN".to_string()),
            Telemetry::from_config(&config),
        ))
    }

    #[test]
    fn empty_id_targets_stop() {
        assert_eq!(Target::from(""), Target::Stop);
        assert_eq!(Target::from(None::<&str>), Target::Stop);
        assert_eq!(Target::from(Some("A")), Target::screen("A"));
        assert!(Target::screen("A").names("A"));
    }

    #[test]
    fn handle_does_not_keep_navigator_alive() {
        let shared = shared();
        let handle = NavigatorHandle::new(&shared);
        assert!(handle.is_attached());
        handle.request_next("SECOND").expect("request");
        assert_eq!(shared.lock().expect("lock").next, Target::screen("SECOND"));

        drop(shared);
        assert!(!handle.is_attached());
        assert!(matches!(handle.request_next("MAIN"), Err(NavError::Detached)));
    }

    #[test]
    fn switch_now_raises_interrupt_once() {
        let shared = shared();
        let handle = NavigatorHandle::new(&shared);
        handle.switch_now("THIRD").expect("switch");
        assert!(handle.interrupt_pending().expect("pending"));
        assert!(shared.take_interrupt().expect("take"));
        assert!(!shared.take_interrupt().expect("take again"));
        assert!(!handle.interrupt_pending().expect("cleared"));
    }

    #[test]
    fn detached_handle_reports_error() {
        let handle = NavigatorHandle::detached();
        assert!(matches!(handle.history(), Err(NavError::Detached)));
    }
}
