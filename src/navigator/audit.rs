//! Navigation audit trail.
//!
//! The navigator reports each lifecycle transition as an audit record: a
//! stage plus structured details. Sinks can buffer, log, or visualize the
//! trail without hooking into the control loop itself.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Distinct checkpoints emitted by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAuditStage {
    /// The control loop was entered.
    SessionStarted,
    /// A screen was resolved and handed control.
    ScreenActivated,
    /// A screen id was appended to the visit history.
    HistoryPushed,
    /// A screen (or stop) was requested for the next loop step.
    NextRequested,
    /// The running edit cycle was forcibly ended.
    SwitchForced,
    /// Back-navigation picked a target from history.
    SwitchPrevious,
    /// History was cleared on request.
    HistoryReset,
    /// The last two history entries were dropped on request.
    HistoryTrimmed,
    /// A registry binding was removed.
    ScreenRemoved,
    /// The control loop exited.
    SessionStopped,
}

#[derive(Debug, Clone)]
pub struct NavigationAuditEvent {
    pub timestamp: SystemTime,
    pub stage: NavigationAuditStage,
    pub details: Vec<(String, Value)>,
}

impl NavigationAuditEvent {
    fn new(stage: NavigationAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

pub struct NavigationAuditEventBuilder {
    event: NavigationAuditEvent,
}

impl NavigationAuditEventBuilder {
    pub fn new(stage: NavigationAuditStage) -> Self {
        Self {
            event: NavigationAuditEvent::new(stage),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event.details.push((key.into(), value.into()));
        self
    }

    pub fn finish(self) -> NavigationAuditEvent {
        self.event
    }
}

/// Implemented by anything that wants the navigation trail.
///
/// Records are delivered while navigation state is locked, so sinks must not
/// call back into the navigator.
pub trait NavigationAudit: Send + Sync {
    fn record(&self, event: NavigationAuditEvent);
}

#[derive(Debug, Default)]
pub struct NullNavigationAudit;

impl NavigationAudit for NullNavigationAudit {
    fn record(&self, _event: NavigationAuditEvent) {}
}

/// Buffers every record in memory.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    events: Mutex<Vec<NavigationAuditEvent>>,
}

impl RecordingAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NavigationAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<NavigationAuditStage> {
        self.events().into_iter().map(|event| event.stage).collect()
    }

    pub fn count(&self, stage: NavigationAuditStage) -> usize {
        self.events()
            .iter()
            .filter(|event| event.stage == stage)
            .count()
    }
}

impl NavigationAudit for RecordingAudit {
    fn record(&self, event: NavigationAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recording_audit_keeps_order_and_details() {
        let audit = RecordingAudit::new();
        audit.record(
            NavigationAuditEventBuilder::new(NavigationAuditStage::ScreenActivated)
                .detail("screen", "MAIN")
                .finish(),
        );
        audit.record(NavigationAuditEventBuilder::new(NavigationAuditStage::SessionStopped).finish());

        assert_eq!(
            audit.stages(),
            vec![
                NavigationAuditStage::ScreenActivated,
                NavigationAuditStage::SessionStopped
            ]
        );
        let first = &audit.events()[0];
        assert_eq!(first.detail("screen"), Some(&json!("MAIN")));
        assert_eq!(audit.count(NavigationAuditStage::ScreenActivated), 1);
    }
}
