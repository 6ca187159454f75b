use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters accumulated across navigation sessions.
#[derive(Debug, Default, Clone)]
pub struct NavigationMetrics {
    sessions: u64,
    activations: u64,
    deferred_builds: u64,
    forced_switches: u64,
    back_navigations: u64,
    input_events: u64,
}

impl NavigationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session(&mut self) {
        self.sessions = self.sessions.saturating_add(1);
    }

    pub fn record_activation(&mut self, deferred: bool) {
        self.activations = self.activations.saturating_add(1);
        if deferred {
            self.deferred_builds = self.deferred_builds.saturating_add(1);
        }
    }

    pub fn record_forced_switch(&mut self) {
        self.forced_switches = self.forced_switches.saturating_add(1);
    }

    pub fn record_back_navigation(&mut self) {
        self.back_navigations = self.back_navigations.saturating_add(1);
    }

    pub fn record_input_event(&mut self) {
        self.input_events = self.input_events.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            sessions: self.sessions,
            activations: self.activations,
            deferred_builds: self.deferred_builds,
            forced_switches: self.forced_switches,
            back_navigations: self.back_navigations,
            input_events: self.input_events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub sessions: u64,
    pub activations: u64,
    pub deferred_builds: u64,
    pub forced_switches: u64,
    pub back_navigations: u64,
    pub input_events: u64,
}

impl MetricSnapshot {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("sessions".to_string(), json!(self.sessions));
        map.insert("activations".to_string(), json!(self.activations));
        map.insert("deferred_builds".to_string(), json!(self.deferred_builds));
        map.insert("forced_switches".to_string(), json!(self.forced_switches));
        map.insert("back_navigations".to_string(), json!(self.back_navigations));
        map.insert("input_events".to_string(), json!(self.input_events));
        map
    }

    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "navigation_metrics", self.as_fields())
    }
}
