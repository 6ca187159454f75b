use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;

use crate::logging::{LogLevel, Logger, event_with_fields};
use crate::metrics::NavigationMetrics;

use super::NavigatorConfig;
use super::audit::{NavigationAudit, NavigationAuditEventBuilder, NullNavigationAudit};

pub(crate) const LOG_TARGET: &str = "room::navigator";

/// Logger, audit sink, and metrics shared by the navigator and its handles.
pub(crate) struct Telemetry {
    logger: Option<Logger>,
    audit: Arc<dyn NavigationAudit>,
    metrics: Option<Arc<Mutex<NavigationMetrics>>>,
    metrics_target: String,
}

impl Telemetry {
    pub(crate) fn from_config(config: &NavigatorConfig) -> Self {
        Self {
            logger: config.logger.clone(),
            audit: config
                .audit
                .clone()
                .unwrap_or_else(|| Arc::new(NullNavigationAudit)),
            metrics: config.metrics_handle(),
            metrics_target: config.metrics_target.clone(),
        }
    }

    pub(crate) fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            if logger.enabled(level) {
                let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
            }
        }
    }

    pub(crate) fn audit(&self, event: NavigationAuditEventBuilder) {
        self.audit.record(event.finish());
    }

    pub(crate) fn metrics<F>(&self, update: F)
    where
        F: FnOnce(&mut NavigationMetrics),
    {
        if let Some(metrics) = self.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                update(&mut guard);
            }
        }
    }

    pub(crate) fn emit_metrics(&self, uptime: Duration) {
        if let (Some(logger), Some(metrics)) = (self.logger.as_ref(), self.metrics.as_ref()) {
            if let Ok(guard) = metrics.lock() {
                let event = guard.snapshot(uptime).to_log_event(&self.metrics_target);
                let _ = logger.log_event(event);
            }
        }
    }
}
