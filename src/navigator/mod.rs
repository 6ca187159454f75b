//! Screen navigation controller.
//!
//! The [`Navigator`] owns the screen registry and the visit history, decides
//! which screen is current, and runs the control loop:
//!
//! 1. read the pending [`Target`]; stop when it is [`Target::Stop`],
//! 2. resolve it through the registry (reuse a live instance, or build a
//!    deferred one),
//! 3. record it in history unless it is already on top,
//! 4. hand it control, either through its own `activate` loop or through the
//!    standard edit cycle wrapped in `before_edit`/`after_edit`,
//! 5. run the app's between-screens hook and repeat.
//!
//! Screens steer the loop through their [`NavigatorHandle`].

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::json;

use crate::input::{EventSource, ScreenEvent};
use crate::logging::{LogLevel, Logger, json_kv};
use crate::metrics::NavigationMetrics;
use crate::registry::{EntryKind, ScreenArgs, ScreenFactory, ScreenId, ScreenRegistry};
use crate::screen::{Screen, ScreenKind, Surface, interrupt_editing};
use crate::{NavError, Result, Size};

pub mod audit;
mod handle;
mod history;
mod telemetry;

pub use handle::{NavigatorHandle, Target};
pub use history::History;

use audit::{NavigationAudit, NavigationAuditEventBuilder, NavigationAuditStage};
use handle::{NavigationState, Shared};
use telemetry::Telemetry;

pub const DEFAULT_STARTING_SCREEN: &str = "MAIN";

/// Configuration knobs for the navigator.
#[derive(Clone)]
pub struct NavigatorConfig {
    /// Screen activated when a session starts.
    pub starting_screen: ScreenId,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator; a snapshot is logged when each session stops.
    pub metrics: Option<Arc<Mutex<NavigationMetrics>>>,
    /// Target field used for metrics snapshots.
    pub metrics_target: String,
    /// Optional audit sink receiving every navigation transition.
    pub audit: Option<Arc<dyn NavigationAudit>>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            starting_screen: DEFAULT_STARTING_SCREEN.to_string(),
            logger: None,
            metrics: None,
            metrics_target: "room::navigator.metrics".to_string(),
            audit: None,
        }
    }
}

impl NavigatorConfig {
    pub fn with_starting_screen(mut self, id: impl Into<ScreenId>) -> Self {
        self.starting_screen = id.into();
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn NavigationAudit>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(NavigationMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<NavigationMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

/// Whether the control loop is running, and on which screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorPhase {
    Idle,
    Active(ScreenId),
}

/// Session hooks for the embedding application.
pub trait NavigatorApp {
    /// Runs before the first screen. Typically registers screens.
    fn on_start(&mut self, _navigator: &mut Navigator) -> Result<()> {
        Ok(())
    }

    /// Runs after each screen finishes, never before the first one.
    fn on_in_main_loop(&mut self, _navigator: &mut Navigator) -> Result<()> {
        Ok(())
    }

    /// Runs once after the loop stops without error.
    fn on_clean_exit(&mut self, _navigator: &mut Navigator) -> Result<()> {
        Ok(())
    }
}

impl NavigatorApp for () {}

pub struct Navigator {
    registry: ScreenRegistry,
    shared: Arc<Shared>,
    config: NavigatorConfig,
    size: Size,
    running: bool,
    started_at: Option<Instant>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::with_config(NavigatorConfig::default())
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NavigatorConfig) -> Self {
        let telemetry = Telemetry::from_config(&config);
        let state = NavigationState::new(config.starting_screen.clone());
        Self {
            registry: ScreenRegistry::new(),
            shared: Arc::new(Shared::new(state, telemetry)),
            config,
            size: Size::default(),
            running: false,
            started_at: None,
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// A fresh non-owning back-reference to this navigator.
    pub fn handle(&self) -> NavigatorHandle {
        NavigatorHandle::new(&self.shared)
    }

    pub fn registry(&self) -> &ScreenRegistry {
        &self.registry
    }

    /// Register a persistent screen under `id`, replacing any previous binding.
    pub fn register<S>(&mut self, id: impl Into<ScreenId>, screen: S)
    where
        S: Screen + 'static,
    {
        self.register_boxed(id, Box::new(screen));
    }

    pub fn register_boxed(&mut self, id: impl Into<ScreenId>, mut screen: Box<dyn Screen>) {
        let id = id.into();
        screen.attach(self.handle());
        if let Some(mut replaced) = self.registry.register(id.clone(), screen) {
            replaced.detach();
        }
        self.shared.telemetry.log(
            LogLevel::Debug,
            "screen_registered",
            [json_kv("screen", json!(id)), json_kv("kind", json!("live"))],
        );
    }

    /// Register a constructor run afresh each time `id` is activated.
    pub fn register_deferred<F>(&mut self, id: impl Into<ScreenId>, factory: F, args: ScreenArgs)
    where
        F: Fn(&ScreenArgs) -> Result<Box<dyn Screen>> + Send + Sync + 'static,
    {
        let id = id.into();
        let factory: ScreenFactory = Arc::new(factory);
        if let Some(mut replaced) = self.registry.register_deferred(id.clone(), factory, args) {
            replaced.detach();
        }
        self.shared.telemetry.log(
            LogLevel::Debug,
            "screen_registered",
            [json_kv("screen", json!(id)), json_kv("kind", json!("deferred"))],
        );
    }

    /// Build a screen now and register it as persistent.
    pub fn add_screen<F>(&mut self, id: impl Into<ScreenId>, factory: F, args: ScreenArgs) -> Result<()>
    where
        F: FnOnce(&ScreenArgs) -> Result<Box<dyn Screen>>,
    {
        let id = id.into();
        let screen = factory(&args).map_err(|source| NavError::Construction {
            id: id.clone(),
            source: Box::new(source),
        })?;
        self.register_boxed(id, screen);
        Ok(())
    }

    /// Remove a binding, detaching the live instance from this navigator.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        if let Some(mut screen) = self.registry.remove(id)? {
            screen.detach();
        }
        self.shared.telemetry.log(
            LogLevel::Debug,
            "screen_removed",
            [json_kv("screen", json!(id))],
        );
        self.shared.telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::ScreenRemoved).detail("screen", id),
        );
        Ok(())
    }

    /// Borrow a registered persistent screen.
    pub fn screen_mut(&mut self, id: &str) -> Option<&mut dyn Screen> {
        self.registry.get_mut(id)
    }

    pub fn request_next(&self, target: impl Into<Target>) -> Result<()> {
        self.shared.request_next(target.into())
    }

    pub fn switch_now(&self, target: impl Into<Target>) -> Result<()> {
        self.shared.switch_now(target.into())
    }

    pub fn set_next_previous(&self, backup: Option<&str>) -> Result<Target> {
        self.shared.set_next_previous(backup)
    }

    pub fn switch_previous(&self, backup: Option<&str>) -> Result<Target> {
        self.shared.switch_previous(backup)
    }

    pub fn history(&self) -> Result<Vec<ScreenId>> {
        self.shared.history()
    }

    pub fn reset_history(&self) -> Result<()> {
        self.shared.reset_history()
    }

    pub fn remove_last_from_history(&self) -> Result<Vec<ScreenId>> {
        self.shared.remove_last_from_history()
    }

    pub fn active_screen(&self) -> Result<Option<ScreenId>> {
        self.shared.active_screen()
    }

    /// The screen activated before the current one.
    pub fn last_active(&self) -> Result<Option<ScreenId>> {
        Ok(self.shared.lock()?.last_active.clone())
    }

    pub fn next_target(&self) -> Result<Target> {
        Ok(self.shared.lock()?.next.clone())
    }

    pub fn phase(&self) -> Result<NavigatorPhase> {
        let state = self.shared.lock()?;
        Ok(match (self.running, state.current.as_ref()) {
            (true, Some(id)) => NavigatorPhase::Active(id.clone()),
            _ => NavigatorPhase::Idle,
        })
    }

    /// Run a session until a screen requests [`Target::Stop`].
    ///
    /// Errors from hooks, screens, or the registry end the session and are
    /// returned unchanged; `on_clean_exit` only runs when the loop stops cleanly.
    /// Running out of input also stops cleanly, discarding whatever target the
    /// active screen had requested.
    pub fn run<A>(
        &mut self,
        app: &mut A,
        out: &mut dyn Write,
        events: &mut dyn EventSource,
    ) -> Result<()>
    where
        A: NavigatorApp + ?Sized,
    {
        self.begin_session(events)?;
        let outcome = self.drive(app, out, events);
        self.end_session(outcome.is_ok())?;
        outcome
    }

    fn drive<A>(
        &mut self,
        app: &mut A,
        out: &mut dyn Write,
        events: &mut dyn EventSource,
    ) -> Result<()>
    where
        A: NavigatorApp + ?Sized,
    {
        app.on_start(self)?;

        loop {
            let target = self.shared.lock()?.next.clone();
            let id = match target {
                Target::Stop => break,
                Target::Screen(id) => id,
            };
            self.activate(&id, out, events)?;
            app.on_in_main_loop(self)?;
        }

        app.on_clean_exit(self)
    }

    fn activate(
        &mut self,
        id: &str,
        out: &mut dyn Write,
        events: &mut dyn EventSource,
    ) -> Result<()> {
        let mut resolved = self.registry.resolve(id)?;
        if resolved.is_fresh() {
            resolved.screen_mut().attach(self.handle());
        }
        let kind = resolved.screen_mut().kind();
        self.mark_active(id, resolved.kind(), kind)?;

        let mut surface = Surface::new(out, events, self.size, self.handle());
        let outcome = drive_screen(resolved.screen_mut(), kind, &mut surface, &self.shared);
        self.size = surface.size();
        let exhausted = surface.is_exhausted();

        if let Some(mut orphan) = self.registry.restore(resolved) {
            orphan.detach();
        }
        outcome?;

        if exhausted {
            self.shared
                .telemetry
                .log(LogLevel::Warn, "input_exhausted", [json_kv("screen", json!(id))]);
            self.shared.lock()?.next = Target::Stop;
        }
        Ok(())
    }

    fn mark_active(&mut self, id: &str, entry: EntryKind, kind: ScreenKind) -> Result<()> {
        let mut state = self.shared.lock()?;
        state.last_active = state.current.replace(id.to_string());
        state.interrupt = false;
        let pushed = state.history.push_visit(id);
        let depth = state.history.len();
        drop(state);

        let telemetry = &self.shared.telemetry;
        let origin = match entry {
            EntryKind::Live => "live",
            EntryKind::Deferred => "deferred",
        };
        let mode = match kind {
            ScreenKind::EditCycle => "edit_cycle",
            ScreenKind::SelfDriving => "self_driving",
        };
        telemetry.log(
            LogLevel::Info,
            "screen_activated",
            [
                json_kv("screen", json!(id)),
                json_kv("origin", json!(origin)),
                json_kv("kind", json!(mode)),
            ],
        );
        telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::ScreenActivated)
                .detail("screen", id)
                .detail("origin", origin),
        );
        if pushed {
            telemetry.log(
                LogLevel::Debug,
                "history_pushed",
                [json_kv("screen", json!(id)), json_kv("depth", json!(depth))],
            );
            telemetry.audit(
                NavigationAuditEventBuilder::new(NavigationAuditStage::HistoryPushed)
                    .detail("screen", id)
                    .detail("depth", depth),
            );
        }
        telemetry.metrics(|m| m.record_activation(entry == EntryKind::Deferred));
        Ok(())
    }

    fn begin_session(&mut self, events: &mut dyn EventSource) -> Result<()> {
        self.size = events.size()?;
        {
            let mut state = self.shared.lock()?;
            state.next = Target::from(state.starting.clone());
            state.current = None;
            state.last_active = None;
            state.interrupt = false;
        }
        self.running = true;
        self.started_at = Some(Instant::now());

        let telemetry = &self.shared.telemetry;
        telemetry.metrics(|m| m.record_session());
        telemetry.log(
            LogLevel::Info,
            "session_started",
            [
                json_kv("starting_screen", json!(self.config.starting_screen)),
                json_kv("screens", json!(self.registry.len())),
                json_kv("width", json!(self.size.width)),
                json_kv("height", json!(self.size.height)),
            ],
        );
        telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::SessionStarted)
                .detail("starting_screen", self.config.starting_screen.as_str()),
        );
        Ok(())
    }

    fn end_session(&mut self, clean: bool) -> Result<()> {
        self.running = false;
        {
            let mut state = self.shared.lock()?;
            state.current = None;
            state.interrupt = false;
            if clean {
                state.history.clear();
            }
        }

        let uptime = self
            .started_at
            .take()
            .map(|start| start.elapsed())
            .unwrap_or_default();
        let telemetry = &self.shared.telemetry;
        telemetry.log(
            LogLevel::Info,
            "session_stopped",
            [
                json_kv("clean", json!(clean)),
                json_kv("uptime_ms", json!(uptime.as_millis() as u64)),
            ],
        );
        telemetry.audit(
            NavigationAuditEventBuilder::new(NavigationAuditStage::SessionStopped)
                .detail("clean", clean),
        );
        telemetry.emit_metrics(uptime);
        Ok(())
    }
}

fn drive_screen(
    screen: &mut dyn Screen,
    kind: ScreenKind,
    surface: &mut Surface<'_>,
    shared: &Shared,
) -> Result<()> {
    match kind {
        ScreenKind::SelfDriving => {
            screen.resize(surface.size())?;
            screen.activate(surface)?;
        }
        ScreenKind::EditCycle => {
            screen.before_edit()?;
            screen.resize(surface.size())?;
            edit_cycle(screen, surface, shared)?;
            screen.after_edit()?;
        }
    }

    if shared.take_interrupt()? {
        interrupt_editing(screen);
    }
    Ok(())
}

/// Render and dispatch events until the screen stops editing.
///
/// A forced switch requested while handling an event is applied before the
/// next event is read, so that event already reaches the next screen.
fn edit_cycle(screen: &mut dyn Screen, surface: &mut Surface<'_>, shared: &Shared) -> Result<()> {
    screen.set_editing(true);
    if shared.take_interrupt()? {
        interrupt_editing(screen);
    }

    while screen.is_editing() {
        screen.render(surface.writer())?;
        surface.flush()?;

        let Some(event) = surface.read_event()? else {
            screen.set_editing(false);
            break;
        };
        shared.telemetry.metrics(|m| m.record_input_event());

        if let ScreenEvent::Resize(size) = &event {
            screen.resize(*size)?;
        }
        screen.handle_event(&event)?;

        if shared.take_interrupt()? {
            interrupt_editing(screen);
        }
    }
    Ok(())
}
