//! Standard edit-cycle screen built from widgets.
//!
//! A [`Form`] draws a title row followed by its widgets, one after another.
//! Key presses go first to the form's bound handlers, then to the focused
//! widget, and finally to the form's own keys: Tab and BackTab move focus,
//! Esc ends the edit cycle.

use std::io::Write;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::geometry::Size;
use crate::input::{KeyChord, Keymap, ScreenEvent};
use crate::navigator::NavigatorHandle;
use crate::render::{LineRenderer, ansi};
use crate::screen::{FocusTarget, Screen, set_editing_deep};
use crate::widgets::{FocusRing, Widget, WidgetFlow};
use crate::Result;

/// Callback run by a form with access to its navigator.
pub type FormHandler = Box<dyn FnMut(&NavigatorHandle) -> Result<()> + Send>;

pub struct Form {
    title: String,
    widgets: Vec<Box<dyn Widget>>,
    focus: FocusRing,
    handlers: Keymap<FormHandler>,
    before_edit: Option<FormHandler>,
    after_edit: Option<FormHandler>,
    on_exit: Option<FormHandler>,
    footer: Option<String>,
    navigator: NavigatorHandle,
    renderer: LineRenderer,
    editing: bool,
}

impl Form {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            widgets: Vec::new(),
            focus: FocusRing::new(),
            handlers: Keymap::new(),
            before_edit: None,
            after_edit: None,
            on_exit: None,
            footer: None,
            navigator: NavigatorHandle::detached(),
            renderer: LineRenderer::new(Size::default()),
            editing: false,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Hint row drawn at the bottom of the screen.
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Append a widget. Returns its index for later lookups.
    pub fn add<W>(&mut self, widget: W) -> usize
    where
        W: Widget + 'static,
    {
        self.focus.push(widget.focusable());
        self.widgets.push(Box::new(widget));
        self.widgets.len() - 1
    }

    pub fn widget<W: Widget + 'static>(&self, index: usize) -> Option<&W> {
        self.widgets.get(index)?.as_any().downcast_ref()
    }

    pub fn widget_mut<W: Widget + 'static>(&mut self, index: usize) -> Option<&mut W> {
        self.widgets.get_mut(index)?.as_any_mut().downcast_mut()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focus.current()
    }

    /// Bind a chord such as `^T` or `ctrl+t` to a handler.
    pub fn add_handler<F>(&mut self, chord: &str, handler: F) -> Result<()>
    where
        F: FnMut(&NavigatorHandle) -> Result<()> + Send + 'static,
    {
        self.handlers.bind(chord, Box::new(handler))
    }

    pub fn add_chord_handler<F>(&mut self, chord: KeyChord, handler: F)
    where
        F: FnMut(&NavigatorHandle) -> Result<()> + Send + 'static,
    {
        self.handlers.bind_chord(chord, Box::new(handler));
    }

    pub fn on_before_edit<F>(&mut self, handler: F)
    where
        F: FnMut(&NavigatorHandle) -> Result<()> + Send + 'static,
    {
        self.before_edit = Some(Box::new(handler));
    }

    pub fn on_after_edit<F>(&mut self, handler: F)
    where
        F: FnMut(&NavigatorHandle) -> Result<()> + Send + 'static,
    {
        self.after_edit = Some(Box::new(handler));
    }

    /// Runs when Esc ends the edit cycle. Without one the navigator's pending
    /// target is left alone, so a form that should lead somewhere must request it.
    pub fn on_exit<F>(&mut self, handler: F)
    where
        F: FnMut(&NavigatorHandle) -> Result<()> + Send + 'static,
    {
        self.on_exit = Some(Box::new(handler));
    }

    /// Rows of the current frame, before fitting to the terminal.
    pub fn frame(&self) -> Vec<String> {
        let width = self.renderer.size().width;
        let mut lines = vec![ansi::bolded(&self.title), String::new()];
        for (index, widget) in self.widgets.iter().enumerate() {
            let focused = self.editing && self.focus.current() == Some(index);
            lines.extend(widget.lines(width, focused));
        }
        if let Some(footer) = self.footer.as_ref() {
            let height = self.renderer.size().height as usize;
            if height > lines.len() {
                lines.resize(height - 1, String::new());
                lines.push(footer.clone());
            }
        }
        lines
    }

    fn move_focus(&mut self, forward: bool) {
        if let Some(index) = self.focus.current() {
            set_editing_deep(self.widgets[index].as_focus_target(), false);
        }
        let next = if forward {
            self.focus.next()
        } else {
            self.focus.previous()
        };
        if let Some(index) = next {
            set_editing_deep(self.widgets[index].as_focus_target(), true);
        }
    }

    fn run_handler(slot: &mut Option<FormHandler>, navigator: &NavigatorHandle) -> Result<()> {
        match slot.as_mut() {
            Some(handler) => handler(navigator),
            None => Ok(()),
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }
        if let Some(handler) = self.handlers.lookup_mut(key) {
            return handler(&self.navigator);
        }

        let flow = match self.focus.current() {
            Some(index) => self.widgets[index].handle_key(key),
            None => WidgetFlow::Continue,
        };
        match flow {
            WidgetFlow::Consumed => {}
            WidgetFlow::Finished => self.move_focus(true),
            WidgetFlow::Continue => match key.code {
                KeyCode::Tab => self.move_focus(true),
                KeyCode::BackTab => self.move_focus(false),
                KeyCode::Esc => {
                    Self::run_handler(&mut self.on_exit, &self.navigator)?;
                    self.editing = false;
                }
                _ => {}
            },
        }
        Ok(())
    }
}

impl Screen for Form {
    fn attach(&mut self, navigator: NavigatorHandle) {
        self.navigator = navigator;
    }

    fn detach(&mut self) {
        self.navigator = NavigatorHandle::detached();
    }

    fn resize(&mut self, size: Size) -> Result<()> {
        self.renderer.resize(size);
        Ok(())
    }

    fn before_edit(&mut self) -> Result<()> {
        self.renderer.invalidate();
        if self.focus.current().is_none() {
            self.focus.first();
        }
        if let Some(index) = self.focus.current() {
            set_editing_deep(self.widgets[index].as_focus_target(), true);
        }
        Self::run_handler(&mut self.before_edit, &self.navigator)
    }

    fn after_edit(&mut self) -> Result<()> {
        Self::run_handler(&mut self.after_edit, &self.navigator)
    }

    fn render(&mut self, out: &mut dyn Write) -> Result<()> {
        let lines = self.frame();
        self.renderer.render(out, &lines)?;
        Ok(())
    }

    fn handle_event(&mut self, event: &ScreenEvent) -> Result<()> {
        match event {
            ScreenEvent::Key(key) => self.handle_key(key),
            _ => Ok(()),
        }
    }

    fn is_editing(&self) -> bool {
        self.editing
    }

    fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    fn focused_widget_mut(&mut self) -> Option<&mut dyn FocusTarget> {
        let index = self.focus.current()?;
        Some(self.widgets.get_mut(index)?.as_focus_target())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::input::{ScriptedEvents, ctrl, key};
    use crate::navigator::{Navigator, Target};
    use crate::widgets::{SelectOne, TextField, TitledSelectOne, TitledText};

    fn chars(text: &str) -> Vec<ScreenEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    fn stop_on_esc(form: &mut Form) {
        form.on_exit(|nav| nav.request_next(Target::Stop));
    }

    fn run(navigator: &mut Navigator, events: Vec<ScreenEvent>) -> String {
        let mut events = ScriptedEvents::new(events).with_size(Size::new(40, 8));
        let mut out = Vec::new();
        navigator.run(&mut (), &mut out, &mut events).expect("run");
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = Form::new("Screen 1");
        form.add(TitledText::text("Name:", ""));
        stop_on_esc(&mut form);

        let mut navigator = Navigator::new();
        navigator.register("MAIN", form);
        let mut events = chars("ada");
        events.push(key(KeyCode::Esc));
        let output = run(&mut navigator, events);

        assert!(output.contains("Screen 1"));
        assert!(output.contains("ada"));
    }

    #[test]
    fn tab_cycles_focus_and_finished_widget_advances() {
        let mut form = Form::new("Fields");
        let first = form.add(TitledText::text("A:", ""));
        let second = form.add(TitledText::text("B:", ""));

        let navigator = Navigator::new();
        form.attach(navigator.handle());
        form.before_edit().expect("before");
        assert_eq!(form.focused(), Some(first));

        form.handle_event(&key(KeyCode::Tab)).expect("tab");
        assert_eq!(form.focused(), Some(second));
        let b = form.widget::<TitledText>(second).expect("b");
        assert!(b.is_editing() && b.inner().is_editing());
        assert!(!form.widget::<TitledText>(first).expect("a").is_editing());

        form.handle_event(&key(KeyCode::Enter)).expect("enter");
        assert_eq!(form.focused(), Some(first));

        form.handle_event(&key(KeyCode::BackTab)).expect("backtab");
        assert_eq!(form.focused(), Some(second));
    }

    #[test]
    fn handlers_take_precedence_over_widgets() {
        let hits = Arc::new(Mutex::new(0));
        let counter = hits.clone();
        let mut form = Form::new("Keys");
        let field = form.add(TextField::new(""));
        form.add_handler("^T", move |_nav| {
            *counter.lock().expect("hits") += 1;
            Ok(())
        })
        .expect("bind");

        form.before_edit().expect("before");
        form.handle_event(&ctrl('t')).expect("ctrl-t");
        form.handle_event(&key(KeyCode::Char('t'))).expect("t");
        assert_eq!(*hits.lock().expect("hits"), 1);
        assert_eq!(form.widget::<TextField>(field).expect("field").value(), "t");
    }

    #[test]
    fn invalid_chord_is_rejected() {
        let mut form = Form::new("Keys");
        let err = form.add_handler("ctrl+", |_nav| Ok(())).unwrap_err();
        assert!(matches!(err, crate::NavError::InvalidBinding(_)));
    }

    #[test]
    fn esc_runs_exit_handler_and_ends_cycle() {
        let mut form = Form::new("Bye");
        stop_on_esc(&mut form);
        let navigator = Navigator::new();
        form.attach(navigator.handle());
        form.set_editing(true);
        form.handle_event(&key(KeyCode::Esc)).expect("esc");
        assert!(!form.is_editing());
        assert_eq!(navigator.next_target().expect("next"), Target::Stop);
    }

    #[test]
    fn select_one_inside_form() {
        let mut form = Form::new("Pick");
        let list = form.add(TitledSelectOne::new(
            "Colour:",
            SelectOne::new(["red", "green", "blue"]).with_height(3),
        ));
        form.before_edit().expect("before");
        form.handle_event(&key(KeyCode::Down)).expect("down");
        form.handle_event(&key(KeyCode::Char(' '))).expect("space");
        let picked = form.widget::<TitledSelectOne>(list).expect("list");
        assert_eq!(picked.inner().selected_label(), Some("green"));
        assert_eq!(form.focused(), Some(list));
    }

    #[test]
    fn forced_switch_reaches_next_form_with_one_key() {
        let mut main = Form::new("Screen 1");
        main.add(TitledText::text("Text:", "Press ^T to change screens"));
        main.add_handler("^T", |nav| nav.switch_now("SECOND"))
            .expect("bind");

        let mut second = Form::new("Screen 2");
        second.add(TitledText::text("Text:", ""));
        stop_on_esc(&mut second);

        let mut navigator = Navigator::new();
        navigator.register("MAIN", main);
        navigator.register("SECOND", second);

        let mut events = vec![ctrl('t')];
        events.extend(chars("ok"));
        events.push(key(KeyCode::Esc));
        let output = run(&mut navigator, events);

        // Both keys after ^T landed in the second form's field.
        assert!(output.contains("ok"));
        let main = navigator.screen_mut("MAIN").expect("main");
        assert!(!main.is_editing());
        let field = main.focused_widget_mut().expect("focused");
        assert!(!field.is_editing());
        assert!(!field.entry_mut().expect("entry").is_editing());
    }

    #[test]
    fn footer_sits_on_last_row() {
        let mut form = Form::new("Title").with_footer("^T next");
        form.resize(Size::new(20, 5)).expect("resize");
        let frame = form.frame();
        assert_eq!(frame.len(), 5);
        assert_eq!(frame[4], "^T next");
    }

    #[test]
    fn release_events_are_ignored() {
        let mut form = Form::new("Keys");
        let field = form.add(TextField::new(""));
        form.before_edit().expect("before");
        let mut release = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        form.handle_event(&ScreenEvent::Key(release)).expect("release");
        assert_eq!(form.widget::<TextField>(field).expect("field").value(), "");
    }
}
