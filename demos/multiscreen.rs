//! Three screens cycled with ^T.
//!
//! MAIN and SECOND are registered once and keep whatever you type between
//! visits. THIRD is rebuilt on every visit, so its field always starts over.
//! Esc leaves the application. Set `ROOM_NAV_LOG=/path/to/file` to capture
//! the navigation log as JSON lines.

use room_nav::{
    FileSink, Form, Logger, Navigator, NavigatorApp, NavigatorConfig, Result, Screen, ScreenArgs,
    Target, TerminalDriver, TitledText,
};

struct MultiScreenApp {
    goodbye: bool,
}

impl NavigatorApp for MultiScreenApp {
    fn on_start(&mut self, navigator: &mut Navigator) -> Result<()> {
        navigator.add_screen("MAIN", build_form, ScreenArgs::new().named("name", "Screen 1"))?;
        navigator.add_screen("SECOND", build_form, ScreenArgs::new().named("name", "Screen 2"))?;
        navigator.register_deferred("THIRD", build_form, ScreenArgs::new().named("name", "Screen 3"));
        Ok(())
    }

    fn on_clean_exit(&mut self, _navigator: &mut Navigator) -> Result<()> {
        self.goodbye = true;
        Ok(())
    }
}

fn build_form(args: &ScreenArgs) -> Result<Box<dyn Screen>> {
    let name = args.get_str("name").unwrap_or("Screen").to_string();
    let next = match name.as_str() {
        "Screen 1" => "SECOND",
        "Screen 2" => "THIRD",
        _ => "MAIN",
    };

    let mut form = Form::new(name).with_footer("^T next screen   Tab next field   Esc quit");
    form.add(TitledText::text("Text:", "Press ^T to change screens"));
    form.add(TitledText::text("Notes:", ""));
    form.add_handler("^T", move |nav| {
        nav.switch_now(next)?;
        // The trail is not needed for a plain cycle.
        nav.reset_history()
    })?;
    form.on_exit(|nav| nav.request_next(Target::Stop));
    Ok(Box::new(form))
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut config = NavigatorConfig::default();
    if let Ok(path) = std::env::var("ROOM_NAV_LOG") {
        config = config.with_logger(Logger::new(FileSink::new(path, 1024 * 1024)?));
        config.enable_metrics();
    }

    let mut app = MultiScreenApp { goodbye: false };
    let mut driver = TerminalDriver::new(Navigator::with_config(config));
    driver.run(&mut app)?;

    if app.goodbye {
        println!("Goodbye!");
    }
    Ok(())
}
