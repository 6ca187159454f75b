use std::hint::black_box;
use std::io;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use crossterm::event::KeyCode;
use room_nav::input::{ctrl, key};
use room_nav::{
    Form, Logger, Navigator, NavigatorConfig, NullSink, RecordingAudit, Result, ScreenArgs,
    ScreenEvent, ScriptedEvents, Size, Target, TitledText,
};

const ROUND_TRIPS: usize = 50;

fn cycle_form(title: &str, next: &'static str) -> Result<Form> {
    let mut form = Form::new(title);
    form.add(TitledText::text("Text:", "Press ^T to change screens"));
    form.add_handler("^T", move |nav| nav.switch_now(next))?;
    form.on_exit(|nav| nav.request_next(Target::Stop));
    Ok(form)
}

fn build_navigator(config: NavigatorConfig) -> Result<Navigator> {
    let mut navigator = Navigator::with_config(config);
    navigator.register("MAIN", cycle_form("Screen 1", "SECOND")?);
    navigator.register("SECOND", cycle_form("Screen 2", "THIRD")?);
    navigator.register_deferred(
        "THIRD",
        |_args: &ScreenArgs| Ok(Box::new(cycle_form("Screen 3", "MAIN")?) as Box<dyn room_nav::Screen>),
        ScreenArgs::new(),
    );
    Ok(navigator)
}

fn round_trip_script() -> Vec<ScreenEvent> {
    let mut events = Vec::with_capacity(ROUND_TRIPS * 4 + 1);
    for _ in 0..ROUND_TRIPS * 3 {
        events.push(key(KeyCode::Char('x')));
        events.push(ctrl('t'));
    }
    events.push(key(KeyCode::Esc));
    events
}

fn navigation_round_trips(c: &mut Criterion) {
    let script = round_trip_script();
    c.bench_function("navigation_round_trips", |b| {
        b.iter(|| {
            let mut navigator = build_navigator(NavigatorConfig::default()).expect("navigator");
            let mut events = ScriptedEvents::new(black_box(script.clone())).with_size(Size::new(100, 30));
            navigator
                .run(&mut (), &mut io::sink(), &mut events)
                .expect("scripted run");
        });
    });
}

fn navigation_round_trips_instrumented(c: &mut Criterion) {
    let script = round_trip_script();
    c.bench_function("navigation_round_trips_instrumented", |b| {
        b.iter(|| {
            let mut config = NavigatorConfig::default()
                .with_logger(Logger::new(NullSink))
                .with_audit(Arc::new(RecordingAudit::new()));
            config.enable_metrics();
            let mut navigator = build_navigator(config).expect("navigator");
            let mut events = ScriptedEvents::new(black_box(script.clone())).with_size(Size::new(100, 30));
            navigator
                .run(&mut (), &mut io::sink(), &mut events)
                .expect("scripted run");
        });
    });
}

criterion_group!(benches, navigation_round_trips, navigation_round_trips_instrumented);
criterion_main!(benches);
