use std::sync::{Arc, Mutex};

use chime_timer::{
    engine::{CompletionEffects, EventBus, ManualScheduler, TimerEngine, TimerEvent},
    state::{MemoryStore, Settings, SettingsHandle, SettingsStore},
    ManualClock, TimerState,
};
use tokio::sync::broadcast;

#[derive(Clone, Default)]
struct CountingEffects {
    completed: Arc<Mutex<usize>>,
}

impl CompletionEffects for CountingEffects {
    fn on_completed(&mut self, _settings: &Settings) {
        *self.completed.lock().expect("lock") += 1;
    }

    fn suppress(&mut self) {}
}

struct Rig {
    engine: TimerEngine,
    clock: ManualClock,
    scheduler: ManualScheduler,
    effects: CountingEffects,
    store: Arc<MemoryStore>,
    rx: broadcast::Receiver<TimerEvent>,
}

fn rig() -> Rig {
    let clock = ManualClock::new(0);
    let scheduler = ManualScheduler::new();
    let effects = CountingEffects::default();
    let store = Arc::new(MemoryStore::new());
    let events = EventBus::new();
    let rx = events.subscribe();

    let engine = TimerEngine::new(
        Arc::new(clock.clone()),
        Box::new(scheduler.clone()),
        Box::new(effects.clone()),
        SettingsHandle::load(store.clone()),
        events,
    );

    Rig { engine, clock, scheduler, effects, store, rx }
}

impl Rig {
    fn fire(&mut self) {
        let handle = self.scheduler.take_fired().expect("tick pending");
        self.engine.on_tick_fired(handle);
    }

    fn drain(&mut self) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn completions(&self) -> usize {
        *self.effects.completed.lock().expect("lock")
    }
}

fn first_tick(events: &[TimerEvent]) -> Option<(u64, u64, f64)> {
    events.iter().find_map(|event| match event {
        TimerEvent::Tick { minutes_left, seconds_left, progress, .. } => {
            Some((*minutes_left, *seconds_left, *progress))
        }
        _ => None,
    })
}

#[test]
fn every_duration_starts_at_zero_progress() {
    for minutes in 1..=180u32 {
        let mut rig = rig();
        rig.engine.set_duration(f64::from(minutes));
        rig.drain();

        rig.engine.start();

        assert_eq!(rig.engine.total_duration_ms(), Some(u64::from(minutes) * 60_000));
        let (_, seconds, progress) = first_tick(&rig.drain()).expect("first tick");
        assert_eq!(seconds, 0);
        assert_eq!(progress, 0.0, "duration {}", minutes);
    }
}

#[test]
fn one_minute_countdown_end_to_end() {
    let mut rig = rig();
    rig.engine.set_duration(1.0);
    rig.engine.start();
    rig.drain();

    let mut last_seconds = 60;
    for t in (1_000..=59_000).step_by(1_000) {
        rig.clock.set(t);
        rig.fire();

        let (minutes, seconds, progress) = first_tick(&rig.drain()).expect("tick");
        assert_eq!(minutes, 0);
        assert!(seconds < last_seconds, "seconds must decrease at t={}", t);
        assert_eq!(seconds, ((60_000 - t) / 1000) as u64);
        assert!((progress - t as f64 / 60_000.0).abs() < 1e-9);
        last_seconds = seconds;
    }
    assert_eq!(rig.completions(), 0);

    rig.clock.set(60_000);
    rig.fire();

    let events = rig.drain();
    assert_eq!(first_tick(&events), Some((0, 0, 1.0)));
    assert_eq!(events.iter().filter(|e| **e == TimerEvent::Completed).count(), 1);
    assert_eq!(rig.completions(), 1);
    assert_eq!(rig.engine.state(), TimerState::Idle);
    assert!(rig.scheduler.pending().is_none());
}

#[test]
fn pause_resume_reports_progress_against_original_total() {
    let mut rig = rig();
    rig.engine.set_duration(10.0);
    rig.engine.start();

    rig.clock.set(120_000);
    rig.engine.pause();
    rig.clock.set(500_000);
    rig.engine.resume();
    rig.drain();

    rig.clock.set(500_000 + 60_000);
    rig.fire();

    let (minutes, seconds, progress) = first_tick(&rig.drain()).expect("tick");
    assert_eq!((minutes, seconds), (7, 0));
    assert!((progress - 0.3).abs() < 1e-9);
    assert_eq!(rig.engine.total_duration_ms(), Some(600_000));
}

#[test]
fn suspended_host_completes_on_wake() {
    let mut rig = rig();
    rig.engine.set_duration(5.0);
    rig.engine.start();
    rig.drain();

    rig.clock.advance(3 * 60 * 60_000);
    rig.fire();

    let events = rig.drain();
    assert!(events.contains(&TimerEvent::Completed));
    assert!(events.iter().all(|e| !matches!(e, TimerEvent::Tick { progress, .. } if *progress < 1.0)));
    assert_eq!(rig.completions(), 1);

    rig.engine.tick();
    assert_eq!(rig.completions(), 1);
}

#[test]
fn duration_round_trips_through_settings_record() {
    let mut rig = rig();
    rig.engine.set_duration(37.0);

    let raw = rig.store.read_raw().expect("read").expect("record written");
    assert_eq!(Settings::from_json_lenient(&raw).last_minutes, 37);

    let restored = rig_with_store(rig.store.clone());
    assert_eq!(restored.duration_minutes(), 37);
}

fn rig_with_store(store: Arc<MemoryStore>) -> TimerEngine {
    TimerEngine::new(
        Arc::new(ManualClock::new(0)),
        Box::new(ManualScheduler::new()),
        Box::new(CountingEffects::default()),
        SettingsHandle::load(store),
        EventBus::new(),
    )
}

#[test]
fn boundary_inputs() {
    let mut rig = rig();

    rig.engine.set_duration(0.0);
    assert_eq!(rig.engine.duration_minutes(), 1);

    rig.engine.set_duration(999.0);
    assert_eq!(rig.engine.duration_minutes(), 180);

    rig.engine.set_duration(f64::NAN);
    assert_eq!(rig.engine.duration_minutes(), 180);
}

#[test]
fn double_pause_and_double_reset_are_harmless() {
    let mut rig = rig();
    rig.engine.start();
    rig.engine.pause();
    rig.engine.pause();
    rig.engine.reset(true);
    rig.engine.reset(true);

    let states: Vec<TimerState> = rig
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            TimerEvent::StateChanged { state } => Some(state),
            _ => None,
        })
        .collect();
    assert_eq!(states, vec![TimerState::Running, TimerState::Paused, TimerState::Idle]);
    assert_eq!(rig.scheduler.outstanding(), 0);
}

#[test]
fn restart_after_completion_begins_a_fresh_run() {
    let mut rig = rig();
    rig.engine.set_duration(1.0);
    rig.engine.start();
    rig.clock.set(60_000);
    rig.fire();

    rig.engine.start();

    assert_eq!(rig.engine.state(), TimerState::Running);
    assert_eq!(rig.engine.end_timestamp_ms(), Some(120_000));
    assert_eq!(rig.engine.total_duration_ms(), Some(60_000));
}
