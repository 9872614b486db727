//! Chime Timer - a countdown timer with a Westminster-quarters chime
//!
//! This is the main entry point for the chime-timer application.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

use chime_timer::{
    chime::{ChimeAndNotify, ChimeSequencer},
    cli::{input::HELP, input_loop, render_loop},
    config::Config,
    engine::{run_engine, EventBus, TimerCommand, TimerEngine, TokioScheduler},
    services::{detect_notifier, detect_tone_generator, Notifier, TerminalBell, ToneGenerator},
    state::{JsonFileStore, SettingsHandle},
    utils::shutdown_signal,
    SystemClock,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they do not interleave with the countdown line
    tracing_subscriber::fmt()
        .with_env_filter(format!("chime_timer={}", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting chime-timer v1.0.0");

    let settings_path = config.settings_path();
    info!("Settings file: {}", settings_path.display());
    let settings = SettingsHandle::load(Arc::new(JsonFileStore::new(settings_path)));
    if config.mute {
        settings.update(|s| s.muted = true);
    }
    if config.no_notifications {
        settings.update(|s| s.notifications_enabled = false);
    }

    // Probe platform capabilities once
    let tone: Option<Arc<dyn ToneGenerator>> = detect_tone_generator()
        .await
        .map(|tone| Arc::new(tone) as Arc<dyn ToneGenerator>);
    let notifier: Option<Arc<dyn Notifier>> = detect_notifier()
        .await
        .map(|notifier| Arc::new(notifier) as Arc<dyn Notifier>);

    let events = EventBus::new();
    let chime = ChimeSequencer::new(tone, Arc::new(TerminalBell), events.clone());
    let chime_output = if chime.has_tone_generator() { "tones" } else { "terminal bell" };
    let effects = ChimeAndNotify::new(chime, notifier.clone());
    let (scheduler, fired_ticks) = TokioScheduler::new();

    let mut engine = TimerEngine::new(
        Arc::new(SystemClock),
        Box::new(scheduler),
        Box::new(effects),
        settings.clone(),
        events.clone(),
    );
    if let Some(minutes) = config.minutes {
        engine.set_duration(minutes);
    }

    info!(
        "Configuration: minutes={}, chime={}, muted={}, notifications={}",
        engine.duration_minutes(),
        chime_output,
        settings.snapshot().muted,
        notifier.is_some() && settings.snapshot().notifications_enabled
    );

    // Presentation tasks
    tokio::spawn(render_loop(events.subscribe(), engine.watch()));

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    tokio::spawn(input_loop(command_tx.clone(), settings.clone(), notifier));

    println!("{}", HELP);
    println!("Duration: {} minutes", engine.duration_minutes());
    if config.autostart {
        let _ = command_tx.send(TimerCommand::Start);
    }

    let driver = tokio::spawn(run_engine(engine, command_rx, fired_ticks));

    tokio::select! {
        result = driver => {
            if let Err(e) = result {
                tracing::error!("Timer engine task failed: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
            let _ = command_tx.send(TimerCommand::Shutdown);
        }
    }

    println!();
    info!("chime-timer stopped");

    // The blocking stdin reader would otherwise hold runtime shutdown until
    // the next line of input
    std::process::exit(0);
}
