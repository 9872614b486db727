//! Engine driver task
//!
//! Owns the [`TimerEngine`] and is the only place its state is mutated.
//! Commands from the presentation layer and fired ticks from the scheduler
//! are handled strictly one at a time.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{scheduler::TickHandle, timer::TimerEngine};

/// Commands accepted from the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerCommand {
    SetDuration(f64),
    StepDuration(i32),
    Start,
    Pause,
    Resume,
    Toggle,
    Reset { suppress: bool },
    /// Stop an in-flight completion chime without touching the run
    Silence,
    Shutdown,
}

impl TimerEngine {
    /// Apply a single command
    pub fn handle(&mut self, command: TimerCommand) {
        debug!("Handling command: {:?}", command);
        match command {
            TimerCommand::SetDuration(minutes) => self.set_duration(minutes),
            TimerCommand::StepDuration(delta) => self.step_duration(delta),
            TimerCommand::Start => self.start(),
            TimerCommand::Pause => self.pause(),
            TimerCommand::Resume => self.resume(),
            TimerCommand::Toggle => self.toggle(),
            TimerCommand::Reset { suppress } => self.reset(suppress),
            TimerCommand::Silence => self.silence(),
            TimerCommand::Shutdown => {}
        }
    }
}

/// Run the engine until a `Shutdown` command arrives or every command sender
/// is dropped. Returns the engine so callers can inspect its final state.
pub async fn run_engine(
    mut engine: TimerEngine,
    mut commands: mpsc::UnboundedReceiver<TimerCommand>,
    mut fired_ticks: mpsc::UnboundedReceiver<TickHandle>,
) -> TimerEngine {
    info!("Starting timer engine task");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TimerCommand::Shutdown) => {
                    info!("Shutdown requested");
                    break;
                }
                Some(command) => engine.handle(command),
                None => {
                    debug!("Command channel closed");
                    break;
                }
            },

            Some(handle) = fired_ticks.recv() => {
                engine.on_tick_fired(handle);
            }
        }
    }

    engine.reset(true);
    info!("Timer engine task stopped");
    engine
}
