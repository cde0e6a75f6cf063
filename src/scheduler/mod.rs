//! The execution scheduler: a worker thread that owns all emulation state,
//! and the `EmulationCore` handle that talks to it.

pub mod cadence;
pub mod config;
pub mod session;

use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::emulator::display::Frame;
use crate::emulator::keypad::Key;
use crate::error::CoreError;
use crate::feed::Subscriber;
use crate::program::Program;
use crate::snapshot::EmulationState;

use cadence::Cadence;
use config::Config;
use session::{Command, Outputs, Session};
pub use session::{DebugInfo, PlayingInfo, RunState};

/// A handle to a running emulation worker.
///
/// Commands are queued to the worker and applied in order, interleaved with
/// instruction cycles and timer ticks. `start`, `stop`, `toggle_pause`,
/// `export_state` and `load_state` wait for the worker to apply them, so once
/// `stop` or a pausing `toggle_pause` returns nothing more is executed or published.
/// Key events are fire-and-forget.
pub struct EmulationCore {
    commands: Sender<Command>,
    outputs: Arc<Outputs>,
    worker: Option<JoinHandle<()>>,
}

impl EmulationCore {
    /// Spawn the worker thread.
    pub fn new(config: Config) -> EmulationCore {
        let outputs = Arc::new(Outputs::new());
        let (commands, receiver) = channel();
        let session = Session::new(config, outputs.clone());
        let worker = thread::spawn(move || Worker::new(session, config, receiver).run());
        EmulationCore {
            commands,
            outputs,
            worker: Some(worker),
        }
    }

    /// Validate a ROM image. Does not touch any running emulation.
    pub fn load(name: impl Into<String>, rom: &[u8]) -> Result<Program, CoreError> {
        Program::load(name, rom)
    }

    pub fn start(&self, program: Program) -> Result<(), CoreError> {
        self.request(|reply| Command::Start(program, reply))
    }

    pub fn stop(&self) -> Result<(), CoreError> {
        self.request(Command::Stop)
    }

    pub fn toggle_pause(&self) -> Result<PlayingInfo, CoreError> {
        self.request(Command::TogglePause)
    }

    pub fn key_down(&self, key: Key) -> Result<(), CoreError> {
        self.send(Command::KeyDown(key))
    }

    pub fn key_up(&self, key: Key) -> Result<(), CoreError> {
        self.send(Command::KeyUp(key))
    }

    /// A deep copy of the current state. Fails unless a run has started.
    pub fn export_state(&self) -> Result<EmulationState, CoreError> {
        self.request(Command::Export)
    }

    /// Replace the live state with `state`, which must come from the running program.
    pub fn load_state(&self, state: EmulationState) -> Result<(), CoreError> {
        self.request(|reply| Command::Import(Box::new(state), reply))
    }

    pub fn state(&self) -> Result<RunState, CoreError> {
        let (reply, response) = channel();
        self.send(Command::State(reply))?;
        response.recv().map_err(|_| CoreError::Disconnected)
    }

    pub fn frames(&self) -> Subscriber<Frame> {
        self.outputs.frame.subscribe()
    }

    pub fn sound_timer(&self) -> Subscriber<u8> {
        self.outputs.sound_timer.subscribe()
    }

    pub fn playing_info(&self) -> Subscriber<PlayingInfo> {
        self.outputs.playing_info.subscribe()
    }

    pub fn debug_info(&self) -> Subscriber<DebugInfo> {
        self.outputs.debug.subscribe()
    }

    fn send(&self, command: Command) -> Result<(), CoreError> {
        self.commands
            .send(command)
            .map_err(|_| CoreError::Disconnected)
    }

    fn request<T>(
        &self,
        command: impl FnOnce(Sender<Result<T, CoreError>>) -> Command,
    ) -> Result<T, CoreError> {
        let (reply, response) = channel();
        self.send(command(reply))?;
        response.recv().map_err(|_| CoreError::Disconnected)?
    }
}

impl Drop for EmulationCore {
    fn drop(&mut self) {
        // Tell the worker to stop, then wait for it
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Emulation worker panicked");
            }
        }
    }
}

/// Drives the session: waits for commands until the next instruction or
/// timer deadline, then runs whatever is due in time order.
struct Worker {
    session: Session,
    receiver: Receiver<Command>,
    cycle: Cadence,
    timer: Cadence,
}

impl Worker {
    fn new(session: Session, config: Config, receiver: Receiver<Command>) -> Worker {
        let now = Instant::now();
        Worker {
            session,
            receiver,
            cycle: Cadence::new(config.instruction_period(), now),
            timer: Cadence::new(config.timer_period(), now),
        }
    }

    fn run(mut self) {
        log::debug!("Emulation worker started");
        loop {
            let deadline = self.next_deadline();
            let command = match deadline {
                None => match self.receiver.recv() {
                    Ok(command) => Some(command),
                    Err(_) => break,
                },
                Some(deadline) => {
                    let timeout = deadline.saturating_duration_since(Instant::now());
                    match self.receiver.recv_timeout(timeout) {
                        Ok(command) => Some(command),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            };

            match command {
                Some(command) => {
                    let before = self.session.state();
                    if !self.session.handle(command) {
                        break;
                    }
                    self.follow_transition(before, self.session.state());
                }
                None => self.run_due(Instant::now()),
            }
        }
        log::debug!("Emulation worker exiting");
    }

    fn next_deadline(&self) -> Option<Instant> {
        if self.session.state() != RunState::Running {
            return None;
        }
        match (self.cycle.next(), self.timer.next()) {
            (Some(cycle), Some(timer)) => Some(cycle.min(timer)),
            (cycle, timer) => cycle.or(timer),
        }
    }

    /// Keep the cadences in step with the run state.
    fn follow_transition(&mut self, before: RunState, after: RunState) {
        let now = Instant::now();
        match (before, after) {
            (RunState::Paused, RunState::Running) => {
                self.cycle.resume(now);
                self.timer.resume(now);
            }
            (_, RunState::Running) if before != RunState::Running => {
                self.cycle.restart(now);
                self.timer.restart(now);
            }
            (RunState::Running, _) if after != RunState::Running => {
                self.cycle.pause(now);
                self.timer.pause(now);
            }
            _ => {}
        }
    }

    /// Run every instruction cycle and timer tick due at `now`, earliest first.
    fn run_due(&mut self, now: Instant) {
        let before = self.session.state();
        while self.session.state() == RunState::Running {
            let cycle = self.cycle.next().filter(|deadline| *deadline <= now);
            let timer = self.timer.next().filter(|deadline| *deadline <= now);
            match (cycle, timer) {
                (Some(cycle), Some(timer)) if timer <= cycle => self.tick(now),
                (Some(_), _) => self.instruction(now),
                (None, Some(_)) => self.tick(now),
                (None, None) => break,
            }
        }
        // A fault may have halted the run
        self.follow_transition(before, self.session.state());
    }

    fn instruction(&mut self, now: Instant) {
        if self.cycle.poll(now) {
            self.session.run_cycle();
        }
    }

    fn tick(&mut self, now: Instant) {
        if self.timer.poll(now) {
            self.session.tick_timers();
        }
    }
}
