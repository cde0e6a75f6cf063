use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::emulator::display::Frame;
use crate::emulator::fault::Fault;
use crate::emulator::instruction::Instruction;
use crate::emulator::keypad::Key;
use crate::emulator::machine::{Machine, Step};
use crate::error::CoreError;
use crate::feed::Feed;
use crate::program::Program;
use crate::scheduler::config::Config;
use crate::snapshot::EmulationState;

/// Where the scheduler is in its life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    /// A fault stopped the run. Only `stop` leaves this state.
    Halted(Fault),
}

impl RunState {
    pub fn playing_info(self) -> PlayingInfo {
        match self {
            RunState::Idle => PlayingInfo {
                has_started: false,
                is_playing: false,
            },
            RunState::Running => PlayingInfo {
                has_started: true,
                is_playing: true,
            },
            RunState::Paused | RunState::Halted(_) => PlayingInfo {
                has_started: true,
                is_playing: false,
            },
        }
    }
}

/// The run state as seen by a play/pause button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayingInfo {
    /// From a successful start until the next stop.
    pub has_started: bool,
    /// False while paused or halted.
    pub is_playing: bool,
}

/// Key and fault details for visualising what the program is waiting on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugInfo {
    pub required_keys: Vec<Key>,
    pub pressed_keys: Vec<Key>,
    /// The register a pending `FX0A` will write to.
    pub awaiting_register: Option<u8>,
    pub fault: Option<Fault>,
}

/// Every feed the core publishes to.
pub(crate) struct Outputs {
    pub frame: Feed<Frame>,
    pub sound_timer: Feed<u8>,
    pub playing_info: Feed<PlayingInfo>,
    pub debug: Feed<DebugInfo>,
}

impl Outputs {
    pub fn new() -> Outputs {
        Outputs {
            frame: Feed::new(Frame::blank()),
            sound_timer: Feed::new(0),
            playing_info: Feed::new(PlayingInfo::default()),
            debug: Feed::new(DebugInfo::default()),
        }
    }
}

type Reply<T> = Sender<Result<T, CoreError>>;

/// A message to the worker that owns the session.
pub(crate) enum Command {
    Start(Program, Reply<()>),
    Stop(Reply<()>),
    TogglePause(Reply<PlayingInfo>),
    KeyDown(Key),
    KeyUp(Key),
    Export(Reply<EmulationState>),
    Import(Box<EmulationState>, Reply<()>),
    State(Sender<RunState>),
    Shutdown,
}

struct Run {
    program: Program,
    machine: Machine,
}

/// The single owner of all emulation state. Every command and every
/// instruction or timer tick goes through `&mut self`, so nothing races.
pub(crate) struct Session {
    state: RunState,
    run: Option<Run>,
    config: Config,
    outputs: Arc<Outputs>,
}

impl Session {
    pub fn new(config: Config, outputs: Arc<Outputs>) -> Session {
        Session {
            state: RunState::Idle,
            run: None,
            config,
            outputs,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Apply one command. Returns false once the worker should exit.
    pub fn handle(&mut self, command: Command) -> bool {
        // A caller that gave up on its reply is not an error
        match command {
            Command::Start(program, reply) => {
                let _ = reply.send(self.start(program));
            }
            Command::Stop(reply) => {
                let _ = reply.send(self.stop());
            }
            Command::TogglePause(reply) => {
                let _ = reply.send(self.toggle_pause());
            }
            Command::KeyDown(key) => self.key_down(key),
            Command::KeyUp(key) => self.key_up(key),
            Command::Export(reply) => {
                let _ = reply.send(self.export_state());
            }
            Command::Import(state, reply) => {
                let _ = reply.send(self.load_state(*state));
            }
            Command::State(reply) => {
                let _ = reply.send(self.state);
            }
            Command::Shutdown => {
                self.stop().ok();
                return false;
            }
        }
        true
    }

    pub fn start(&mut self, program: Program) -> Result<(), CoreError> {
        if self.state != RunState::Idle {
            log::warn!("Refusing to start {:?} while {:?}", program.name(), self.state);
            return Err(CoreError::AlreadyStarted);
        }
        let seed = self.config.seed();
        log::info!("Starting {:?} with seed {}", program.name(), seed);
        let machine = Machine::new(program.rom(), seed);
        self.run = Some(Run { program, machine });
        self.state = RunState::Running;
        self.publish_all();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), CoreError> {
        if self.state == RunState::Idle {
            log::debug!("Stop while idle");
            return Ok(());
        }
        if let Some(run) = self.run.take() {
            log::info!("Stopped {:?}", run.program.name());
        }
        self.state = RunState::Idle;
        self.outputs.frame.publish(Frame::blank());
        self.outputs.sound_timer.publish(0);
        self.outputs.debug.publish(DebugInfo::default());
        self.publish_playing_info();
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> Result<PlayingInfo, CoreError> {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
            RunState::Idle => return Err(CoreError::NotStarted),
            RunState::Halted(fault) => return Err(CoreError::Halted(fault)),
        };
        log::info!("Now {:?}", self.state);
        self.publish_playing_info();
        Ok(self.state.playing_info())
    }

    pub fn key_down(&mut self, key: Key) {
        if let Some(run) = self.live_run() {
            log::debug!("Key down {}", key);
            run.machine.key_down(key);
            self.publish_debug();
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if let Some(run) = self.live_run() {
            log::debug!("Key up {}", key);
            run.machine.key_up(key);
            self.publish_debug();
        }
    }

    pub fn export_state(&self) -> Result<EmulationState, CoreError> {
        let run = self.run.as_ref().ok_or(CoreError::NotStarted)?;
        log::info!("Exporting state of {:?}", run.program.name());
        Ok(EmulationState::capture(run.program.digest(), &run.machine))
    }

    /// Replace the live machine with `state` if it came from the same program.
    pub fn load_state(&mut self, state: EmulationState) -> Result<(), CoreError> {
        if let RunState::Halted(fault) = self.state {
            return Err(CoreError::Halted(fault));
        }
        let run = self.run.as_mut().ok_or(CoreError::NotStarted)?;
        let expected = run.program.digest();
        let found = state.program_digest();
        if expected != found {
            log::warn!("Rejecting snapshot for {}, running {}", found, expected);
            return Err(CoreError::StateHashMismatch { expected, found });
        }
        run.machine.restore_from(state.into_machine());
        log::info!("Restored state of {:?}", run.program.name());
        self.publish_all();
        Ok(())
    }

    /// Execute one instruction if running.
    pub fn run_cycle(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        let run = match self.run.as_mut() {
            Some(run) => run,
            None => return,
        };
        let sound = run.machine.timers().sound;
        match run.machine.step() {
            Ok(Step::Executed(instruction)) => {
                if run.machine.take_display_changed() {
                    self.outputs.frame.publish(run.machine.frame());
                }
                if run.machine.timers().sound != sound {
                    self.outputs.sound_timer.publish(run.machine.timers().sound);
                }
                match instruction {
                    Instruction::SkipIfKey(_)
                    | Instruction::SkipIfNotKey(_)
                    | Instruction::WaitForKey(_) => self.publish_debug(),
                    _ => {}
                }
            }
            Ok(Step::WaitingForKey) => {}
            Err(fault) => {
                log::error!("Halting {:?}: {}", run.program.name(), fault);
                self.state = RunState::Halted(fault);
                self.publish_playing_info();
                self.publish_debug();
            }
        }
    }

    /// One 60 Hz timer tick if running. Timers keep counting while `FX0A` waits.
    pub fn tick_timers(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        if let Some(run) = self.run.as_mut() {
            let sound = run.machine.timers().sound;
            run.machine.tick_timers();
            if run.machine.timers().sound != sound {
                self.outputs.sound_timer.publish(run.machine.timers().sound);
            }
        }
    }

    /// The run, unless idle or halted.
    fn live_run(&mut self) -> Option<&mut Run> {
        match self.state {
            RunState::Running | RunState::Paused => self.run.as_mut(),
            RunState::Idle | RunState::Halted(_) => None,
        }
    }

    fn publish_all(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.machine.take_display_changed();
            self.outputs.frame.publish(run.machine.frame());
            self.outputs.sound_timer.publish(run.machine.timers().sound);
        }
        self.publish_playing_info();
        self.publish_debug();
    }

    fn publish_playing_info(&self) {
        self.outputs.playing_info.publish(self.state.playing_info());
    }

    fn publish_debug(&self) {
        let fault = match self.state {
            RunState::Halted(fault) => Some(fault),
            _ => None,
        };
        let info = match &self.run {
            Some(run) => DebugInfo {
                required_keys: run.machine.required_keys(),
                pressed_keys: run.machine.keypad().pressed(),
                awaiting_register: run.machine.keypad().awaiting(),
                fault,
            },
            None => DebugInfo::default(),
        };
        self.outputs.debug.publish(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::timers::Timers;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::channel;

    fn session() -> (Session, Arc<Outputs>) {
        let outputs = Arc::new(Outputs::new());
        let config = Config {
            rng_seed: Some(7),
            ..Config::default()
        };
        (Session::new(config, outputs.clone()), outputs)
    }

    fn program(rom: &[u8]) -> Program {
        Program::load("test", rom).unwrap()
    }

    fn cycles(session: &mut Session, n: usize) {
        for _ in 0..n {
            session.run_cycle();
        }
    }

    fn registers(session: &Session) -> [u8; 16] {
        session.export_state().unwrap().registers().v
    }

    #[test]
    fn start_runs_and_publishes_playing_info() {
        let (mut session, outputs) = session();
        let mut playing = outputs.playing_info.subscribe();
        session.start(program(&[0x60, 0x05])).unwrap();
        assert_eq!(session.state(), RunState::Running);
        assert_eq!(
            playing.try_next(),
            Some(PlayingInfo {
                has_started: true,
                is_playing: true
            })
        );
        cycles(&mut session, 1);
        assert_eq!(registers(&session)[0], 5);
    }

    #[test]
    fn start_while_started_is_refused() {
        let (mut session, _) = session();
        session.start(program(&[0x60, 0x05])).unwrap();
        assert_eq!(session.start(program(&[0x60, 0x06])), Err(CoreError::AlreadyStarted));
        cycles(&mut session, 1);
        assert_eq!(registers(&session)[0], 5);
    }

    #[test]
    fn stop_resets_to_idle() {
        let (mut session, outputs) = session();
        session.start(program(&[0x60, 0x05])).unwrap();
        session.stop().unwrap();
        assert_eq!(session.state(), RunState::Idle);
        assert_eq!(outputs.playing_info.latest(), PlayingInfo::default());
        assert_eq!(session.export_state(), Err(CoreError::NotStarted));
        session.start(program(&[0x60, 0x06])).unwrap();
        cycles(&mut session, 1);
        assert_eq!(registers(&session)[0], 6);
    }

    #[test]
    fn pause_suspends_cycles_and_timers() {
        let (mut session, _) = session();
        session.start(program(&[0x60, 0x09, 0xF0, 0x15, 0x70, 0x01, 0x70, 0x01])).unwrap();
        cycles(&mut session, 2);
        assert_eq!(
            session.toggle_pause(),
            Ok(PlayingInfo {
                has_started: true,
                is_playing: false
            })
        );
        cycles(&mut session, 5);
        session.tick_timers();
        let paused = session.export_state().unwrap();
        assert_eq!(paused.registers().pc, 0x204);
        assert_eq!(paused.timers().delay, 9);

        session.toggle_pause().unwrap();
        cycles(&mut session, 1);
        session.tick_timers();
        let resumed = session.export_state().unwrap();
        assert_eq!(resumed.registers().v[0], 10);
        assert_eq!(resumed.timers().delay, 8);
    }

    #[test]
    fn toggle_pause_requires_a_live_run() {
        let (mut session, _) = session();
        assert_eq!(session.toggle_pause(), Err(CoreError::NotStarted));
    }

    #[test]
    fn fault_halts_until_restart() {
        let (mut session, outputs) = session();
        let mut debug = outputs.debug.subscribe();
        session.start(program(&[0x00, 0xEE, 0x60, 0x01])).unwrap();
        cycles(&mut session, 3);
        let fault = Fault::StackUnderflow { address: 0x200 };
        assert_eq!(session.state(), RunState::Halted(fault));
        assert_eq!(debug.latest().fault, Some(fault));
        assert_eq!(registers(&session)[0], 0);
        assert_eq!(session.toggle_pause(), Err(CoreError::Halted(fault)));
        assert_eq!(session.start(program(&[0x60, 0x01])), Err(CoreError::AlreadyStarted));
        assert!(session.export_state().is_ok());

        session.stop().unwrap();
        session.start(program(&[0x60, 0x01])).unwrap();
        cycles(&mut session, 1);
        assert_eq!(registers(&session)[0], 1);
    }

    #[test]
    fn timers_tick_while_waiting_for_key() {
        let (mut session, outputs) = session();
        let mut sound = outputs.sound_timer.subscribe();
        session.start(program(&[0x60, 0x03, 0xF0, 0x18, 0xF3, 0x0A])).unwrap();
        cycles(&mut session, 3);
        assert_eq!(sound.try_next(), Some(3));
        cycles(&mut session, 10);
        session.tick_timers();
        session.tick_timers();
        let state = session.export_state().unwrap();
        assert_eq!(state.timers(), Timers { delay: 0, sound: 1 });
        assert_eq!(state.keypad().awaiting(), Some(3));
        assert_eq!(state.registers().pc, 0x204);
        assert_eq!(sound.try_next(), Some(1));
        assert_eq!(outputs.debug.latest().required_keys.len(), 16);
    }

    #[test]
    fn key_down_resolves_wait() {
        let (mut session, outputs) = session();
        session.start(program(&[0xF3, 0x0A, 0x60, 0x01])).unwrap();
        cycles(&mut session, 2);
        assert_eq!(outputs.debug.latest().awaiting_register, Some(3));

        session.key_down(Key::new(7).unwrap());
        let debug = outputs.debug.latest();
        assert_eq!(debug.awaiting_register, None);
        assert_eq!(debug.pressed_keys, vec![Key::new(7).unwrap()]);
        assert_eq!(registers(&session)[3], 7);

        cycles(&mut session, 1);
        assert_eq!(session.export_state().unwrap().registers().pc, 0x204);
    }

    #[test]
    fn snapshot_round_trip_does_not_change_trace() {
        let rom = [0xC0, 0xFF, 0x81, 0x04, 0xA3, 0x00, 0xF1, 0x33, 0x12, 0x00];
        let (mut plain, _) = session();
        let (mut restored, _) = session();
        plain.start(program(&rom)).unwrap();
        restored.start(program(&rom)).unwrap();
        cycles(&mut plain, 17);
        cycles(&mut restored, 17);

        let state = restored.export_state().unwrap();
        restored.load_state(state).unwrap();

        for _ in 0..50 {
            plain.run_cycle();
            restored.run_cycle();
            assert_eq!(plain.export_state(), restored.export_state());
        }
    }

    #[test]
    fn snapshot_from_other_program_is_rejected() {
        let (mut other, _) = session();
        other.start(program(&[0x60, 0x07])).unwrap();
        cycles(&mut other, 1);
        let foreign = other.export_state().unwrap();

        let (mut session, _) = session();
        session.start(program(&[0x60, 0x05, 0x12, 0x00])).unwrap();
        cycles(&mut session, 1);
        let before = session.export_state().unwrap();

        assert_eq!(
            session.load_state(foreign.clone()),
            Err(CoreError::StateHashMismatch {
                expected: before.program_digest(),
                found: foreign.program_digest()
            })
        );
        assert_eq!(session.export_state().unwrap(), before);
        assert_eq!(session.state(), RunState::Running);
    }

    #[test]
    fn load_state_requires_started_run() {
        let (mut session, _) = session();
        let (mut other, _) = self::session();
        other.start(program(&[0x60, 0x07])).unwrap();
        let state = other.export_state().unwrap();
        assert_eq!(session.load_state(state), Err(CoreError::NotStarted));
    }

    #[test]
    fn handle_replies_and_shuts_down() {
        let (mut session, _) = session();
        let (reply, response) = channel();
        assert!(session.handle(Command::Start(program(&[0x60, 0x01]), reply)));
        assert_eq!(response.recv().unwrap(), Ok(()));

        let (reply, response) = channel();
        assert!(session.handle(Command::State(reply)));
        assert_eq!(response.recv().unwrap(), RunState::Running);

        assert!(!session.handle(Command::Shutdown));
        assert_eq!(session.state(), RunState::Idle);
    }
}
