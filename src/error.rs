use thiserror::Error;

use crate::emulator::fault::Fault;
use crate::program::ContentDigest;

/// Why a command to the emulation core was refused.
///
/// None of these touch the running emulation: the command is simply not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("program {name:?} is empty")]
    EmptyProgram { name: String },
    #[error("program {name:?} is {len} bytes, but at most {max} bytes fit in memory")]
    ProgramTooLarge { name: String, len: usize, max: usize },
    #[error("no program has been started")]
    NotStarted,
    #[error("a program is already running, stop it first")]
    AlreadyStarted,
    #[error("the run has halted: {0}")]
    Halted(Fault),
    #[error("snapshot was taken from program {found}, but {expected} is running")]
    StateHashMismatch {
        expected: ContentDigest,
        found: ContentDigest,
    },
    #[error("the emulation worker is no longer running")]
    Disconnected,
}
