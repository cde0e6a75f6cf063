use thiserror::Error;

/// A condition that stops the current run.
///
/// Faults are never corrected or skipped: the scheduler moves to the halted
/// state and stays there until the run is stopped and started again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Fault {
    /// The word at `address` does not decode to an instruction.
    #[error("invalid opcode {opcode:#06x} at {address:#05x}")]
    InvalidOpcode { opcode: u16, address: u16 },
    /// An instruction or fetch touched memory past the end of the address space.
    #[error("memory access out of bounds at {address:#06x}")]
    MemoryOutOfBounds { address: usize },
    /// A call at `address` would push a 17th return address.
    #[error("call stack overflow at {address:#05x}")]
    StackOverflow { address: u16 },
    /// A return at `address` found the call stack empty.
    #[error("return with empty call stack at {address:#05x}")]
    StackUnderflow { address: u16 },
}
