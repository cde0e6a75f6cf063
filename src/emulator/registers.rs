use crate::emulator::fault::Fault;
use crate::emulator::memory::PROGRAM_START;

pub const NUM_REGISTERS: usize = 16;
pub const STACK_SIZE: usize = 16;
/// VF doubles as the carry, borrow and collision flag.
pub const FLAG: usize = 0xF;

/// General-purpose registers, the index register, the program counter and the call stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; NUM_REGISTERS],
    pub i: u16,
    pub pc: u16,
    stack_pointer: u8,
    stack: [u16; STACK_SIZE],
}

impl Registers {
    pub fn new() -> Registers {
        Registers {
            v: [0; NUM_REGISTERS],
            i: 0,
            pc: PROGRAM_START,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
        }
    }

    /// Push a return address. `call_site` is only used to report an overflow.
    pub fn push(&mut self, return_address: u16, call_site: u16) -> Result<(), Fault> {
        let slot = self
            .stack
            .get_mut(self.stack_pointer as usize)
            .ok_or(Fault::StackOverflow { address: call_site })?;
        *slot = return_address;
        self.stack_pointer += 1;
        Ok(())
    }

    /// Pop a return address. `return_site` is only used to report an underflow.
    pub fn pop(&mut self, return_site: u16) -> Result<u16, Fault> {
        if self.stack_pointer == 0 {
            return Err(Fault::StackUnderflow {
                address: return_site,
            });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer as usize
    }

    /// The live part of the call stack, oldest frame first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer as usize]
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
