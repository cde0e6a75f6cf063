//! In-memory save states.

use crate::emulator::display::Display;
use crate::emulator::keypad::Keypad;
use crate::emulator::machine::Machine;
use crate::emulator::memory::Memory;
use crate::emulator::registers::Registers;
use crate::emulator::timers::Timers;
use crate::program::ContentDigest;

/// A deep copy of a run's memory, registers, timers, keypad and display,
/// tagged with the digest of the program that produced it.
///
/// A snapshot holds no reference back into the running core. It can only
/// be loaded into a run of the program with the same digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulationState {
    program_digest: ContentDigest,
    machine: Machine,
}

impl EmulationState {
    pub(crate) fn capture(program_digest: ContentDigest, machine: &Machine) -> EmulationState {
        EmulationState {
            program_digest,
            machine: machine.clone(),
        }
    }

    pub(crate) fn into_machine(self) -> Machine {
        self.machine
    }

    pub fn program_digest(&self) -> ContentDigest {
        self.program_digest
    }

    pub fn memory(&self) -> &Memory {
        self.machine.memory()
    }

    pub fn registers(&self) -> &Registers {
        self.machine.registers()
    }

    pub fn timers(&self) -> Timers {
        self.machine.timers()
    }

    pub fn keypad(&self) -> &Keypad {
        self.machine.keypad()
    }

    pub fn display(&self) -> &Display {
        self.machine.display()
    }
}
