//! The CHIP-8 virtual machine as described at https://en.wikipedia.org/wiki/CHIP-8#Virtual_machine_description.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::emulator::display::{Display, Frame};
use crate::emulator::fault::Fault;
use crate::emulator::instruction::*;
use crate::emulator::keypad::{Key, Keypad};
use crate::emulator::memory::{Memory, FONT_START, GLYPH_SIZE};
use crate::emulator::opcode::Opcode;
use crate::emulator::registers::{Registers, FLAG};
use crate::emulator::timers::Timers;

/// What a single call to `Machine::step` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// Nothing ran because `FX0A` is still waiting for a key.
    WaitingForKey,
}

/// All mutable state of one run, plus the instruction executor.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: Memory,
    registers: Registers,
    timers: Timers,
    keypad: Keypad,
    display: Display,
    rng: StdRng,
    used_keys: u16,
    display_changed: bool,
}

impl Machine {
    /// Create a machine with `rom` loaded at the program start address.
    ///
    /// `rom` is taken as already validated, as `Program::load` does. Bytes
    /// beyond `MAX_PROGRAM_SIZE` do not fit in memory and are dropped.
    pub fn new(rom: &[u8], seed: u64) -> Machine {
        let mut memory = Memory::new();
        memory.reset(rom);
        Machine {
            memory,
            registers: Registers::new(),
            timers: Timers::default(),
            keypad: Keypad::default(),
            display: Display::new(),
            rng: StdRng::seed_from_u64(seed),
            used_keys: 0,
            display_changed: true,
        }
    }

    /// Fetch, decode and execute the instruction at PC.
    ///
    /// On a fault PC is left on the faulting instruction.
    pub fn step(&mut self) -> Result<Step, Fault> {
        if self.keypad.awaiting().is_some() {
            return Ok(Step::WaitingForKey);
        }

        // Each opcode is two bytes, big-endian
        let address = self.registers.pc;
        let high = self.memory.read(address as usize)?;
        let low = self.memory.read(address as usize + 1)?;
        let opcode = Opcode::new(high, low);
        let instruction = Instruction::decode(opcode).ok_or(Fault::InvalidOpcode {
            opcode: opcode.as_u16(),
            address,
        })?;

        log::trace!("{:#05x}: {:?}", address, instruction);

        self.registers.pc = address + 2;
        if let Err(fault) = self.execute(instruction, address) {
            self.registers.pc = address;
            return Err(fault);
        }
        Ok(Step::Executed(instruction))
    }

    /// Execute a single instruction that was fetched from `address`.
    /// PC must already point past it.
    pub(crate) fn execute(&mut self, instruction: Instruction, address: u16) -> Result<(), Fault> {
        let v = &mut self.registers.v;
        match instruction {
            Instruction::ClearScreen => {
                self.display.clear();
                self.display_changed = true;
            }

            // Return to the previous call site via the stack.
            Instruction::Return => {
                self.registers.pc = self.registers.pop(address)?;
            }

            Instruction::Jump(Addr(addr)) => {
                self.registers.pc = addr;
            }

            // Store the return address on the stack, then jump to the specified address
            Instruction::Call(Addr(addr)) => {
                let return_address = self.registers.pc;
                self.registers.push(return_address, address)?;
                self.registers.pc = addr;
            }

            Instruction::SkipIfEqConst(Reg(x), Const(n)) => {
                let skip = v[x as usize] == n;
                self.skip_if(skip);
            }

            Instruction::SkipIfNeqConst(Reg(x), Const(n)) => {
                let skip = v[x as usize] != n;
                self.skip_if(skip);
            }

            Instruction::SkipIfEqReg(Reg(x), Reg(y)) => {
                let skip = v[x as usize] == v[y as usize];
                self.skip_if(skip);
            }

            Instruction::SkipIfNeqReg(Reg(x), Reg(y)) => {
                let skip = v[x as usize] != v[y as usize];
                self.skip_if(skip);
            }

            Instruction::SetConst(Reg(x), Const(n)) => {
                v[x as usize] = n;
            }

            // No carry flag for this one
            Instruction::AddConst(Reg(x), Const(n)) => {
                v[x as usize] = v[x as usize].wrapping_add(n);
            }

            Instruction::Move(Reg(x), Reg(y)) => {
                v[x as usize] = v[y as usize];
            }

            Instruction::Or(Reg(x), Reg(y)) => {
                v[x as usize] |= v[y as usize];
            }

            Instruction::And(Reg(x), Reg(y)) => {
                v[x as usize] &= v[y as usize];
            }

            Instruction::Xor(Reg(x), Reg(y)) => {
                v[x as usize] ^= v[y as usize];
            }

            // The flag is written last, so it wins when X is VF.
            Instruction::AddReg(Reg(x), Reg(y)) => {
                let (sum, carry) = v[x as usize].overflowing_add(v[y as usize]);
                v[x as usize] = sum;
                v[FLAG] = carry as u8;
            }

            Instruction::SubReg(Reg(x), Reg(y)) => {
                let (difference, borrow) = v[x as usize].overflowing_sub(v[y as usize]);
                v[x as usize] = difference;
                v[FLAG] = !borrow as u8;
            }

            Instruction::SubFromReg(Reg(x), Reg(y)) => {
                let (difference, borrow) = v[y as usize].overflowing_sub(v[x as usize]);
                v[x as usize] = difference;
                v[FLAG] = !borrow as u8;
            }

            Instruction::ShiftRight(Reg(x)) => {
                let value = v[x as usize];
                v[x as usize] = value >> 1;
                v[FLAG] = value & 1;
            }

            Instruction::ShiftLeft(Reg(x)) => {
                let value = v[x as usize];
                v[x as usize] = value << 1;
                v[FLAG] = value >> 7;
            }

            Instruction::SetIndex(Addr(addr)) => {
                self.registers.i = addr;
            }

            Instruction::JumpOffset(Addr(addr)) => {
                self.registers.pc = addr + v[0] as u16;
            }

            Instruction::Random(Reg(x), Const(n)) => {
                v[x as usize] = self.rng.gen::<u8>() & n;
            }

            Instruction::Draw(Reg(x), Reg(y), Const(height)) => {
                let x_coord = v[x as usize] as usize;
                let y_coord = v[y as usize] as usize;

                // Each sprite row is one byte
                let sprite = self.memory.slice(self.registers.i as usize, height as usize)?;
                let collision = self.display.draw_sprite(x_coord, y_coord, sprite);

                v[FLAG] = collision as u8;
                self.display_changed = true;
            }

            Instruction::SkipIfKey(Reg(x)) => {
                let code = v[x as usize];
                let pressed = self.test_key(code);
                self.skip_if(pressed);
            }

            Instruction::SkipIfNotKey(Reg(x)) => {
                let code = v[x as usize];
                let pressed = self.test_key(code);
                self.skip_if(!pressed);
            }

            Instruction::GetDelayTimer(Reg(x)) => {
                v[x as usize] = self.timers.delay;
            }

            // Stay on this instruction until a key press resolves the latch
            Instruction::WaitForKey(Reg(x)) => {
                self.keypad.await_key(x);
                self.registers.pc = address;
            }

            Instruction::SetDelayTimer(Reg(x)) => {
                self.timers.delay = v[x as usize];
            }

            Instruction::SetSoundTimer(Reg(x)) => {
                self.timers.sound = v[x as usize];
            }

            Instruction::AddToIndex(Reg(x)) => {
                self.registers.i = self.registers.i.wrapping_add(v[x as usize] as u16);
            }

            // Only the low nibble selects a glyph.
            Instruction::SetIndexToGlyph(Reg(x)) => {
                let glyph = (v[x as usize] & 0xF) as usize;
                self.registers.i = (FONT_START + glyph * GLYPH_SIZE) as u16;
            }

            Instruction::StoreBcd(Reg(x)) => {
                let value = v[x as usize];
                let i = self.registers.i as usize;
                self.memory.slice(i, 3)?;
                self.memory.write(i, value / 100)?;
                self.memory.write(i + 1, value / 10 % 10)?;
                self.memory.write(i + 2, value % 10)?;
            }

            // Dump register values up to Vx
            Instruction::RegDump(Reg(x)) => {
                let i = self.registers.i as usize;
                let count = x as usize + 1;
                self.memory.slice(i, count)?;
                for (offset, value) in v[..count].iter().enumerate() {
                    self.memory.write(i + offset, *value)?;
                }
            }

            // Load register values up to Vx
            Instruction::RegLoad(Reg(x)) => {
                let count = x as usize + 1;
                let values = self.memory.slice(self.registers.i as usize, count)?;
                v[..count].copy_from_slice(values);
            }
        };

        Ok(())
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc += 2;
        }
    }

    /// Whether the key named by `code` is held, remembering that the program asked.
    fn test_key(&mut self, code: u8) -> bool {
        match Key::new(code) {
            Some(key) => {
                self.used_keys |= 1 << key.code();
                self.keypad.is_pressed(key)
            }
            None => false,
        }
    }

    /// Press `key`. If `FX0A` is waiting, the key code lands in its
    /// register and PC moves past the wait.
    pub fn key_down(&mut self, key: Key) {
        if let Some(register) = self.keypad.key_down(key) {
            log::debug!("Key {} resolved wait into V{:X}", key, register);
            self.registers.v[register as usize] = key.code();
            self.registers.pc += 2;
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.keypad.key_up(key);
    }

    /// One 60 Hz timer tick.
    pub fn tick_timers(&mut self) {
        self.timers.tick();
    }

    /// Whether the display changed since the last call.
    pub fn take_display_changed(&mut self) -> bool {
        std::mem::replace(&mut self.display_changed, false)
    }

    pub fn frame(&self) -> Frame {
        self.display.snapshot()
    }

    /// Keys the program is currently interested in: every key while
    /// waiting on `FX0A`, otherwise those it has tested with `EX9E`/`EXA1`.
    pub fn required_keys(&self) -> Vec<Key> {
        if self.keypad.awaiting().is_some() {
            return Key::all().collect();
        }
        Key::all()
            .filter(|key| self.used_keys & (1 << key.code()) != 0)
            .collect()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Overwrite this machine with `other`, marking the display as changed.
    pub(crate) fn restore_from(&mut self, other: Machine) {
        *self = other;
        self.display_changed = true;
    }
}

/// Machines compare by emulated state. Random generators compare by their next output.
impl PartialEq for Machine {
    fn eq(&self, other: &Machine) -> bool {
        self.memory == other.memory
            && self.registers == other.registers
            && self.timers == other.timers
            && self.keypad == other.keypad
            && self.display == other.display
            && self.used_keys == other.used_keys
            && self.rng.clone().gen::<u64>() == other.rng.clone().gen::<u64>()
    }
}

impl Eq for Machine {}
