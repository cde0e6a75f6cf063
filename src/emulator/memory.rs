use std::fmt;

use crate::emulator::fault::Fault;

pub const MEM_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
/// The largest program image that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEM_SIZE - PROGRAM_START as usize;
pub const FONT_START: usize = 0;
pub const GLYPH_SIZE: usize = 5;

#[rustfmt::skip]
pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// The flat 4 KiB address space, with the font at the bottom
/// and the program image at `PROGRAM_START`.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: Box<[u8; MEM_SIZE]>,
}

impl Memory {
    /// Memory holding only the font.
    pub fn new() -> Memory {
        let mut bytes = Box::new([0; MEM_SIZE]);
        bytes[FONT_START..FONT_START + FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    /// Zero everything, reload the font and copy `program` to `PROGRAM_START`.
    ///
    /// Bytes past the end of memory are dropped; callers validate the size first.
    pub fn reset(&mut self, program: &[u8]) {
        *self = Memory::new();
        let start = PROGRAM_START as usize;
        let len = program.len().min(MAX_PROGRAM_SIZE);
        self.bytes[start..start + len].copy_from_slice(&program[..len]);
    }

    pub fn read(&self, address: usize) -> Result<u8, Fault> {
        self.bytes
            .get(address)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds { address })
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), Fault> {
        match self.bytes.get_mut(address) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Fault::MemoryOutOfBounds { address }),
        }
    }

    /// Borrow `len` bytes starting at `address`.
    /// Fails on the first address outside memory.
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8], Fault> {
        if len == 0 {
            return Ok(&[]);
        }
        let last = address + len - 1;
        if last >= MEM_SIZE {
            return Err(Fault::MemoryOutOfBounds {
                address: address.max(MEM_SIZE),
            });
        }
        Ok(&self.bytes[address..=last])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.bytes.iter().filter(|b| **b != 0).count();
        write!(f, "Memory {{ size: {}, non_zero: {} }}", MEM_SIZE, used)
    }
}
