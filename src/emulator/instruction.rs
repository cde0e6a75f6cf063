use crate::emulator::opcode::Opcode;

/// A wrapper for addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr(pub u16);

/// A wrapper for register indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reg(pub u8);

/// A wrapper for constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const(pub u8);

/// A single instruction from the CHIP-8 instruction set.
/// Two bytes written in hexadecimal, with the following special characters:
/// - NNN: address
/// - NN: 8-bit constant
/// - N: 4-bit constant
/// - X and Y: 4-bit register identifier
/// - PC: Program counter
/// - I: 16 bit register for memory address
/// - VN: One of the 16 available variables (register identifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    ClearScreen,                // 00E0
    Return,                     // 00EE
    Jump(Addr),                 // 1NNN
    Call(Addr),                 // 2NNN
    SkipIfEqConst(Reg, Const),  // 3XNN
    SkipIfNeqConst(Reg, Const), // 4XNN
    SkipIfEqReg(Reg, Reg),      // 5XY0
    SetConst(Reg, Const),       // 6XNN
    AddConst(Reg, Const),       // 7XNN
    Move(Reg, Reg),             // 8XY0
    Or(Reg, Reg),               // 8XY1
    And(Reg, Reg),              // 8XY2
    Xor(Reg, Reg),              // 8XY3
    AddReg(Reg, Reg),           // 8XY4
    SubReg(Reg, Reg),           // 8XY5
    ShiftRight(Reg),            // 8XY6
    SubFromReg(Reg, Reg),       // 8XY7
    ShiftLeft(Reg),             // 8XYE
    SkipIfNeqReg(Reg, Reg),     // 9XY0
    SetIndex(Addr),             // ANNN
    JumpOffset(Addr),           // BNNN
    Random(Reg, Const),         // CXNN
    Draw(Reg, Reg, Const),      // DXYN
    SkipIfKey(Reg),             // EX9E
    SkipIfNotKey(Reg),          // EXA1
    GetDelayTimer(Reg),         // FX07
    WaitForKey(Reg),            // FX0A
    SetDelayTimer(Reg),         // FX15
    SetSoundTimer(Reg),         // FX18
    AddToIndex(Reg),            // FX1E
    SetIndexToGlyph(Reg),       // FX29
    StoreBcd(Reg),              // FX33
    RegDump(Reg),               // FX55
    RegLoad(Reg),               // FX65
}

impl Instruction {
    /// Decode a raw opcode, or `None` if it is not part of the instruction set.
    pub fn decode(opcode: Opcode) -> Option<Instruction> {
        let x = Reg(opcode.x());
        let y = Reg(opcode.y());
        let instruction = match opcode.nibbles() {
            (0, 0, 0xE, 0) => Instruction::ClearScreen,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (1, _, _, _) => Instruction::Jump(Addr(opcode.nnn())),
            (2, _, _, _) => Instruction::Call(Addr(opcode.nnn())),
            (3, _, _, _) => Instruction::SkipIfEqConst(x, Const(opcode.nn())),
            (4, _, _, _) => Instruction::SkipIfNeqConst(x, Const(opcode.nn())),
            (5, _, _, 0) => Instruction::SkipIfEqReg(x, y),
            (6, _, _, _) => Instruction::SetConst(x, Const(opcode.nn())),
            (7, _, _, _) => Instruction::AddConst(x, Const(opcode.nn())),
            (8, _, _, 0) => Instruction::Move(x, y),
            (8, _, _, 1) => Instruction::Or(x, y),
            (8, _, _, 2) => Instruction::And(x, y),
            (8, _, _, 3) => Instruction::Xor(x, y),
            (8, _, _, 4) => Instruction::AddReg(x, y),
            (8, _, _, 5) => Instruction::SubReg(x, y),
            (8, _, _, 6) => Instruction::ShiftRight(x),
            (8, _, _, 7) => Instruction::SubFromReg(x, y),
            (8, _, _, 0xE) => Instruction::ShiftLeft(x),
            (9, _, _, 0) => Instruction::SkipIfNeqReg(x, y),
            (0xA, _, _, _) => Instruction::SetIndex(Addr(opcode.nnn())),
            (0xB, _, _, _) => Instruction::JumpOffset(Addr(opcode.nnn())),
            (0xC, _, _, _) => Instruction::Random(x, Const(opcode.nn())),
            (0xD, _, _, n) => Instruction::Draw(x, y, Const(n)),
            (0xE, _, 9, 0xE) => Instruction::SkipIfKey(x),
            (0xE, _, 0xA, 1) => Instruction::SkipIfNotKey(x),
            (0xF, _, 0, 7) => Instruction::GetDelayTimer(x),
            (0xF, _, 0, 0xA) => Instruction::WaitForKey(x),
            (0xF, _, 1, 5) => Instruction::SetDelayTimer(x),
            (0xF, _, 1, 8) => Instruction::SetSoundTimer(x),
            (0xF, _, 1, 0xE) => Instruction::AddToIndex(x),
            (0xF, _, 2, 9) => Instruction::SetIndexToGlyph(x),
            (0xF, _, 3, 3) => Instruction::StoreBcd(x),
            (0xF, _, 5, 5) => Instruction::RegDump(x),
            (0xF, _, 6, 5) => Instruction::RegLoad(x),
            _ => return None,
        };
        Some(instruction)
    }

    pub fn from_u16(value: u16) -> Option<Instruction> {
        Instruction::decode(Opcode::from_u16(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0x00E0, Instruction::ClearScreen ; "clear screen")]
    #[test_case(0x00EE, Instruction::Return ; "return")]
    #[test_case(0x1025, Instruction::Jump(Addr(0x25)) ; "jump")]
    #[test_case(0x2037, Instruction::Call(Addr(0x37)) ; "call")]
    #[test_case(0x3A08, Instruction::SkipIfEqConst(Reg(0xA), Const(8)) ; "skip if eq const")]
    #[test_case(0x4A08, Instruction::SkipIfNeqConst(Reg(0xA), Const(8)) ; "skip if neq const")]
    #[test_case(0x5AB0, Instruction::SkipIfEqReg(Reg(0xA), Reg(0xB)) ; "skip if eq reg")]
    #[test_case(0x6B23, Instruction::SetConst(Reg(0xB), Const(0x23)) ; "set const")]
    #[test_case(0x7CA1, Instruction::AddConst(Reg(0xC), Const(0xA1)) ; "add const")]
    #[test_case(0x8AB0, Instruction::Move(Reg(0xA), Reg(0xB)) ; "move")]
    #[test_case(0x8DE1, Instruction::Or(Reg(0xD), Reg(0xE)) ; "or")]
    #[test_case(0x8DE2, Instruction::And(Reg(0xD), Reg(0xE)) ; "and")]
    #[test_case(0x8DE3, Instruction::Xor(Reg(0xD), Reg(0xE)) ; "xor")]
    #[test_case(0x8AB4, Instruction::AddReg(Reg(0xA), Reg(0xB)) ; "add reg")]
    #[test_case(0x8AB5, Instruction::SubReg(Reg(0xA), Reg(0xB)) ; "sub reg")]
    #[test_case(0x8AB6, Instruction::ShiftRight(Reg(0xA)) ; "shift right")]
    #[test_case(0x8AB7, Instruction::SubFromReg(Reg(0xA), Reg(0xB)) ; "sub from reg")]
    #[test_case(0x8A0E, Instruction::ShiftLeft(Reg(0xA)) ; "shift left")]
    #[test_case(0x9AB0, Instruction::SkipIfNeqReg(Reg(0xA), Reg(0xB)) ; "skip if neq reg")]
    #[test_case(0xA025, Instruction::SetIndex(Addr(0x25)) ; "set index")]
    #[test_case(0xB025, Instruction::JumpOffset(Addr(0x25)) ; "jump offset")]
    #[test_case(0xCA23, Instruction::Random(Reg(0xA), Const(0x23)) ; "random")]
    #[test_case(0xDABC, Instruction::Draw(Reg(0xA), Reg(0xB), Const(0xC)) ; "draw")]
    #[test_case(0xEA9E, Instruction::SkipIfKey(Reg(0xA)) ; "skip if key")]
    #[test_case(0xEAA1, Instruction::SkipIfNotKey(Reg(0xA)) ; "skip if not key")]
    #[test_case(0xFA07, Instruction::GetDelayTimer(Reg(0xA)) ; "get delay timer")]
    #[test_case(0xFA0A, Instruction::WaitForKey(Reg(0xA)) ; "wait for key")]
    #[test_case(0xFA15, Instruction::SetDelayTimer(Reg(0xA)) ; "set delay timer")]
    #[test_case(0xFA18, Instruction::SetSoundTimer(Reg(0xA)) ; "set sound timer")]
    #[test_case(0xFA1E, Instruction::AddToIndex(Reg(0xA)) ; "add to index")]
    #[test_case(0xFA29, Instruction::SetIndexToGlyph(Reg(0xA)) ; "glyph")]
    #[test_case(0xFA33, Instruction::StoreBcd(Reg(0xA)) ; "bcd")]
    #[test_case(0xFA55, Instruction::RegDump(Reg(0xA)) ; "reg dump")]
    #[test_case(0xFA65, Instruction::RegLoad(Reg(0xA)) ; "reg load")]
    fn opcodes_are_parsed_correctly(opcode: u16, expected: Instruction) {
        assert_eq!(Instruction::from_u16(opcode), Some(expected));
    }

    #[test_case(0x0000 ; "machine call zero")]
    #[test_case(0x0123 ; "machine call")]
    #[test_case(0x5AB1 ; "skip with trailing nibble")]
    #[test_case(0x8AB8 ; "unknown alu op")]
    #[test_case(0x9AB1 ; "neq with trailing nibble")]
    #[test_case(0xEA9F ; "unknown key op")]
    #[test_case(0xFA99 ; "unknown misc op")]
    fn unknown_opcodes_are_rejected(opcode: u16) {
        assert_eq!(Instruction::from_u16(opcode), None);
    }
}
