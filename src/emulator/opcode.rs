use std::fmt;

/// A raw two-byte instruction word, with helpers for splitting it
/// into the nibble and address fields used for dispatch.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Opcode(u8, u8);

impl Opcode {
    /// Build an opcode from the two bytes at PC and PC + 1 (big-endian).
    pub fn new(high: u8, low: u8) -> Opcode {
        Opcode(high, low)
    }

    pub fn from_u16(value: u16) -> Opcode {
        Opcode((value >> 8) as u8, (value & 0x00FF) as u8)
    }

    /// Left-shift the high byte 8 bits,
    /// then take bitwise or with the low byte.
    pub fn as_u16(self) -> u16 {
        ((self.0 as u16) << 8) | self.1 as u16
    }

    /// The four nibbles, most significant first.
    pub fn nibbles(self) -> (u8, u8, u8, u8) {
        (self.0 >> 4, self.0 & 0x0F, self.1 >> 4, self.1 & 0x0F)
    }

    /// The second nibble, used as the `X` register index.
    pub fn x(self) -> u8 {
        self.0 & 0x0F
    }

    /// The third nibble, used as the `Y` register index.
    pub fn y(self) -> u8 {
        self.1 >> 4
    }

    /// The lowest nibble.
    pub fn n(self) -> u8 {
        self.1 & 0x0F
    }

    /// The low byte.
    pub fn nn(self) -> u8 {
        self.1
    }

    /// The lowest 12 bits, used as an address.
    pub fn nnn(self) -> u16 {
        self.as_u16() & 0x0FFF
    }
}

impl fmt::Debug for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opcode({:#06x})", self.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_equals_from_u16() {
        assert_eq!(Opcode::new(0x12, 0x34), Opcode::from_u16(0x1234));
        assert_eq!(Opcode::new(0x2F, 0x2F), Opcode::from_u16(0x2F2F));
        assert_eq!(Opcode::new(0xFF, 0x00), Opcode::from_u16(0xFF00));
    }

    #[test]
    fn nibbles_are_split_in_order() {
        assert_eq!((0xA, 0xB, 0xC, 0xD), Opcode::from_u16(0xABCD).nibbles());
        assert_eq!((0x0, 0x0, 0xE, 0xE), Opcode::from_u16(0x00EE).nibbles());
    }

    #[test]
    fn fields() {
        let opcode = Opcode::from_u16(0xD12F);
        assert_eq!(opcode.x(), 0x1);
        assert_eq!(opcode.y(), 0x2);
        assert_eq!(opcode.n(), 0xF);
        assert_eq!(opcode.nn(), 0x2F);
        assert_eq!(opcode.nnn(), 0x12F);
    }
}
