use std::fmt;

/// One of the sixteen hex keys, `0x0..=0xF`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u8);

impl Key {
    /// The 4x4 pad as it is usually drawn.
    pub const STANDARD_LAYOUT: [[Key; 4]; 4] = [
        [Key(0x1), Key(0x2), Key(0x3), Key(0xC)],
        [Key(0x4), Key(0x5), Key(0x6), Key(0xD)],
        [Key(0x7), Key(0x8), Key(0x9), Key(0xE)],
        [Key(0xA), Key(0x0), Key(0xB), Key(0xF)],
    ];

    /// Keyboard characters in the same positions as `STANDARD_LAYOUT`.
    const KEYBOARD_LAYOUT: [[char; 4]; 4] = [
        ['1', '2', '3', '4'],
        ['q', 'w', 'e', 'r'],
        ['a', 's', 'd', 'f'],
        ['z', 'x', 'c', 'v'],
    ];

    pub fn new(code: u8) -> Option<Key> {
        if code <= 0xF {
            Some(Key(code))
        } else {
            None
        }
    }

    pub fn code(self) -> u8 {
        self.0
    }

    /// Every key in code order.
    pub fn all() -> impl Iterator<Item = Key> {
        (0..=0xF).map(Key)
    }

    /// The hex digit printed on the key.
    pub fn label(self) -> char {
        std::char::from_digit(self.0 as u32, 16)
            .unwrap_or('?')
            .to_ascii_uppercase()
    }

    /// Map a character from the standard QWERTY binding to a key.
    pub fn from_keyboard(c: char) -> Option<Key> {
        let c = c.to_ascii_lowercase();
        Self::position(|row, col| Self::KEYBOARD_LAYOUT[row][col] == c)
            .map(|(row, col)| Self::STANDARD_LAYOUT[row][col])
    }

    /// The character bound to this key in the standard QWERTY binding.
    pub fn keyboard_char(self) -> char {
        Self::position(|row, col| Self::STANDARD_LAYOUT[row][col] == self)
            .map(|(row, col)| Self::KEYBOARD_LAYOUT[row][col])
            .unwrap_or('?')
    }

    fn position(matches: impl Fn(usize, usize) -> bool) -> Option<(usize, usize)> {
        (0..4)
            .flat_map(|row| (0..4).map(move |col| (row, col)))
            .find(|&(row, col)| matches(row, col))
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.label())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Pressed keys plus the latch armed by `FX0A`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    pressed: u16,
    awaiting: Option<u8>,
}

impl Keypad {
    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed & (1 << key.0) != 0
    }

    pub fn pressed(&self) -> Vec<Key> {
        Key::all().filter(|key| self.is_pressed(*key)).collect()
    }

    /// Mark `key` as held. If a key-wait is pending, resolve it and
    /// return the register that should receive the key code.
    pub fn key_down(&mut self, key: Key) -> Option<u8> {
        self.pressed |= 1 << key.0;
        self.awaiting.take()
    }

    pub fn key_up(&mut self, key: Key) {
        self.pressed &= !(1 << key.0);
    }

    /// Arm the latch so the next key press lands in `register`.
    pub fn await_key(&mut self, register: u8) {
        self.awaiting = Some(register);
    }

    /// The register waiting for a key press, if any.
    pub fn awaiting(&self) -> Option<u8> {
        self.awaiting
    }
}
