use std::fmt;
use std::sync::Arc;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
type Screen = [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT];
const EMPTY_SCREEN: Screen = [[false; SCREEN_WIDTH]; SCREEN_HEIGHT];

/// The live 64x32 monochrome bitmap.
#[derive(Clone, PartialEq, Eq)]
pub struct Display {
    screen: Box<Screen>,
}

impl Display {
    pub fn new() -> Display {
        Display {
            screen: Box::new(EMPTY_SCREEN),
        }
    }

    pub fn clear(&mut self) {
        *self.screen = EMPTY_SCREEN;
    }

    /// The pixel at (`x`, `y`). Coordinates wrap around the screen edges.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.screen[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    /// XOR `sprite` onto the screen with its top left corner at (`x`, `y`).
    /// Each byte is one row of eight pixels, most significant bit leftmost.
    /// Pixels falling off an edge wrap to the opposite one.
    ///
    /// Returns whether any set pixel was turned off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row_offset, &row) in sprite.iter().enumerate() {
            let py = (y + row_offset) % SCREEN_HEIGHT;
            for bit in 0..8 {
                if row >> (7 - bit) & 1 == 0 {
                    continue;
                }
                let px = (x + bit) % SCREEN_WIDTH;
                let pixel = &mut self.screen[py][px];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }
        collision
    }

    /// An immutable copy for publication.
    pub fn snapshot(&self) -> Frame {
        Frame {
            screen: Arc::new(*self.screen),
        }
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lit = self.screen.iter().flatten().filter(|p| **p).count();
        write!(f, "Display {{ lit: {} }}", lit)
    }
}

/// A read-only copy of the display at one point in time.
/// Cloning is cheap, the pixels are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    screen: Arc<Screen>,
}

impl Frame {
    pub fn blank() -> Frame {
        Frame {
            screen: Arc::new(EMPTY_SCREEN),
        }
    }

    /// The pixel at (`x`, `y`), wrapping like `Display::get`.
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.screen[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; SCREEN_WIDTH]> {
        self.screen.iter()
    }

    pub fn lit_pixels(&self) -> usize {
        self.rows().flatten().filter(|p| **p).count()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for pixel in row.iter() {
                write!(f, "{}", if *pixel { "#" } else { " " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame {{ lit: {} }}", self.lit_pixels())
    }
}
