//! The virtual computer: memory, registers, timers, keypad, display and the
//! instruction executor that ties them together.

pub mod display;
pub mod fault;
pub mod instruction;
pub mod keypad;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod registers;
pub mod timers;

pub use display::Frame;
pub use fault::Fault;
pub use keypad::Key;
pub use machine::{Machine, Step};
