/*!

A CHIP-8 virtual machine as specified at https://en.wikipedia.org/wiki/CHIP-8.

The core loads a program, runs it on a worker thread at a fixed instruction
rate with the two timers counting down at 60 Hz, and publishes the screen,
the sound timer and the run state to any number of subscribers. It has no
window, keyboard or audio device of its own: a frontend feeds it key events
and renders what it publishes.

# Headless runner

To try the core on a program, run `cargo run --release -- <program>`.
It runs the program for a few seconds and prints the final screen.
Set `RUST_LOG=debug` to see what the worker is doing.

# Library

The main way of running a program is through an `EmulationCore`.

```rust
use chip_8_vm::{Config, EmulationCore, Key};
use std::time::Duration;

let core = EmulationCore::new(Config::default());
let mut frames = core.frames();

// 0x200: I = glyph of V0, draw it at (V0, V0), then wait for a key in V1
let program = EmulationCore::load("demo", &[0xF0, 0x29, 0xD0, 0x05, 0xF1, 0x0A]).unwrap();
core.start(program).unwrap();

let frame = frames.next_timeout(Duration::from_secs(1)).unwrap();
println!("{}", frame);

core.key_down(Key::new(0xA).unwrap()).unwrap();
core.stop().unwrap();
```

Save states are plain values that can only be loaded back into the same program.

```rust
use chip_8_vm::{Config, CoreError, EmulationCore};

let core = EmulationCore::new(Config::default());
core.start(EmulationCore::load("a", &[0x12, 0x00]).unwrap()).unwrap();
let state = core.export_state().unwrap();
core.load_state(state.clone()).unwrap();

core.stop().unwrap();
core.start(EmulationCore::load("b", &[0x12, 0x00, 0xFF]).unwrap()).unwrap();
assert!(matches!(core.load_state(state), Err(CoreError::StateHashMismatch { .. })));
```

## Stepping by hand

A `Machine` can also be driven directly, one instruction at a time, with no threads involved.

```rust
use chip_8_vm::emulator::{Machine, Step};
use chip_8_vm::emulator::instruction::{Instruction, Reg, Const};

let mut machine = Machine::new(&[0x60, 0x05], 0);
assert_eq!(machine.step(), Ok(Step::Executed(Instruction::SetConst(Reg(0), Const(5)))));
assert_eq!(machine.registers().v[0], 5);
assert_eq!(machine.registers().pc, 0x202);
```
*/

pub mod emulator;
pub mod error;
pub mod feed;
pub mod program;
pub mod scheduler;
pub mod snapshot;

pub use emulator::{Fault, Frame, Key};
pub use error::CoreError;
pub use program::{ContentDigest, Program};
pub use scheduler::config::Config;
pub use scheduler::{DebugInfo, EmulationCore, PlayingInfo, RunState};
pub use snapshot::EmulationState;
