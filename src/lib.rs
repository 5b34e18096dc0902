//! A CHIP-8 virtual machine core. The implementation follows the instruction set
//! described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table).
//!
//! The core never performs I/O and never owns a clock. A host drives it by calling
//! [`Chip8::cycle`](chip::chip8::Chip8::cycle) at its chosen clock rate and
//! [`Chip8::tick`](chip::chip8::Chip8::tick) at 60 Hz, copying out the framebuffer
//! whenever it changed. Hosts that touch the machine from more than one thread
//! route their calls through a [`Session`](chip::session::Session).
pub mod chip;

pub use chip::chip8::{disassemble, Chip8, CycleOutcome, DebugSnapshot, Frame, Quirks};
pub use chip::{Chip, LoadRomError, SnapshotError};
