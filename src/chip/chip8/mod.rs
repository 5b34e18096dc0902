/// CHIP-8 constants.
pub mod constants;
/// Terminal rendering of the display.
pub mod cursive_display;
/// The 64x32 display.
pub mod framebuffer;
/// Decoding of opcodes, their execution and disassembly.
mod opcodes;
/// Configurable behavioral variations.
pub mod quirks;
/// Save states and debug snapshots.
mod snapshot;
/// Convenience functions for modification of the CHIP-8 state.
mod util;

#[cfg(test)]
mod tests;

use std::collections::BTreeSet;

use log::{debug, error, info, trace, warn};
use rand::{rngs::StdRng, SeedableRng};

use crate::chip::{
    chip8::constants::{
        CHIP8_CHARSET, CHIP8_CHARSET_LEN, CHIP8_CHARSET_OFFSET, CHIP8_KEY_COUNT,
        CHIP8_MAX_PROGRAM_SIZE, CHIP8_MEMORY_SIZE, CHIP8_PROGRAM_START, CHIP8_REGISTER_COUNT,
        CHIP8_STACK_DEPTH,
    },
    chip8::opcodes::{Flow, Opcode},
    Chip, LoadRomError,
};

pub use framebuffer::{Frame, Framebuffer};
pub use opcodes::{disassemble::disassemble, Instruction};
pub use quirks::{KeyWaitQuirk, Quirks, ShiftQuirk};
pub use snapshot::{DebugSnapshot, DisassemblyLine};

/// Represents the state of the CHIP-8.
///
/// A machine starts out halted. Loading a program marks it as running, after
/// which every call to [`Chip8::cycle`] executes one instruction. The host is
/// expected to call [`Chip8::tick`] at 60 Hz independently of the clock rate.
#[derive(Clone, Debug)]
pub struct Chip8 {
    /// 4096 bytes of main memory
    memory: [u8; CHIP8_MEMORY_SIZE],

    /// 16 registers where each can store one byte. VF doubles as the flag
    /// register of several instructions.
    registers: [u8; CHIP8_REGISTER_COUNT],

    /// The index register I
    index: u16,

    /// The program counter. It is not checked on write, fetches wrap into memory.
    program_counter: u16,

    /// Return addresses of the active subroutine calls.
    stack: [u16; CHIP8_STACK_DEPTH],

    /// The number of used stack slots, between 0 and 16.
    stack_pointer: u8,

    /// Decremented by `tick` while above zero.
    delay_timer: u8,

    /// Decremented by `tick` while above zero. A tone plays while it is above zero.
    sound_timer: u8,

    framebuffer: Framebuffer,

    /// The input pins. One per key of the hexadecimal keypad.
    input_pins: [bool; CHIP8_KEY_COUNT],

    /// Addresses at which execution halts before running the instruction there.
    breakpoints: BTreeSet<u16>,

    /// Whether `cycle` executes instructions.
    running: bool,

    /// Set by `resume` so the instruction under a breakpoint runs once
    /// instead of halting again.
    skip_breakpoint: bool,

    /// The key seen held down by a `Fx0A` waiting for its release.
    key_latch: Option<u8>,

    quirks: Quirks,

    rng: StdRng,
}

/// Reports what a single call to [`Chip8::cycle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The machine is halted, nothing happened.
    Halted,
    /// Execution halted before the instruction at the given address.
    Breakpoint(u16),
    /// The instruction ran.
    Executed(Instruction),
    /// `Fx0A` found no entered key and will run again.
    WaitingForKey,
    /// The fetched opcode has no meaning. It was skipped, execution continues.
    UnknownOpcode { address: u16, opcode: u16 },
    /// A call at the given address found the stack full. The machine halted
    /// with the program counter on the call.
    StackOverflow(u16),
    /// A return at the given address found the stack empty. The machine
    /// halted with the program counter on the return.
    StackUnderflow(u16),
}

impl Chip8 {
    /// Constructs a new, halted CHIP-8 with default quirks and a random
    /// number generator seeded from OS entropy. Note that no program is
    /// loaded upon initialization.
    pub fn new() -> Self {
        Chip8::with_rng(Quirks::default(), StdRng::from_entropy())
    }

    /// Constructs a new CHIP-8 whose random number generator is seeded with
    /// `seed`, so that `Cxnn` produces a reproducible sequence.
    pub fn with_seed(seed: u64) -> Self {
        Chip8::with_quirks(Quirks::default(), seed)
    }

    pub fn with_quirks(quirks: Quirks, seed: u64) -> Self {
        Chip8::with_rng(quirks, StdRng::seed_from_u64(seed))
    }

    fn with_rng(quirks: Quirks, rng: StdRng) -> Self {
        let mut memory = [0; CHIP8_MEMORY_SIZE];
        install_charset(&mut memory);

        Chip8 {
            memory,
            registers: [0; CHIP8_REGISTER_COUNT],
            index: 0,
            program_counter: CHIP8_PROGRAM_START,
            stack: [0; CHIP8_STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(),
            input_pins: [false; CHIP8_KEY_COUNT],
            breakpoints: BTreeSet::new(),
            running: false,
            skip_breakpoint: false,
            key_latch: None,
            quirks,
            rng,
        }
    }

    /// Clears memory, registers, stack, timers, display and keys, reinstalls
    /// the charset, reseeds the random number generator and halts the
    /// machine. Breakpoints and quirks survive a reset.
    pub fn reset(&mut self) {
        let breakpoints = std::mem::take(&mut self.breakpoints);
        *self = Chip8::with_rng(self.quirks, StdRng::from_entropy());
        self.breakpoints = breakpoints;
        debug!("Reset");
    }

    /// Copies `rom` into program memory starting at 0x200 and marks the
    /// machine as running. Program memory not covered by `rom` is zeroed.
    ///
    /// A program larger than the program memory is rejected without
    /// modifying the machine.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadRomError> {
        if rom.len() > CHIP8_MAX_PROGRAM_SIZE {
            return Err(LoadRomError::RomTooLarge(rom.len()));
        }

        let start = CHIP8_PROGRAM_START as usize;
        self.memory[start..].iter_mut().for_each(|byte| *byte = 0);
        self.memory[start..start + rom.len()].copy_from_slice(rom);
        self.program_counter = CHIP8_PROGRAM_START;
        self.key_latch = None;
        self.skip_breakpoint = false;
        self.running = true;

        debug!("Loaded ROM [size: {}]", rom.len());
        Ok(())
    }

    /// Executes a single instruction.
    ///
    /// Does nothing while the machine is halted. If the program counter sits
    /// on a breakpoint the machine halts before the instruction runs. The
    /// program counter is advanced before the instruction executes, so jumps
    /// and skips work relative to the following instruction.
    pub fn cycle(&mut self) -> CycleOutcome {
        if !self.running {
            return CycleOutcome::Halted;
        }

        let address = self.program_counter;
        if !std::mem::take(&mut self.skip_breakpoint) && self.breakpoints.contains(&address) {
            self.running = false;
            info!("Breakpoint hit [address: {:#05X}]", address);
            return CycleOutcome::Breakpoint(address);
        }

        let opcode = self.next_instruction();
        let instruction = opcode.decode();
        trace!("Executing [address: {:#05X}] [opcode: {:04X}]", address, opcode.word());

        util::increment_program_counter(self);
        match instruction.execute(self) {
            Flow::Continue => CycleOutcome::Executed(instruction),
            Flow::WaitingForKey => CycleOutcome::WaitingForKey,
            Flow::Unknown => {
                warn!("Unknown opcode [address: {:#05X}] [opcode: {:04X}]", address, opcode.word());
                CycleOutcome::UnknownOpcode {
                    address,
                    opcode: opcode.word(),
                }
            }
            Flow::StackOverflow => {
                self.fault(address);
                error!("Stack overflow [address: {:#05X}]", address);
                CycleOutcome::StackOverflow(address)
            }
            Flow::StackUnderflow => {
                self.fault(address);
                error!("Stack underflow [address: {:#05X}]", address);
                CycleOutcome::StackUnderflow(address)
            }
        }
    }

    /// Halts the machine with the program counter back on the faulting
    /// instruction.
    fn fault(&mut self, address: u16) {
        self.program_counter = address;
        self.running = false;
    }

    /// Decrements both timers by one if they are above zero. Runs regardless
    /// of whether the machine is halted.
    pub fn tick(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Fetches the big-endian instruction at the program counter. Both bytes
    /// wrap into memory.
    fn next_instruction(&self) -> Opcode {
        Opcode::new(&[
            self.memory[util::memory_address(self.program_counter)],
            self.memory[util::memory_address(self.program_counter.wrapping_add(1))],
        ])
    }

    /// Marks `key` as held down. Keys past 0xF are ignored.
    pub fn key_down(&mut self, key: u8) {
        if let Some(pin) = self.input_pins.get_mut(key as usize) {
            *pin = true;
        }
    }

    /// Marks `key` as released. Keys past 0xF are ignored.
    pub fn key_up(&mut self, key: u8) {
        if let Some(pin) = self.input_pins.get_mut(key as usize) {
            *pin = false;
        }
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.input_pins.get(key as usize).copied().unwrap_or(false)
    }

    pub fn set_breakpoint(&mut self, address: u16) {
        if self.breakpoints.insert(address) {
            debug!("Breakpoint set [address: {:#05X}]", address);
        }
    }

    pub fn clear_breakpoint(&mut self, address: u16) {
        if self.breakpoints.remove(&address) {
            debug!("Breakpoint cleared [address: {:#05X}]", address);
        }
    }

    pub fn breakpoints(&self) -> &BTreeSet<u16> {
        &self.breakpoints
    }

    /// Halts execution. The machine keeps its state and continues where it
    /// stopped after [`Chip8::resume`].
    pub fn pause(&mut self) {
        if self.running {
            self.running = false;
            info!("Paused [address: {:#05X}]", self.program_counter);
        }
    }

    /// Continues a halted machine. If it halted on a breakpoint, the
    /// instruction under the breakpoint runs on the next cycle.
    pub fn resume(&mut self) {
        if !self.running {
            self.running = true;
            self.skip_breakpoint = true;
            info!("Resumed [address: {:#05X}]", self.program_counter);
        }
    }

    /// Halts execution without the intent to resume, e.g. when the host
    /// unloads the program.
    pub fn hard_stop(&mut self) {
        self.running = false;
        self.skip_breakpoint = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Returns a copy of the display and clears its changed flag if it
    /// changed since the last call.
    pub fn take_changed_framebuffer(&mut self) -> Option<Frame> {
        if !self.framebuffer.changed() {
            return None;
        }
        self.framebuffer.clear_changed();
        Some(self.framebuffer.snapshot())
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Whether the sound timer is active.
    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn registers(&self) -> &[u8; CHIP8_REGISTER_COUNT] {
        &self.registers
    }

    pub fn memory(&self) -> &[u8; CHIP8_MEMORY_SIZE] {
        &self.memory
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Chip8::new()
    }
}

/// Compares all observable state. The random number generator is left out.
impl PartialEq for Chip8 {
    fn eq(&self, other: &Self) -> bool {
        self.memory[..] == other.memory[..]
            && self.registers == other.registers
            && self.index == other.index
            && self.program_counter == other.program_counter
            && self.stack == other.stack
            && self.stack_pointer == other.stack_pointer
            && self.delay_timer == other.delay_timer
            && self.sound_timer == other.sound_timer
            && self.framebuffer == other.framebuffer
            && self.input_pins == other.input_pins
            && self.breakpoints == other.breakpoints
            && self.running == other.running
            && self.skip_breakpoint == other.skip_breakpoint
            && self.key_latch == other.key_latch
            && self.quirks == other.quirks
    }
}

impl Chip for Chip8 {
    /// The CHIP-8's pins can actually be addressed by using just half a byte.
    /// However, we use a whole byte here and ignore values outside the valid
    /// range, because hosts may forward arbitrary key codes.
    type PinAddress = u8;

    type Frame = Frame;

    type Outcome = CycleOutcome;

    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadRomError> {
        Chip8::load_rom(self, rom)
    }

    fn cycle(&mut self) -> CycleOutcome {
        Chip8::cycle(self)
    }

    fn tick(&mut self) {
        Chip8::tick(self)
    }

    fn set_input_pin(&mut self, pin: u8, value: bool) {
        if value {
            self.key_down(pin);
        } else {
            self.key_up(pin);
        }
    }

    fn reset_input_pins(&mut self) {
        self.input_pins = [false; CHIP8_KEY_COUNT];
    }

    fn take_changed_frame(&mut self) -> Option<Frame> {
        self.take_changed_framebuffer()
    }

    fn sound_active(&self) -> bool {
        Chip8::sound_active(self)
    }
}

fn install_charset(memory: &mut [u8; CHIP8_MEMORY_SIZE]) {
    let start = CHIP8_CHARSET_OFFSET as usize;
    memory[start..start + CHIP8_CHARSET_LEN as usize].copy_from_slice(&CHIP8_CHARSET);
}
