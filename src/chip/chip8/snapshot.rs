use std::collections::BTreeSet;

use log::debug;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::chip::{
    chip8::{
        constants::{
            CHIP8_DEBUG_WINDOW_AFTER, CHIP8_DEBUG_WINDOW_BEFORE, CHIP8_DISPLAY_SIZE,
            CHIP8_KEY_COUNT, CHIP8_MEMORY_SIZE, CHIP8_REGISTER_COUNT, CHIP8_SNAPSHOT_MAGIC,
            CHIP8_SNAPSHOT_VERSION, CHIP8_STACK_DEPTH,
        },
        disassemble, util, Chip8, Framebuffer, KeyWaitQuirk, Quirks, ShiftQuirk,
    },
    SnapshotError,
};

/// Marks an empty key latch in the save state.
const NO_KEY: u8 = 0xFF;

/// A copy of the machine state for display in a debugger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugSnapshot {
    pub program_counter: u16,
    pub index: u16,
    pub stack_pointer: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub registers: [u8; CHIP8_REGISTER_COUNT],
    pub stack: [u16; CHIP8_STACK_DEPTH],
    pub breakpoints: Vec<u16>,
    pub running: bool,
    /// The instructions around the program counter, in address order.
    pub disassembly: Vec<DisassemblyLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisassemblyLine {
    pub address: u16,
    pub opcode: u16,
    pub mnemonic: String,
    pub current: bool,
    pub breakpoint: bool,
}

impl Chip8 {
    /// Copies registers, stack, timers and breakpoints and disassembles the
    /// instructions around the program counter.
    pub fn debug_snapshot(&self) -> DebugSnapshot {
        // The address the next fetch reads from.
        let pc = util::memory_address(self.program_counter) as u16;
        let last_address = (CHIP8_MEMORY_SIZE - 1) as u16;
        let first = pc - pc.min(CHIP8_DEBUG_WINDOW_BEFORE * 2) / 2 * 2;
        let last = (pc + (CHIP8_DEBUG_WINDOW_AFTER - 1) * 2).min(last_address);

        let disassembly = (first..=last)
            .step_by(2)
            .map(|address| {
                let opcode = u16::from_be_bytes([
                    self.memory[address as usize],
                    self.memory[util::memory_address(address + 1)],
                ]);
                DisassemblyLine {
                    address,
                    opcode,
                    mnemonic: disassemble(opcode),
                    current: address == pc,
                    breakpoint: self.breakpoints.contains(&address),
                }
            })
            .collect();

        DebugSnapshot {
            program_counter: self.program_counter,
            index: self.index,
            stack_pointer: self.stack_pointer,
            delay_timer: self.delay_timer,
            sound_timer: self.sound_timer,
            registers: self.registers,
            stack: self.stack,
            breakpoints: self.breakpoints.iter().copied().collect(),
            running: self.running,
            disassembly,
        }
    }

    /// Encodes the complete machine state. The layout is big-endian:
    ///
    /// | field | size |
    /// |---|---|
    /// | magic `C8VM`, version | 4, 1 |
    /// | memory, registers | 4096, 16 |
    /// | I, pc | 2, 2 |
    /// | stack, sp | 16 * 2, 1 |
    /// | delay timer, sound timer | 1, 1 |
    /// | framebuffer, changed flag | 2048, 1 |
    /// | keys | 16 |
    /// | breakpoint count, breakpoints | 4, count * 2 |
    /// | running, breakpoint skip, key latch (0xFF for none) | 1, 1, 1 |
    /// | shift quirk, key wait quirk, index increment quirk | 1, 1, 1 |
    ///
    /// The state of the random number generator is not part of the encoding.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(fixed_len() + self.breakpoints.len() * 2);

        out.extend_from_slice(&CHIP8_SNAPSHOT_MAGIC);
        out.push(CHIP8_SNAPSHOT_VERSION);
        out.extend_from_slice(&self.memory);
        out.extend_from_slice(&self.registers);
        out.extend_from_slice(&self.index.to_be_bytes());
        out.extend_from_slice(&self.program_counter.to_be_bytes());
        for address in self.stack.iter() {
            out.extend_from_slice(&address.to_be_bytes());
        }
        out.push(self.stack_pointer);
        out.push(self.delay_timer);
        out.push(self.sound_timer);
        out.extend_from_slice(self.framebuffer.pixels());
        out.push(self.framebuffer.changed() as u8);
        out.extend(self.input_pins.iter().map(|&pin| pin as u8));
        out.extend_from_slice(&(self.breakpoints.len() as u32).to_be_bytes());
        for address in self.breakpoints.iter() {
            out.extend_from_slice(&address.to_be_bytes());
        }
        out.push(self.running as u8);
        out.push(self.skip_breakpoint as u8);
        out.push(self.key_latch.unwrap_or(NO_KEY));
        out.push(self.quirks.shift.to_tag());
        out.push(self.quirks.key_wait.to_tag());
        out.push(self.quirks.load_store_increments_index as u8);

        out
    }

    /// Decodes a machine from the output of [`Chip8::serialize`]. The input
    /// is fully validated; the returned machine gets a freshly seeded random
    /// number generator.
    pub fn deserialize(bytes: &[u8]) -> Result<Chip8, SnapshotError> {
        let mut reader = Reader { bytes, position: 0 };

        if reader.take(CHIP8_SNAPSHOT_MAGIC.len())? != CHIP8_SNAPSHOT_MAGIC {
            return Err(SnapshotError::BadMagic);
        }
        let version = reader.u8()?;
        if version != CHIP8_SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(version));
        }

        let memory = reader.array::<CHIP8_MEMORY_SIZE>()?;
        let registers = reader.array::<CHIP8_REGISTER_COUNT>()?;
        let index = reader.u16()?;
        let program_counter = reader.u16()?;
        let mut stack = [0u16; CHIP8_STACK_DEPTH];
        for slot in stack.iter_mut() {
            *slot = reader.u16()?;
        }
        let stack_pointer = reader.u8()?;
        if stack_pointer as usize > CHIP8_STACK_DEPTH {
            return Err(invalid("stack_pointer", stack_pointer));
        }
        let delay_timer = reader.u8()?;
        let sound_timer = reader.u8()?;

        let pixels = reader.array::<CHIP8_DISPLAY_SIZE>()?;
        if let Some(&pixel) = pixels.iter().find(|&&pixel| pixel > 1) {
            return Err(invalid("framebuffer", pixel));
        }
        let changed = reader.flag("changed")?;

        let mut input_pins = [false; CHIP8_KEY_COUNT];
        for pin in input_pins.iter_mut() {
            *pin = reader.flag("keys")?;
        }

        let breakpoint_count = reader.u32()?;
        if breakpoint_count > 1 << 16 {
            return Err(SnapshotError::InvalidField {
                field: "breakpoint_count",
                value: breakpoint_count,
            });
        }
        let mut breakpoints = BTreeSet::new();
        for _ in 0..breakpoint_count {
            breakpoints.insert(reader.u16()?);
        }

        let running = reader.flag("running")?;
        let skip_breakpoint = reader.flag("skip_breakpoint")?;
        let key_latch = match reader.u8()? {
            NO_KEY => None,
            key if (key as usize) < CHIP8_KEY_COUNT => Some(key),
            key => return Err(invalid("key_latch", key)),
        };

        let shift_tag = reader.u8()?;
        let shift = ShiftQuirk::from_tag(shift_tag).ok_or_else(|| invalid("shift_quirk", shift_tag))?;
        let key_wait_tag = reader.u8()?;
        let key_wait =
            KeyWaitQuirk::from_tag(key_wait_tag).ok_or_else(|| invalid("key_wait_quirk", key_wait_tag))?;
        let load_store_increments_index = reader.flag("load_store_increments_index")?;

        let trailing = reader.remaining();
        if trailing > 0 {
            return Err(SnapshotError::TrailingBytes(trailing));
        }

        Ok(Chip8 {
            memory,
            registers,
            index,
            program_counter,
            stack,
            stack_pointer,
            delay_timer,
            sound_timer,
            framebuffer: Framebuffer::from_parts(pixels, changed),
            input_pins,
            breakpoints,
            running,
            skip_breakpoint,
            key_latch,
            quirks: Quirks {
                shift,
                key_wait,
                load_store_increments_index,
            },
            rng: StdRng::from_entropy(),
        })
    }

    /// Replaces this machine with the one encoded in `bytes`. On error the
    /// machine is left untouched.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        *self = Chip8::deserialize(bytes)?;
        debug!("Loaded state [size: {}]", bytes.len());
        Ok(())
    }
}

/// Length of an encoding without breakpoints.
fn fixed_len() -> usize {
    CHIP8_SNAPSHOT_MAGIC.len()
        + 1
        + CHIP8_MEMORY_SIZE
        + CHIP8_REGISTER_COUNT
        + 2
        + 2
        + CHIP8_STACK_DEPTH * 2
        + 3
        + CHIP8_DISPLAY_SIZE
        + 1
        + CHIP8_KEY_COUNT
        + 4
        + 6
}

fn invalid(field: &'static str, value: u8) -> SnapshotError {
    SnapshotError::InvalidField {
        field,
        value: value as u32,
    }
}

/// Reads fields front to back and reports truncation against the full input.
struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self.position + len;
        let slice = self.bytes.get(self.position..end).ok_or(SnapshotError::Truncated {
            expected: end,
            actual: self.bytes.len(),
        })?;
        self.position = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let slice = self.take(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(slice);
        Ok(array)
    }

    fn u8(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, SnapshotError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, SnapshotError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn flag(&mut self, field: &'static str) -> Result<bool, SnapshotError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(invalid(field, value)),
        }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }
}
