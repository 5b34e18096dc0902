mod arithmetic_and_logic;
pub mod disassemble;
mod memory;
mod program_flow;
mod system;

use crate::chip::chip8::Chip8;

/// Represents a Chip 8 opcode. A Chip 8 opcode is two bytes long and stored
/// big-endian in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    /// The instruction class is the most significant nibble of the opcode.
    /// Note that we use a u8 to represent the instruction class here for
    /// convenience, but ensure that a valid opcode can only be constructed
    /// if the four most significant bits of the u8 are 0.
    instruction_class: u8,
    /// The payload constitutes the remaining nibbles of the opcode.
    payload: OpcodePayload,
}

/// Represents the payload of a Chip 8 opcode. That is the opcode without
/// the most significant nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpcodePayload {
    /// The nibbles representing the payload. Each u8 only ever holds a
    /// value in range 0x0 - 0xF (inclusive).
    bytes: [u8; 3],
}

impl OpcodePayload {
    /// The payload as an address in range 0x000 - 0xFFF (inclusive), `nnn`.
    fn address(&self) -> u16 {
        (self.bytes[0] as u16) << 8 | (self.bytes[1] as u16) << 4 | self.bytes[2] as u16
    }

    /// The first nibble as a register and the low byte as a value, `(x, nn)`.
    fn reg_and_value(&self) -> (u8, u8) {
        (self.bytes[0], (self.bytes[1] << 4) | self.bytes[2])
    }

    /// The payload as three one-nibble operands, `(x, y, n)`.
    fn operands(&self) -> (u8, u8, u8) {
        (self.bytes[0], self.bytes[1], self.bytes[2])
    }
}

impl Opcode {
    /// Constructs a new `Opcode` given its byte representation.
    pub fn new(opcode: &[u8; 2]) -> Opcode {
        Opcode {
            instruction_class: opcode[0] >> 4,
            payload: OpcodePayload {
                bytes: [opcode[0] & 0xF, opcode[1] >> 4, opcode[1] & 0xF],
            },
        }
    }

    pub fn word(&self) -> u16 {
        (self.instruction_class as u16) << 12 | self.payload.address()
    }

    /// Decodes the opcode. Every possible opcode decodes, those without
    /// meaning become `Instruction::Unknown`.
    pub fn decode(&self) -> Instruction {
        let (x, y, n) = self.payload.operands();
        let (_, nn) = self.payload.reg_and_value();
        let nnn = self.payload.address();

        match self.instruction_class {
            0x0 => match nnn {
                0x0E0 => Instruction::Cls,
                0x0EE => Instruction::Ret,
                _ => Instruction::Unknown(self.word()),
            },
            0x1 => Instruction::Jp(nnn),
            0x2 => Instruction::Call(nnn),
            0x3 => Instruction::SeImm { x, nn },
            0x4 => Instruction::SneImm { x, nn },
            0x5 if n == 0 => Instruction::SeReg { x, y },
            0x6 => Instruction::LdImm { x, nn },
            0x7 => Instruction::AddImm { x, nn },
            0x8 => match n {
                0x0 => Instruction::LdReg { x, y },
                0x1 => Instruction::Or { x, y },
                0x2 => Instruction::And { x, y },
                0x3 => Instruction::Xor { x, y },
                0x4 => Instruction::AddReg { x, y },
                0x5 => Instruction::Sub { x, y },
                0x6 => Instruction::Shr { x, y },
                0x7 => Instruction::Subn { x, y },
                0xE => Instruction::Shl { x, y },
                _ => Instruction::Unknown(self.word()),
            },
            0x9 if n == 0 => Instruction::SneReg { x, y },
            0xA => Instruction::LdI(nnn),
            0xB => Instruction::JpV0(nnn),
            0xC => Instruction::Rnd { x, nn },
            0xD => Instruction::Drw { x, y, n },
            0xE => match nn {
                0x9E => Instruction::Skp { x },
                0xA1 => Instruction::Sknp { x },
                _ => Instruction::Unknown(self.word()),
            },
            0xF => match nn {
                0x07 => Instruction::LdVxDt { x },
                0x0A => Instruction::LdVxK { x },
                0x15 => Instruction::LdDtVx { x },
                0x18 => Instruction::LdStVx { x },
                0x1E => Instruction::AddIVx { x },
                0x29 => Instruction::LdFVx { x },
                0x33 => Instruction::LdBVx { x },
                0x55 => Instruction::LdMemVx { x },
                0x65 => Instruction::LdVxMem { x },
                _ => Instruction::Unknown(self.word()),
            },
            _ => Instruction::Unknown(self.word()),
        }
    }
}

impl From<u16> for Opcode {
    fn from(word: u16) -> Opcode {
        Opcode::new(&word.to_be_bytes())
    }
}

/// A decoded CHIP-8 instruction. Register operands (`x`, `y`) are register
/// numbers in range 0x0 - 0xF, addresses are 12 bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0`
    Cls,
    /// `00EE`
    Ret,
    /// `1nnn`
    Jp(u16),
    /// `2nnn`
    Call(u16),
    /// `3xnn`
    SeImm { x: u8, nn: u8 },
    /// `4xnn`
    SneImm { x: u8, nn: u8 },
    /// `5xy0`
    SeReg { x: u8, y: u8 },
    /// `6xnn`
    LdImm { x: u8, nn: u8 },
    /// `7xnn`
    AddImm { x: u8, nn: u8 },
    /// `8xy0`
    LdReg { x: u8, y: u8 },
    /// `8xy1`
    Or { x: u8, y: u8 },
    /// `8xy2`
    And { x: u8, y: u8 },
    /// `8xy3`
    Xor { x: u8, y: u8 },
    /// `8xy4`
    AddReg { x: u8, y: u8 },
    /// `8xy5`
    Sub { x: u8, y: u8 },
    /// `8xy6`
    Shr { x: u8, y: u8 },
    /// `8xy7`
    Subn { x: u8, y: u8 },
    /// `8xyE`
    Shl { x: u8, y: u8 },
    /// `9xy0`
    SneReg { x: u8, y: u8 },
    /// `Annn`
    LdI(u16),
    /// `Bnnn`
    JpV0(u16),
    /// `Cxnn`
    Rnd { x: u8, nn: u8 },
    /// `Dxyn`
    Drw { x: u8, y: u8, n: u8 },
    /// `Ex9E`
    Skp { x: u8 },
    /// `ExA1`
    Sknp { x: u8 },
    /// `Fx07`
    LdVxDt { x: u8 },
    /// `Fx0A`
    LdVxK { x: u8 },
    /// `Fx15`
    LdDtVx { x: u8 },
    /// `Fx18`
    LdStVx { x: u8 },
    /// `Fx1E`
    AddIVx { x: u8 },
    /// `Fx29`
    LdFVx { x: u8 },
    /// `Fx33`
    LdBVx { x: u8 },
    /// `Fx55`
    LdMemVx { x: u8 },
    /// `Fx65`
    LdVxMem { x: u8 },
    /// Any opcode without a meaning, carrying the raw word.
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Instruction {
        Opcode::from(word).decode()
    }

    /// Executes `self` relative to the given state. The program counter has
    /// already been advanced past the instruction.
    pub(super) fn execute(self, state: &mut Chip8) -> Flow {
        use arithmetic_and_logic::modify_registers;

        match self {
            Instruction::Cls => system::clear_screen(state),
            Instruction::Ret => return program_flow::ret(state),
            Instruction::Jp(address) => program_flow::jump(state, address),
            Instruction::Call(address) => return program_flow::call(state, address),
            Instruction::SeImm { x, nn } => {
                let skip = state.registers[x as usize] == nn;
                program_flow::skip_if(state, skip);
            }
            Instruction::SneImm { x, nn } => {
                let skip = state.registers[x as usize] != nn;
                program_flow::skip_if(state, skip);
            }
            Instruction::SeReg { x, y } => {
                let skip = state.registers[x as usize] == state.registers[y as usize];
                program_flow::skip_if(state, skip);
            }
            Instruction::SneReg { x, y } => {
                let skip = state.registers[x as usize] != state.registers[y as usize];
                program_flow::skip_if(state, skip);
            }
            Instruction::LdImm { x, nn } => arithmetic_and_logic::load_value(state, x, nn),
            Instruction::AddImm { x, nn } => arithmetic_and_logic::add_value(state, x, nn),
            Instruction::LdReg { x, y } => modify_registers(state, x, y, |_, v2| (v2, None)),
            Instruction::Or { x, y } => modify_registers(state, x, y, |v1, v2| (v1 | v2, None)),
            Instruction::And { x, y } => modify_registers(state, x, y, |v1, v2| (v1 & v2, None)),
            Instruction::Xor { x, y } => modify_registers(state, x, y, |v1, v2| (v1 ^ v2, None)),
            Instruction::AddReg { x, y } => modify_registers(state, x, y, |v1, v2| {
                let (result, overflow) = v1.overflowing_add(v2);
                (result, Some(overflow))
            }),
            Instruction::Sub { x, y } => modify_registers(state, x, y, |v1, v2| {
                (v1.wrapping_sub(v2), Some(v1 > v2))
            }),
            Instruction::Subn { x, y } => modify_registers(state, x, y, |v1, v2| {
                (v2.wrapping_sub(v1), Some(v2 > v1))
            }),
            Instruction::Shr { x, y } => arithmetic_and_logic::shift_right(state, x, y),
            Instruction::Shl { x, y } => arithmetic_and_logic::shift_left(state, x, y),
            Instruction::LdI(address) => memory::load_index(state, address),
            Instruction::JpV0(address) => program_flow::jump_with_offset(state, address),
            Instruction::Rnd { x, nn } => arithmetic_and_logic::random(state, x, nn),
            Instruction::Drw { x, y, n } => system::draw(state, x, y, n),
            Instruction::Skp { x } => {
                let skip = system::is_key_down(state, x);
                program_flow::skip_if(state, skip);
            }
            Instruction::Sknp { x } => {
                let skip = !system::is_key_down(state, x);
                program_flow::skip_if(state, skip);
            }
            Instruction::LdVxDt { x } => system::load_delay_timer(state, x),
            Instruction::LdVxK { x } => return system::wait_for_key(state, x),
            Instruction::LdDtVx { x } => system::set_delay_timer(state, x),
            Instruction::LdStVx { x } => system::set_sound_timer(state, x),
            Instruction::AddIVx { x } => memory::add_to_index(state, x),
            Instruction::LdFVx { x } => memory::load_glyph(state, x),
            Instruction::LdBVx { x } => memory::store_bcd(state, x),
            Instruction::LdMemVx { x } => memory::store_registers(state, x),
            Instruction::LdVxMem { x } => memory::load_registers(state, x),
            Instruction::Unknown(_) => return Flow::Unknown,
        };
        Flow::Continue
    }
}

/// How execution continues after an instruction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flow {
    Continue,
    /// `Fx0A` rewound the program counter to run again.
    WaitingForKey,
    /// The instruction had no effect.
    Unknown,
    /// `2nnn` found the stack full. Nothing was modified.
    StackOverflow,
    /// `00EE` found the stack empty. Nothing was modified.
    StackUnderflow,
}
