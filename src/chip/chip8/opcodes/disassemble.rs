use std::fmt;

use crate::chip::chip8::opcodes::Instruction;

/// Renders the mnemonic of a single opcode, e.g. `DRW V3, V4, 5` for `0xD345`.
/// Opcodes without a meaning render as `UNKNOWN 0x....`.
pub fn disassemble(opcode: u16) -> String {
    Instruction::decode(opcode).to_string()
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Instruction::Cls => write!(f, "CLS"),
            Instruction::Ret => write!(f, "RET"),
            Instruction::Jp(address) => write!(f, "JP {:#05X}", address),
            Instruction::Call(address) => write!(f, "CALL {:#05X}", address),
            Instruction::SeImm { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            Instruction::SneImm { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            Instruction::SeReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LdImm { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            Instruction::AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Instruction::LdReg { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::Shr { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            Instruction::Subn { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::Shl { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            Instruction::SneReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LdI(address) => write!(f, "LD I, {:#05X}", address),
            Instruction::JpV0(address) => write!(f, "JP V0, {:#05X}", address),
            Instruction::Rnd { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Instruction::Drw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::Skp { x } => write!(f, "SKP V{:X}", x),
            Instruction::Sknp { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LdVxDt { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::LdVxK { x } => write!(f, "LD V{:X}, K", x),
            Instruction::LdDtVx { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::LdStVx { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddIVx { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LdFVx { x } => write!(f, "LD F, V{:X}", x),
            Instruction::LdBVx { x } => write!(f, "LD B, V{:X}", x),
            Instruction::LdMemVx { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LdVxMem { x } => write!(f, "LD V{:X}, [I]", x),
            Instruction::Unknown(word) => write!(f, "UNKNOWN {:#06X}", word),
        }
    }
}
