use rand::Rng;

use crate::chip::chip8::{quirks::ShiftQuirk, Chip8};

/// `6xnn`
pub(super) fn load_value(state: &mut Chip8, reg: u8, value: u8) {
    state.registers[reg as usize] = value;
}

/// `7xnn`. Wraps without touching VF.
pub(super) fn add_value(state: &mut Chip8, reg: u8, value: u8) {
    state.registers[reg as usize] = state.registers[reg as usize].wrapping_add(value);
}

/// Applies `f` to `Vx` and `Vy`, stores the result in `Vx` and, if `f` reports
/// a flag, stores it in VF afterwards. The flag wins when `x` is VF.
pub(super) fn modify_registers(state: &mut Chip8, r1: u8, r2: u8, f: fn(u8, u8) -> (u8, Option<bool>)) {
    let (val, flag) = f(state.registers[r1 as usize], state.registers[r2 as usize]);
    state.registers[r1 as usize] = val;
    match flag {
        Some(true) => state.registers[0xF] = 1,
        Some(false) => state.registers[0xF] = 0,
        _ => {}
    }
}

/// The register a shift reads its operand from.
fn shift_source(state: &Chip8, x: u8, y: u8) -> u8 {
    match state.quirks.shift {
        ShiftQuirk::VxOnly => x,
        ShiftQuirk::CopyVy => y,
    }
}

/// `8xy6`
pub(super) fn shift_right(state: &mut Chip8, x: u8, y: u8) {
    let source = shift_source(state, x, y);
    modify_registers(state, x, source, |_, v| (v >> 1, Some(v & 1 != 0)));
}

/// `8xyE`
pub(super) fn shift_left(state: &mut Chip8, x: u8, y: u8) {
    let source = shift_source(state, x, y);
    modify_registers(state, x, source, |_, v| (v << 1, Some(v & 0x80 != 0)));
}

/// `Cxnn`
pub(super) fn random(state: &mut Chip8, reg: u8, mask: u8) {
    let sample: u8 = state.rng.gen();
    state.registers[reg as usize] = sample & mask;
}
