use crate::chip::chip8::{
    constants::{CHIP8_CHARSET_OFFSET, CHIP8_GLYPH_SIZE},
    util, Chip8,
};

/// `Annn`
pub(super) fn load_index(state: &mut Chip8, address: u16) {
    state.index = address;
}

/// `Fx1E`
pub(super) fn add_to_index(state: &mut Chip8, reg: u8) {
    state.index = state.index.wrapping_add(state.registers[reg as usize] as u16);
}

/// `Fx29`. Points I at the glyph for the digit in `Vx`.
pub(super) fn load_glyph(state: &mut Chip8, reg: u8) {
    let character = state.registers[reg as usize] as u16;
    state.index = character * CHIP8_GLYPH_SIZE + CHIP8_CHARSET_OFFSET;
}

/// `Fx33`
pub(super) fn store_bcd(state: &mut Chip8, reg: u8) {
    let value = state.registers[reg as usize];
    let digits = [value / 100, (value / 10) % 10, value % 10];
    for (offset, digit) in digits.iter().enumerate() {
        let address = util::index_address(state, offset as u16);
        state.memory[address] = *digit;
    }
}

/// `Fx55`
pub(super) fn store_registers(state: &mut Chip8, last: u8) {
    for reg in 0x0..=last {
        let address = util::index_address(state, reg as u16);
        state.memory[address] = state.registers[reg as usize];
    }
    advance_index(state, last);
}

/// `Fx65`
pub(super) fn load_registers(state: &mut Chip8, last: u8) {
    for reg in 0x0..=last {
        let address = util::index_address(state, reg as u16);
        state.registers[reg as usize] = state.memory[address];
    }
    advance_index(state, last);
}

fn advance_index(state: &mut Chip8, last: u8) {
    if state.quirks.load_store_increments_index {
        state.index = state.index.wrapping_add(last as u16 + 1);
    }
}
