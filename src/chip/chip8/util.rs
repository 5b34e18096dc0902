use crate::chip::chip8::{constants::CHIP8_ADDRESS_MASK, Chip8};

pub fn increment_program_counter(state: &mut Chip8) {
    state.program_counter = state.program_counter.wrapping_add(2);
}

/// Moves the program counter back onto the instruction that just ran, so
/// that it runs again on the next cycle.
pub fn rewind_program_counter(state: &mut Chip8) {
    state.program_counter = state.program_counter.wrapping_sub(2);
}

/// Maps any 16 bit address onto the 4096 byte memory.
pub fn memory_address(address: u16) -> usize {
    (address & CHIP8_ADDRESS_MASK) as usize
}

/// Address `offset` bytes past the index register, wrapped into memory.
pub fn index_address(state: &Chip8, offset: u16) -> usize {
    memory_address(state.index.wrapping_add(offset))
}
