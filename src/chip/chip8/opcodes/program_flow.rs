use crate::chip::chip8::{constants::CHIP8_STACK_DEPTH, opcodes::Flow, util, Chip8};

/// `1nnn`
pub(super) fn jump(state: &mut Chip8, address: u16) {
    state.program_counter = address;
}

/// `Bnnn`
pub(super) fn jump_with_offset(state: &mut Chip8, address: u16) {
    state.program_counter = address.wrapping_add(state.registers[0] as u16);
}

/// `2nnn`. A full stack leaves the machine untouched and reports the overflow.
pub(super) fn call(state: &mut Chip8, address: u16) -> Flow {
    if state.stack_pointer as usize >= CHIP8_STACK_DEPTH {
        return Flow::StackOverflow;
    }
    state.stack[state.stack_pointer as usize] = state.program_counter;
    state.stack_pointer += 1;
    state.program_counter = address;
    Flow::Continue
}

/// `00EE`. An empty stack leaves the machine untouched and reports the underflow.
pub(super) fn ret(state: &mut Chip8) -> Flow {
    if state.stack_pointer == 0 {
        return Flow::StackUnderflow;
    }
    state.stack_pointer -= 1;
    state.program_counter = state.stack[state.stack_pointer as usize];
    Flow::Continue
}

/// Skips the next instruction if `condition` holds.
pub(super) fn skip_if(state: &mut Chip8, condition: bool) {
    if condition {
        util::increment_program_counter(state);
    }
}
