use crate::chip::chip8::{
    constants::CHIP8_KEY_COUNT, opcodes::Flow, quirks::KeyWaitQuirk, util, Chip8,
};

/// `00E0`
pub(super) fn clear_screen(state: &mut Chip8) {
    state.framebuffer.clear();
}

/// `Dxyn`. Reads `n` sprite rows starting at I and sets VF on collision.
pub(super) fn draw(state: &mut Chip8, x: u8, y: u8, n: u8) {
    let x = state.registers[x as usize];
    let y = state.registers[y as usize];

    let mut rows = [0u8; 0xF];
    for (offset, row) in rows.iter_mut().enumerate().take(n as usize) {
        *row = state.memory[util::index_address(state, offset as u16)];
    }

    let collision = state.framebuffer.draw_sprite(x, y, &rows[..n as usize]);
    state.registers[0xF] = collision as u8;
}

/// Whether the key named by `Vx` is down. Values past the last key are
/// never down.
pub(super) fn is_key_down(state: &Chip8, reg: u8) -> bool {
    state
        .input_pins
        .get(state.registers[reg as usize] as usize)
        .copied()
        .unwrap_or(false)
}

/// `Fx07`
pub(super) fn load_delay_timer(state: &mut Chip8, reg: u8) {
    state.registers[reg as usize] = state.delay_timer;
}

/// `Fx15`
pub(super) fn set_delay_timer(state: &mut Chip8, reg: u8) {
    state.delay_timer = state.registers[reg as usize];
}

/// `Fx18`
pub(super) fn set_sound_timer(state: &mut Chip8, reg: u8) {
    state.sound_timer = state.registers[reg as usize];
}

/// `Fx0A`. Stores the entered key in `Vx`. While no key has been entered
/// the program counter is moved back so this instruction runs again.
pub(super) fn wait_for_key(state: &mut Chip8, reg: u8) -> Flow {
    let entered = match state.quirks.key_wait {
        KeyWaitQuirk::Held => first_key_down(state),
        KeyWaitQuirk::Release => match state.key_latch {
            Some(key) if !state.input_pins[key as usize] => {
                state.key_latch = None;
                Some(key)
            }
            Some(_) => None,
            None => {
                state.key_latch = first_key_down(state);
                None
            }
        },
    };

    match entered {
        Some(key) => {
            state.registers[reg as usize] = key;
            Flow::Continue
        }
        None => {
            util::rewind_program_counter(state);
            Flow::WaitingForKey
        }
    }
}

fn first_key_down(state: &Chip8) -> Option<u8> {
    (0..CHIP8_KEY_COUNT)
        .find(|&key| state.input_pins[key])
        .map(|key| key as u8)
}
