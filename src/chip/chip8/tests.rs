use crate::chip::chip8::{
    constants::{CHIP8_CHARSET, CHIP8_CHARSET_OFFSET},
    Chip8, CycleOutcome, Instruction, KeyWaitQuirk, Quirks, ShiftQuirk,
};
use crate::chip::{Chip, LoadRomError};

fn prepare_state_with_single_instruction(instruction: u16) -> Chip8 {
    let mut chip8 = Chip8::with_seed(0xC8);
    chip8.load_rom(&instruction.to_be_bytes()).unwrap();
    chip8
}

fn do_cycle(instruction: u16, before_cycle: fn(&mut Chip8), after_cycle: fn(&mut Chip8)) {
    let mut state = prepare_state_with_single_instruction(instruction);

    before_cycle(&mut state);
    state.cycle();
    after_cycle(&mut state);
}

fn no_setup(_: &mut Chip8) {}

#[test]
fn test_new_machine_is_halted_with_charset() {
    let mut chip8 = Chip8::with_seed(0);
    assert!(!chip8.is_running());
    assert_eq!(chip8.program_counter, 0x200);
    assert_eq!(chip8.memory[0x50..0xA0], CHIP8_CHARSET[..]);
    assert_eq!(chip8.cycle(), CycleOutcome::Halted);
    assert_eq!(chip8.program_counter, 0x200);
}

#[test]
fn test_load_rom_starts_execution() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_rom(&[0x6A, 0x55]).unwrap();

    assert!(chip8.is_running());
    assert_eq!(chip8.cycle(), CycleOutcome::Executed(Instruction::LdImm { x: 0xA, nn: 0x55 }));
    assert_eq!(chip8.registers[0xA], 0x55);
    assert_eq!(chip8.program_counter, 0x202);
}

#[test]
fn test_load_rom_too_large_is_rejected() {
    let mut chip8 = Chip8::with_seed(0);
    let before = chip8.clone();

    assert_eq!(chip8.load_rom(&[0xAA; 3585]), Err(LoadRomError::RomTooLarge(3585)));
    assert_eq!(chip8, before);
    assert!(chip8.memory[0x200..].iter().all(|&byte| byte == 0));
}

#[test]
fn test_load_rom_of_maximum_size() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_rom(&[0xAA; 3584]).unwrap();
    assert_eq!(chip8.memory[0xFFF], 0xAA);
}

#[test]
fn test_load_rom_keeps_breakpoints_and_clears_old_program() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.set_breakpoint(0x204);
    chip8.load_rom(&[0x11, 0x22, 0x33, 0x44]).unwrap();
    chip8.load_rom(&[0x55]).unwrap();

    assert_eq!(chip8.memory[0x200..0x204], [0x55, 0, 0, 0]);
    assert!(chip8.breakpoints().contains(&0x204));
}

#[test]
fn test_reset() {
    let mut chip8 = prepare_state_with_single_instruction(0x6105);
    chip8.cycle();
    chip8.key_down(0x2);
    chip8.set_breakpoint(0x300);
    chip8.framebuffer.draw_sprite(0, 0, &[0xFF]);
    chip8.delay_timer = 9;

    chip8.reset();

    assert!(!chip8.is_running());
    assert_eq!(chip8.registers, [0; 16]);
    assert_eq!(chip8.program_counter, 0x200);
    assert_eq!(chip8.delay_timer, 0);
    assert!(!chip8.is_key_down(0x2));
    assert!(chip8.framebuffer.pixels().iter().all(|&p| p == 0));
    assert_eq!(chip8.memory[0x200], 0);
    assert_eq!(chip8.memory[0x50..0xA0], CHIP8_CHARSET[..]);
    assert!(chip8.breakpoints().contains(&0x300));
}

#[test]
fn test_clear_screen() {
    do_cycle(
        0x00E0,
        |state| {
            state.framebuffer.draw_sprite(0, 0, &[0x80]);
            state.framebuffer.clear_changed();
            assert_eq!(state.framebuffer.pixel(0, 0), 1);
        },
        |state| {
            assert_eq!(state.framebuffer.pixel(0, 0), 0);
            assert!(state.framebuffer.changed());
            assert_eq!(state.program_counter, 0x202);
        },
    )
}

#[test]
fn test_jump() {
    do_cycle(
        0x1CAF,
        |state| {
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0xCAF);
        },
    );
    do_cycle(0x1234, no_setup, |state| {
        assert_eq!(state.program_counter, 0x234);
    });
}

#[test]
fn test_call() {
    do_cycle(
        0x2CAF,
        |state| {
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0xCAF);
            assert_eq!(state.stack_pointer, 1);
            assert_eq!(state.stack[(state.stack_pointer - 1) as usize], 0x202);
        },
    )
}

#[test]
fn test_call_then_return() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_rom(&[0x22, 0x04, 0x00, 0x00, 0x00, 0xEE]).unwrap();

    chip8.cycle();
    assert_eq!(chip8.program_counter, 0x204);
    assert_eq!(chip8.cycle(), CycleOutcome::Executed(Instruction::Ret));
    assert_eq!(chip8.program_counter, 0x202);
    assert_eq!(chip8.stack_pointer, 0);
}

#[test]
fn test_call_on_full_stack_halts() {
    do_cycle(
        0x2300,
        |state| {
            state.stack_pointer = 16;
        },
        |state| {
            assert!(!state.is_running());
            assert_eq!(state.stack_pointer, 16);
            assert_eq!(state.program_counter, 0x200);
        },
    );

    let mut chip8 = prepare_state_with_single_instruction(0x2300);
    chip8.stack_pointer = 16;
    assert_eq!(chip8.cycle(), CycleOutcome::StackOverflow(0x200));
}

#[test]
fn test_return_on_empty_stack_halts() {
    let mut chip8 = prepare_state_with_single_instruction(0x00EE);
    assert_eq!(chip8.cycle(), CycleOutcome::StackUnderflow(0x200));
    assert!(!chip8.is_running());
    assert_eq!(chip8.program_counter, 0x200);
    assert_eq!(chip8.stack_pointer, 0);
}

#[test]
fn test_recursion_overflows_after_sixteen_calls() {
    let mut chip8 = prepare_state_with_single_instruction(0x2200);
    for _ in 0..16 {
        assert_eq!(chip8.cycle(), CycleOutcome::Executed(Instruction::Call(0x200)));
    }
    assert_eq!(chip8.cycle(), CycleOutcome::StackOverflow(0x200));
}

#[test]
fn test_skip_if_equal() {
    do_cycle(
        0x34AF,
        |state| {
            state.registers[4] = 0xAF;
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0x204);
        },
    );

    do_cycle(
        0x34BF,
        |state| {
            state.registers[4] = 0xAF;
            assert_eq!(state.program_counter, 0x200);
        },
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_skip_if_not_equal() {
    do_cycle(0x4111, no_setup, |state| {
        assert_eq!(state.program_counter, 0x204);
    });
    do_cycle(
        0x4111,
        |state| state.registers[1] = 0x11,
        |state| {
            assert_eq!(state.program_counter, 0x202);
        },
    );
}

#[test]
fn test_skip_if_registers_equal() {
    do_cycle(
        0x5120,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x11;
        },
        |state| assert_eq!(state.program_counter, 0x204),
    );
    do_cycle(
        0x5120,
        |state| state.registers[1] = 0x11,
        |state| assert_eq!(state.program_counter, 0x202),
    );
}

#[test]
fn test_skip_if_registers_not_equal() {
    do_cycle(
        0x9120,
        |state| state.registers[1] = 0x11,
        |state| assert_eq!(state.program_counter, 0x204),
    );
    do_cycle(0x9120, no_setup, |state| {
        assert_eq!(state.program_counter, 0x202)
    });
}

#[test]
fn test_load_and_add_immediate() {
    do_cycle(0x6A55, no_setup, |state| {
        assert_eq!(state.registers[0xA], 0x55);
        assert_eq!(state.program_counter, 0x202);
    });
    do_cycle(
        0x7102,
        |state| {
            state.registers[1] = 0xFF;
            state.registers[0xF] = 0x7;
        },
        |state| {
            assert_eq!(state.registers[1], 0x01);
            assert_eq!(state.registers[0xF], 0x7);
        },
    );
}

#[test]
fn test_register_logic() {
    let setup: fn(&mut Chip8) = |state| {
        state.registers[1] = 0x6;
        state.registers[2] = 0x3;
    };
    do_cycle(0x8120, setup, |state| assert_eq!(state.registers[1], 0x3));
    do_cycle(0x8121, setup, |state| assert_eq!(state.registers[1], 0x7));
    do_cycle(0x8122, setup, |state| assert_eq!(state.registers[1], 0x2));
    do_cycle(0x8123, setup, |state| assert_eq!(state.registers[1], 0x5));
}

#[test]
fn test_add_registers_sets_carry() {
    do_cycle(
        0x8124,
        |state| {
            state.registers[1] = 0xEE;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0);
        },
    );
    do_cycle(
        0x8124,
        |state| {
            state.registers[1] = 0xFF;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0x10);
            assert_eq!(state.registers[0xF], 1);
        },
    );
}

#[test]
fn test_sub_sets_flag_only_if_strictly_greater() {
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x33;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0x22);
            assert_eq!(state.registers[0xF], 1);
        },
    );
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x12;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0);
        },
    );
    do_cycle(
        0x8125,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0x00);
            assert_eq!(state.registers[0xF], 0);
        },
    );
}

#[test]
fn test_subn() {
    do_cycle(
        0x8127,
        |state| {
            state.registers[1] = 0x11;
            state.registers[2] = 0x33;
        },
        |state| {
            assert_eq!(state.registers[1], 0x22);
            assert_eq!(state.registers[0xF], 1);
        },
    );
    do_cycle(
        0x8127,
        |state| {
            state.registers[1] = 0x12;
            state.registers[2] = 0x11;
        },
        |state| {
            assert_eq!(state.registers[1], 0xFF);
            assert_eq!(state.registers[0xF], 0);
        },
    );
}

#[test]
fn test_shifts_ignore_vy_by_default() {
    do_cycle(
        0x8126,
        |state| {
            state.registers[1] = 0x5;
            state.registers[2] = 0xF0;
        },
        |state| {
            assert_eq!(state.registers[1], 0x2);
            assert_eq!(state.registers[0xF], 1);
        },
    );
    do_cycle(
        0x812E,
        |state| {
            state.registers[1] = 0x81;
            state.registers[2] = 0x01;
        },
        |state| {
            assert_eq!(state.registers[1], 0x02);
            assert_eq!(state.registers[0xF], 1);
        },
    );
    do_cycle(
        0x812E,
        |state| state.registers[1] = 0x4,
        |state| {
            assert_eq!(state.registers[1], 0x8);
            assert_eq!(state.registers[0xF], 0);
        },
    );
}

#[test]
fn test_shifts_read_vy_with_quirk() {
    let quirks = Quirks {
        shift: ShiftQuirk::CopyVy,
        ..Quirks::default()
    };
    let mut chip8 = Chip8::with_quirks(quirks, 0);
    chip8.load_rom(&[0x81, 0x26, 0x83, 0x2E]).unwrap();
    chip8.registers[1] = 0xFF;
    chip8.registers[2] = 0x03;
    chip8.cycle();
    assert_eq!(chip8.registers[1], 0x01);
    assert_eq!(chip8.registers[0xF], 1);

    chip8.cycle();
    assert_eq!(chip8.registers[3], 0x06);
    assert_eq!(chip8.registers[0xF], 0);
}

#[test]
fn test_flag_wins_when_vf_is_destination() {
    do_cycle(
        0x8F14,
        |state| {
            state.registers[0xF] = 0xFF;
            state.registers[1] = 0x01;
        },
        |state| {
            assert_eq!(state.registers[0xF], 1);
        },
    );
}

#[test]
fn test_load_index_and_jump_with_offset() {
    do_cycle(0xAABC, no_setup, |state| {
        assert_eq!(state.index, 0xABC);
        assert_eq!(state.program_counter, 0x202);
    });
    do_cycle(
        0xBABC,
        |state| state.registers[0] = 0x2,
        |state| assert_eq!(state.program_counter, 0xABE),
    );
}

#[test]
fn test_jump_past_memory_wraps_fetch() {
    let mut chip8 = prepare_state_with_single_instruction(0xBFFF);
    chip8.registers[0] = 0x01;
    chip8.memory[0x000] = 0x6A;
    chip8.memory[0x001] = 0x42;
    chip8.cycle();
    assert_eq!(chip8.program_counter, 0x1000);

    chip8.cycle();
    assert_eq!(chip8.registers[0xA], 0x42);
}

#[test]
fn test_random_is_masked_and_seeded() {
    let mut first = prepare_state_with_single_instruction(0xC30F);
    let mut second = prepare_state_with_single_instruction(0xC30F);
    first.cycle();
    second.cycle();

    assert_eq!(first.registers[3] & 0xF0, 0);
    assert_eq!(first.registers[3], second.registers[3]);

    do_cycle(
        0xC300,
        |state| state.registers[3] = 0xFF,
        |state| assert_eq!(state.registers[3], 0),
    );
}

#[test]
fn test_draw_glyph_and_redraw() {
    let mut chip8 = Chip8::with_seed(0);
    // V0 = 0, I = glyph '0', draw twice
    chip8
        .load_rom(&[0x60, 0x00, 0xF0, 0x29, 0xD0, 0x05, 0xD0, 0x05])
        .unwrap();
    chip8.cycle();
    chip8.cycle();
    assert_eq!(chip8.index, CHIP8_CHARSET_OFFSET);

    chip8.cycle();
    assert_eq!(chip8.framebuffer.pixel(0, 0), 1);
    assert_eq!(chip8.framebuffer.pixel(0, 1), 1);
    assert_eq!(chip8.framebuffer.pixel(1, 1), 0);
    assert_eq!(chip8.registers[0xF], 0);

    chip8.cycle();
    assert!(chip8.framebuffer.pixels().iter().all(|&p| p == 0));
    assert_eq!(chip8.registers[0xF], 1);
    assert!(chip8.framebuffer.changed());
}

#[test]
fn test_draw_wraps_horizontally() {
    do_cycle(
        0xD121,
        |state| {
            state.registers[1] = 63;
            state.registers[2] = 0;
            state.index = 0x300;
            state.memory[0x300] = 0xC0;
        },
        |state| {
            assert_eq!(state.framebuffer.pixel(63, 0), 1);
            assert_eq!(state.framebuffer.pixel(0, 0), 1);
            assert_eq!(state.registers[0xF], 0);
        },
    );
}

#[test]
fn test_draw_reads_sprite_wrapping_memory() {
    do_cycle(
        0xD002,
        |state| {
            state.index = 0xFFF;
            state.memory[0xFFF] = 0x80;
            state.memory[0x000] = 0x40;
        },
        |state| {
            assert_eq!(state.framebuffer.pixel(0, 0), 1);
            assert_eq!(state.framebuffer.pixel(1, 1), 1);
        },
    );
}

#[test]
fn test_skip_on_key() {
    do_cycle(
        0xE19E,
        |state| {
            state.registers[1] = 0xE;
            state.key_down(0xE);
        },
        |state| assert_eq!(state.program_counter, 0x204),
    );
    do_cycle(0xE19E, no_setup, |state| {
        assert_eq!(state.program_counter, 0x202)
    });
    do_cycle(0xE1A1, no_setup, |state| {
        assert_eq!(state.program_counter, 0x204)
    });
    do_cycle(
        0xE1A1,
        |state| {
            state.registers[1] = 0xE;
            state.key_down(0xE);
        },
        |state| assert_eq!(state.program_counter, 0x202),
    );
}

#[test]
fn test_skip_on_key_out_of_range_is_not_pressed() {
    do_cycle(
        0xE19E,
        |state| {
            state.registers[1] = 0x1E;
            state.key_down(0xE);
        },
        |state| assert_eq!(state.program_counter, 0x202),
    );
}

#[test]
fn test_timers() {
    do_cycle(
        0xF107,
        |state| state.delay_timer = 0xF,
        |state| assert_eq!(state.registers[1], 0xF),
    );
    do_cycle(
        0xF115,
        |state| state.registers[1] = 0xF,
        |state| assert_eq!(state.delay_timer, 0xF),
    );
    do_cycle(
        0xF118,
        |state| state.registers[1] = 0xF,
        |state| {
            assert_eq!(state.sound_timer, 0xF);
            assert!(state.sound_active());
        },
    );
}

#[test]
fn test_tick_stops_at_zero() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.delay_timer = 2;
    chip8.sound_timer = 1;

    chip8.tick();
    assert_eq!((chip8.delay_timer, chip8.sound_timer), (1, 0));
    assert!(!chip8.sound_active());

    chip8.tick();
    chip8.tick();
    assert_eq!((chip8.delay_timer, chip8.sound_timer), (0, 0));
}

#[test]
fn test_wait_for_held_key() {
    let mut chip8 = prepare_state_with_single_instruction(0xF30A);

    assert_eq!(chip8.cycle(), CycleOutcome::WaitingForKey);
    assert_eq!(chip8.program_counter, 0x200);
    assert_eq!(chip8.cycle(), CycleOutcome::WaitingForKey);

    chip8.key_down(0xB);
    chip8.key_down(0x7);
    chip8.cycle();
    assert_eq!(chip8.registers[3], 0x7);
    assert_eq!(chip8.program_counter, 0x202);
}

#[test]
fn test_wait_for_key_release_with_quirk() {
    let quirks = Quirks {
        key_wait: KeyWaitQuirk::Release,
        ..Quirks::default()
    };
    let mut chip8 = Chip8::with_quirks(quirks, 0);
    chip8.load_rom(&[0xF3, 0x0A]).unwrap();

    chip8.key_down(0x5);
    assert_eq!(chip8.cycle(), CycleOutcome::WaitingForKey);
    assert_eq!(chip8.cycle(), CycleOutcome::WaitingForKey);
    assert_eq!(chip8.program_counter, 0x200);

    chip8.key_up(0x5);
    chip8.cycle();
    assert_eq!(chip8.registers[3], 0x5);
    assert_eq!(chip8.program_counter, 0x202);
}

#[test]
fn test_add_to_index_and_glyph() {
    do_cycle(
        0xF11E,
        |state| {
            state.index = 0xFFFF;
            state.registers[1] = 0x2;
        },
        |state| assert_eq!(state.index, 0x1),
    );
    do_cycle(
        0xF129,
        |state| state.registers[1] = 0x2,
        |state| assert_eq!(state.index, 0x50 + 10),
    );
}

#[test]
fn test_bcd() {
    do_cycle(
        0xF133,
        |state| {
            state.registers[1] = 123;
            state.index = 0x300;
        },
        |state| assert_eq!(state.memory[0x300..0x303], [1, 2, 3]),
    );
    do_cycle(
        0xF133,
        |state| {
            state.registers[1] = 7;
            state.index = 0xFFF;
        },
        |state| {
            assert_eq!(state.memory[0xFFF], 0);
            assert_eq!(state.memory[0x000], 0);
            assert_eq!(state.memory[0x001], 7);
        },
    );
}

#[test]
fn test_store_and_load_registers_advance_index() {
    do_cycle(
        0xF455,
        |state| {
            state.index = 0x300;
            state.registers[0x0..0x5].copy_from_slice(&[1, 2, 3, 4, 5]);
        },
        |state| {
            assert_eq!(state.memory[0x300..0x305], [1, 2, 3, 4, 5]);
            assert_eq!(state.memory[0x305], 0);
            assert_eq!(state.index, 0x305);
        },
    );
    do_cycle(
        0xF465,
        |state| {
            state.index = 0x300;
            state.memory[0x300..0x306].copy_from_slice(&[1, 2, 3, 4, 5, 6]);
        },
        |state| {
            assert_eq!(state.registers[0x0..0x6], [1, 2, 3, 4, 5, 0]);
            assert_eq!(state.index, 0x305);
        },
    );
}

#[test]
fn test_store_registers_without_index_quirk() {
    let quirks = Quirks {
        load_store_increments_index: false,
        ..Quirks::default()
    };
    let mut chip8 = Chip8::with_quirks(quirks, 0);
    chip8.load_rom(&[0xF2, 0x55]).unwrap();
    chip8.index = 0x300;
    chip8.cycle();
    assert_eq!(chip8.index, 0x300);
}

#[test]
fn test_unknown_opcode_is_skipped() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_rom(&[0x81, 0x2F, 0x61, 0x01]).unwrap();
    let registers = chip8.registers;

    assert_eq!(
        chip8.cycle(),
        CycleOutcome::UnknownOpcode {
            address: 0x200,
            opcode: 0x812F
        }
    );
    assert!(chip8.is_running());
    assert_eq!(chip8.program_counter, 0x202);
    assert_eq!(chip8.registers, registers);

    chip8.cycle();
    assert_eq!(chip8.registers[1], 1);
}

#[test]
fn test_non_branching_instructions_advance_by_two() {
    for &opcode in &[
        0x00E0, 0x6123, 0x7123, 0x8120, 0x8124, 0x8126, 0xA123, 0xC1FF, 0xD125, 0xF107,
        0xF115, 0xF118, 0xF11E, 0xF129, 0xF133, 0xF155, 0xF165, 0x0123,
    ] {
        do_cycle(opcode, no_setup, |state| {
            assert_eq!(state.program_counter, 0x202)
        });
    }
}

#[test]
fn test_every_opcode_is_safe() {
    for word in 0..=u16::MAX {
        let mut chip8 = prepare_state_with_single_instruction(word);
        chip8.registers = [0xFF; 16];
        chip8.index = 0xFFFF;
        chip8.cycle();
    }
}

#[test]
fn test_breakpoint_halts_before_instruction() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.load_rom(&[0x61, 0x01, 0x62, 0x02, 0x63, 0x03]).unwrap();
    chip8.set_breakpoint(0x202);

    chip8.cycle();
    assert_eq!(chip8.cycle(), CycleOutcome::Breakpoint(0x202));
    assert!(!chip8.is_running());
    assert_eq!(chip8.program_counter, 0x202);
    assert_eq!(chip8.registers[1..4], [1, 0, 0]);

    assert_eq!(chip8.cycle(), CycleOutcome::Halted);

    chip8.resume();
    chip8.cycle();
    assert_eq!(chip8.registers[2], 2);
    chip8.cycle();
    assert_eq!(chip8.registers[3], 3);
}

#[test]
fn test_breakpoint_hits_again_on_next_visit() {
    let mut chip8 = prepare_state_with_single_instruction(0x1200);
    chip8.set_breakpoint(0x200);

    assert_eq!(chip8.cycle(), CycleOutcome::Breakpoint(0x200));
    chip8.resume();
    assert_eq!(chip8.cycle(), CycleOutcome::Executed(Instruction::Jp(0x200)));
    assert_eq!(chip8.cycle(), CycleOutcome::Breakpoint(0x200));

    chip8.clear_breakpoint(0x200);
    chip8.resume();
    chip8.cycle();
    assert_eq!(chip8.cycle(), CycleOutcome::Executed(Instruction::Jp(0x200)));
}

#[test]
fn test_pause_resume_and_hard_stop() {
    let mut chip8 = prepare_state_with_single_instruction(0x6101);
    chip8.pause();
    assert_eq!(chip8.cycle(), CycleOutcome::Halted);
    chip8.resume();
    assert!(chip8.is_running());
    chip8.cycle();
    assert_eq!(chip8.registers[1], 1);

    chip8.hard_stop();
    assert!(!chip8.is_running());
}

#[test]
fn test_keys_ignore_out_of_range() {
    let mut chip8 = Chip8::with_seed(0);
    chip8.key_down(0x10);
    chip8.key_down(0xFF);
    assert_eq!(chip8.input_pins, [false; 16]);

    chip8.key_down(0xF);
    assert!(chip8.is_key_down(0xF));
    chip8.key_up(0xF);
    assert!(!chip8.is_key_down(0xF));
    assert!(!chip8.is_key_down(0x20));
}

#[test]
fn test_take_changed_framebuffer() {
    let mut chip8 = prepare_state_with_single_instruction(0x00E0);
    assert!(chip8.take_changed_framebuffer().is_none());

    chip8.cycle();
    let frame = chip8.take_changed_framebuffer().unwrap();
    assert!(!frame.is_lit(0, 0));
    assert!(chip8.take_changed_framebuffer().is_none());
}

#[test]
fn test_chip_trait() {
    fn run_frame<T: Chip<PinAddress = u8>>(chip: &mut T, cycles: usize) -> Option<T::Frame> {
        chip.set_input_pin(0x1, true);
        for _ in 0..cycles {
            chip.cycle();
        }
        chip.tick();
        chip.reset_input_pins();
        chip.take_changed_frame()
    }

    let mut chip8 = Chip8::with_seed(0);
    Chip::load_rom(&mut chip8, &[0x61, 0x01, 0xE1, 0x9E, 0x00, 0xE0, 0x00, 0xE0]).unwrap();
    chip8.sound_timer = 2;

    let frame = run_frame(&mut chip8, 3).unwrap();
    assert!(!frame.is_lit(0, 0));
    assert_eq!(chip8.program_counter, 0x208);
    assert!(!chip8.is_key_down(0x1));
    assert!(Chip::sound_active(&chip8));
}

/// Runs `Cxnn` with a full mask 32 times and collects the results.
fn random_bytes(chip8: &mut Chip8) -> Vec<u8> {
    chip8.load_rom(&[0xC0, 0xFF, 0x12, 0x00]).unwrap();
    (0..32)
        .map(|_| {
            chip8.cycle();
            chip8.cycle();
            chip8.registers[0]
        })
        .collect()
}

#[test]
fn test_unseeded_machines_draw_different_numbers() {
    let first = random_bytes(&mut Chip8::new());
    let second = random_bytes(&mut Chip8::new());
    assert_ne!(first, second);

    let mut seeded = Chip8::with_seed(0xC8);
    let expected = random_bytes(&mut Chip8::with_seed(0xC8));
    seeded.reset();
    assert_ne!(random_bytes(&mut seeded), expected);
}
