/// Size of the addressable memory in bytes.
pub const CHIP8_MEMORY_SIZE: usize = 4096;

/// Mask that wraps any address into the addressable memory.
pub const CHIP8_ADDRESS_MASK: u16 = 0x0FFF;

/// Address at which programs are loaded and execution starts.
pub const CHIP8_PROGRAM_START: u16 = 0x200;

/// Largest program that fits between `CHIP8_PROGRAM_START` and the end of memory.
pub const CHIP8_MAX_PROGRAM_SIZE: usize = CHIP8_MEMORY_SIZE - CHIP8_PROGRAM_START as usize;

pub const CHIP8_REGISTER_COUNT: usize = 16;

pub const CHIP8_STACK_DEPTH: usize = 16;

pub const CHIP8_KEY_COUNT: usize = 16;

pub const CHIP8_DISPLAY_WIDTH: usize = 64;

pub const CHIP8_DISPLAY_HEIGHT: usize = 32;

pub const CHIP8_DISPLAY_SIZE: usize = CHIP8_DISPLAY_WIDTH * CHIP8_DISPLAY_HEIGHT;

pub const CHIP8_CHARSET_OFFSET: u16 = 0x50; // 80

pub const CHIP8_CHARSET_LEN: u16 = 0x50; // 80

/// Height in bytes of a single glyph of the charset.
pub const CHIP8_GLYPH_SIZE: u16 = 5;

pub const CHIP8_CHARSET: [u8; CHIP8_CHARSET_LEN as usize] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Number of instructions before the program counter shown in a debug snapshot.
pub const CHIP8_DEBUG_WINDOW_BEFORE: u16 = 4;

/// Number of instructions from the program counter on shown in a debug snapshot.
pub const CHIP8_DEBUG_WINDOW_AFTER: u16 = 8;

pub const CHIP8_SNAPSHOT_MAGIC: [u8; 4] = *b"C8VM";

pub const CHIP8_SNAPSHOT_VERSION: u8 = 2;
