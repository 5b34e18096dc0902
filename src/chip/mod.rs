pub mod chip8;
pub mod session;

/// The interface a host driver uses to run a chip. It covers the calls a
/// driver makes every frame; debugging and save states are specific to the
/// concrete chip.
pub trait Chip {
    /// The type used to address an input pin (a key).
    type PinAddress;

    /// The frame type handed out to the host for rendering.
    type Frame;

    /// The per-cycle report returned by [`Chip::cycle`].
    type Outcome;

    /// Loads a program image and marks the chip as running.
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadRomError>;

    /// Executes a single instruction.
    fn cycle(&mut self) -> Self::Outcome;

    /// Advances the timers by one 60 Hz step.
    fn tick(&mut self);

    /// Sets or clears a single input pin. Addresses the chip does not know
    /// about are ignored.
    fn set_input_pin(&mut self, pin: Self::PinAddress, value: bool);

    /// Clears all input pins.
    fn reset_input_pins(&mut self);

    /// Returns a copy of the output if it changed since the last call.
    fn take_changed_frame(&mut self) -> Option<Self::Frame>;

    /// Whether the host should currently be producing a tone.
    fn sound_active(&self) -> bool;
}

/// Error returned when a program image can not be loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRomError {
    /// The program does not fit into program memory. Carries the size of
    /// the rejected program in bytes.
    RomTooLarge(usize),
}

impl std::fmt::Display for LoadRomError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LoadRomError::RomTooLarge(size) => write!(
                f,
                "Program too large: {} bytes, at most {} bytes fit into program memory.",
                size,
                chip8::constants::CHIP8_MAX_PROGRAM_SIZE
            ),
        }
    }
}

impl std::error::Error for LoadRomError {}

/// Error returned when a saved machine state fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// The input does not start with the snapshot magic bytes.
    BadMagic,
    /// The snapshot was written by a format version this build can not read.
    UnsupportedVersion(u8),
    /// The input ended before all fields were read.
    Truncated { expected: usize, actual: usize },
    /// The input carries bytes past the end of the last field.
    TrailingBytes(usize),
    /// A field holds a value outside of its valid range.
    InvalidField { field: &'static str, value: u32 },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SnapshotError::BadMagic => write!(f, "Invalid snapshot: missing magic header."),
            SnapshotError::UnsupportedVersion(version) => {
                write!(f, "Invalid snapshot: unsupported format version {}.", version)
            }
            SnapshotError::Truncated { expected, actual } => write!(
                f,
                "Invalid snapshot: truncated, needed {} bytes but only {} are present.",
                expected, actual
            ),
            SnapshotError::TrailingBytes(count) => {
                write!(f, "Invalid snapshot: {} unexpected trailing bytes.", count)
            }
            SnapshotError::InvalidField { field, value } => write!(
                f,
                "Invalid snapshot: field `{}` holds out of range value {:#x}.",
                field, value
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}
