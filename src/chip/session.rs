//! Serializes access to a [`Chip8`] shared between a driver thread and UI
//! threads. The driver thread owns the machine inside a [`Session`]; every
//! other thread holds a [`SessionHandle`] and sends [`Command`]s, which the
//! session applies between cycles. No two mutations ever interleave.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::debug;

use crate::chip::{
    chip8::{Chip8, CycleOutcome, DebugSnapshot, Frame},
    Chip, LoadRomError, SnapshotError,
};

/// A request to mutate or inspect the machine. Requests that produce a
/// result carry the channel to send it on.
pub enum Command {
    KeyDown(u8),
    KeyUp(u8),
    ReleaseAllKeys,
    SetBreakpoint(u16),
    ClearBreakpoint(u16),
    Pause,
    Resume,
    Reset,
    LoadRom(Vec<u8>, Sender<Result<(), LoadRomError>>),
    SaveState(Sender<Vec<u8>>),
    LoadState(Vec<u8>, Sender<Result<(), SnapshotError>>),
    DebugSnapshot(Sender<DebugSnapshot>),
    Quit,
}

/// The driver side of a session. Owns the machine.
pub struct Session {
    chip: Chip8,
    commands: Receiver<Command>,
}

/// The UI side of a session. Cheap to clone, one per thread.
#[derive(Clone)]
pub struct SessionHandle {
    commands: Sender<Command>,
}

/// Error returned by handle requests when the session is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClosed;

impl std::fmt::Display for SessionClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "The emulation session has shut down.")
    }
}

impl std::error::Error for SessionClosed {}

impl Session {
    pub fn new(chip: Chip8) -> (Session, SessionHandle) {
        let (sender, receiver) = unbounded();
        (
            Session {
                chip,
                commands: receiver,
            },
            SessionHandle { commands: sender },
        )
    }

    /// Applies all pending commands. Returns false once the session should
    /// shut down, either on `Quit` or because every handle was dropped.
    pub fn process_commands(&mut self) -> bool {
        loop {
            match self.commands.try_recv() {
                Ok(Command::Quit) => {
                    debug!("Session quit");
                    return false;
                }
                Ok(command) => self.apply(command),
                Err(crossbeam_channel::TryRecvError::Empty) => return true,
                Err(crossbeam_channel::TryRecvError::Disconnected) => return false,
            }
        }
    }

    fn apply(&mut self, command: Command) {
        // A dropped reply receiver means the requester stopped waiting; the
        // command still takes effect.
        match command {
            Command::KeyDown(key) => self.chip.key_down(key),
            Command::KeyUp(key) => self.chip.key_up(key),
            Command::ReleaseAllKeys => self.chip.reset_input_pins(),
            Command::SetBreakpoint(address) => self.chip.set_breakpoint(address),
            Command::ClearBreakpoint(address) => self.chip.clear_breakpoint(address),
            Command::Pause => self.chip.pause(),
            Command::Resume => self.chip.resume(),
            Command::Reset => self.chip.reset(),
            Command::LoadRom(rom, reply) => {
                let _ = reply.send(self.chip.load_rom(&rom));
            }
            Command::SaveState(reply) => {
                let _ = reply.send(self.chip.serialize());
            }
            Command::LoadState(bytes, reply) => {
                let _ = reply.send(self.chip.load_state(&bytes));
            }
            Command::DebugSnapshot(reply) => {
                let _ = reply.send(self.chip.debug_snapshot());
            }
            Command::Quit => {}
        }
    }

    /// Runs up to `cycles` cycles, stopping early once the machine halts.
    /// Returns the outcomes worth reporting to a user: unknown opcodes,
    /// stack faults and breakpoint hits.
    pub fn run_cycles(&mut self, cycles: u32) -> Vec<CycleOutcome> {
        let mut diagnostics = Vec::new();
        for _ in 0..cycles {
            match self.chip.cycle() {
                CycleOutcome::Halted => break,
                CycleOutcome::Executed(_) | CycleOutcome::WaitingForKey => {}
                outcome => diagnostics.push(outcome),
            }
        }
        diagnostics
    }

    /// Advances the timers and returns the display if it changed.
    pub fn tick(&mut self) -> Option<Frame> {
        self.chip.tick();
        self.chip.take_changed_framebuffer()
    }

    pub fn chip(&self) -> &Chip8 {
        &self.chip
    }
}

impl SessionHandle {
    fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.commands.send(command).map_err(|_| SessionClosed)
    }

    /// Sends a command carrying a reply channel and waits for the reply.
    fn request<T>(&self, command: impl FnOnce(Sender<T>) -> Command) -> Result<T, SessionClosed> {
        let (reply, response) = bounded(1);
        self.send(command(reply))?;
        response.recv().map_err(|_| SessionClosed)
    }

    pub fn key_down(&self, key: u8) -> Result<(), SessionClosed> {
        self.send(Command::KeyDown(key))
    }

    pub fn key_up(&self, key: u8) -> Result<(), SessionClosed> {
        self.send(Command::KeyUp(key))
    }

    pub fn release_all_keys(&self) -> Result<(), SessionClosed> {
        self.send(Command::ReleaseAllKeys)
    }

    pub fn set_breakpoint(&self, address: u16) -> Result<(), SessionClosed> {
        self.send(Command::SetBreakpoint(address))
    }

    pub fn clear_breakpoint(&self, address: u16) -> Result<(), SessionClosed> {
        self.send(Command::ClearBreakpoint(address))
    }

    pub fn pause(&self) -> Result<(), SessionClosed> {
        self.send(Command::Pause)
    }

    pub fn resume(&self) -> Result<(), SessionClosed> {
        self.send(Command::Resume)
    }

    pub fn reset(&self) -> Result<(), SessionClosed> {
        self.send(Command::Reset)
    }

    pub fn quit(&self) -> Result<(), SessionClosed> {
        self.send(Command::Quit)
    }

    /// Blocks until the driver thread processed the request.
    pub fn load_rom(&self, rom: Vec<u8>) -> Result<Result<(), LoadRomError>, SessionClosed> {
        self.request(|reply| Command::LoadRom(rom, reply))
    }

    /// Blocks until the driver thread processed the request.
    pub fn save_state(&self) -> Result<Vec<u8>, SessionClosed> {
        self.request(Command::SaveState)
    }

    /// Blocks until the driver thread processed the request.
    pub fn load_state(&self, bytes: Vec<u8>) -> Result<Result<(), SnapshotError>, SessionClosed> {
        self.request(|reply| Command::LoadState(bytes, reply))
    }

    /// Blocks until the driver thread processed the request.
    pub fn debug_snapshot(&self) -> Result<DebugSnapshot, SessionClosed> {
        self.request(Command::DebugSnapshot)
    }
}
