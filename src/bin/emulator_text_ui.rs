use crossbeam_channel::{bounded, Receiver, Sender};
use cursive::{
    view::Nameable,
    views::{Dialog, LinearLayout, TextView},
    CbSink, Cursive,
};
use log::{info, warn, LevelFilter};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chip8_vm::chip::{
    chip8::cursive_display::FrameView,
    session::{Session, SessionHandle},
};
use chip8_vm::{Chip8, CycleOutcome, DebugSnapshot, Frame, LoadRomError, Quirks};

/// The name under which the display view is registered with cursive.
const DISPLAY: &str = "display";

/// The name of the status line below the display.
const STATUS: &str = "status";

/// The rate at which timers tick and the display is refreshed.
const FRAME_TIME: Duration = Duration::from_micros(16_667);

const MIN_CLOCK_HZ: u32 = 60;
const MAX_CLOCK_HZ: u32 = 6000;

/// Error type for errors that occur during parsing the command line arguments
/// and loading the program based on the arguments.
enum Error {
    InvalidUsage(String),
    Io(PathBuf, std::io::Error),
    InvalidConfig(serde_json::Error),
    InvalidProgram(LoadRomError),
}

/// Settings read from the optional JSON file passed after the program path.
#[derive(Deserialize)]
#[serde(default)]
struct Config {
    /// Instructions executed per second.
    clock_hz: u32,
    quirks: Quirks,
    /// Addresses to halt at, set before the program starts.
    breakpoints: Vec<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_hz: 600,
            quirks: Quirks::default(),
            breakpoints: Vec::new(),
        }
    }
}

/// Represents an event to be processed by the event loop that concerns the
/// driver rather than the machine.
#[derive(Clone, Copy)]
enum Event {
    /// Raises the clock rate.
    SpeedUp,

    /// Lowers the clock rate.
    SlowDown,

    /// Pauses a running machine, resumes a halted one.
    TogglePause,
}

/// Represents the channels available to the event loop.
struct EventLoopChannels {
    /// The channel to send the UI refresh messages to.
    gfx_sender: CbSink,

    /// The channel on which the Events are received.
    event_receiver: Receiver<Event>,

    /// A channel to report that the thread has completed
    /// shutdown.
    shutdown_sender: Sender<()>,
}

/// The event loop. Runs once per frame: (1) apply pending session commands
/// and events. (2) Run the cycles of one frame. (3) Tick the timers and push
/// the display to the UI if it changed. (4) Sleep for the rest of the frame.
fn event_loop(mut session: Session, handle: SessionHandle, mut clock_hz: u32, io: EventLoopChannels) {
    while session.process_commands() {
        let frame_start = Instant::now();

        while let Ok(event) = io.event_receiver.try_recv() {
            match event {
                Event::SpeedUp => {
                    clock_hz = (clock_hz * 2).min(MAX_CLOCK_HZ);
                    info!("Clock [hz: {}]", clock_hz);
                }
                Event::SlowDown => {
                    clock_hz = (clock_hz / 2).max(MIN_CLOCK_HZ);
                    info!("Clock [hz: {}]", clock_hz);
                }
                Event::TogglePause if session.chip().is_running() => {
                    let _ = handle.pause();
                }
                Event::TogglePause => {
                    let _ = handle.resume();
                    let _ = show_status(&io.gfx_sender, String::new());
                }
            }
        }

        let diagnostics = session.run_cycles(clock_hz / 60);
        if let Some(status) = diagnostics.iter().rev().find_map(describe_outcome) {
            if show_status(&io.gfx_sender, status).is_err() {
                break;
            }
        }

        if let Some(frame) = session.tick() {
            if show_frame(&io.gfx_sender, frame).is_err() {
                break;
            }
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    let _ = io.shutdown_sender.send(());
}

/// Hands a changed frame to the UI thread.
fn show_frame(gfx_sender: &CbSink, frame: Frame) -> Result<(), ()> {
    gfx_sender
        .send(Box::new(move |s: &mut Cursive| {
            s.call_on_name(DISPLAY, |view: &mut FrameView| view.set_frame(frame));
        }))
        .map_err(|_| ())
}

/// Replaces the text of the status line.
fn show_status(gfx_sender: &CbSink, status: String) -> Result<(), ()> {
    gfx_sender
        .send(Box::new(move |s: &mut Cursive| {
            s.call_on_name(STATUS, |view: &mut TextView| view.set_content(status));
        }))
        .map_err(|_| ())
}

/// The status line text for outcomes the user should see.
fn describe_outcome(outcome: &CycleOutcome) -> Option<String> {
    match *outcome {
        CycleOutcome::Breakpoint(address) => Some(format!(
            "Breakpoint at {:#05X}, press p to continue",
            address
        )),
        CycleOutcome::UnknownOpcode { address, opcode } => Some(format!(
            "Skipped unknown opcode {:04X} at {:#05X}",
            opcode, address
        )),
        CycleOutcome::StackOverflow(address) => {
            Some(format!("Halted: stack overflow at {:#05X}", address))
        }
        CycleOutcome::StackUnderflow(address) => {
            Some(format!("Halted: stack underflow at {:#05X}", address))
        }
        CycleOutcome::Halted | CycleOutcome::Executed(_) | CycleOutcome::WaitingForKey => None,
    }
}

/// Reads the program and the optional config named by the arguments.
fn load_from_args() -> Result<(PathBuf, Vec<u8>, Config), Error> {
    let args: Vec<String> = env::args().collect();
    let (rom_path, config_path) = match args.len() {
        2 => (PathBuf::from(&args[1]), None),
        3 => (PathBuf::from(&args[1]), Some(PathBuf::from(&args[2]))),
        _ => {
            return Err(Error::InvalidUsage(
                "emulator_text_ui <program> [config.json]".to_string(),
            ))
        }
    };

    let rom = fs::read(&rom_path).map_err(|e| Error::Io(rom_path.clone(), e))?;
    let config = match config_path {
        Some(path) => {
            let text = fs::read_to_string(&path).map_err(|e| Error::Io(path.clone(), e))?;
            serde_json::from_str(&text).map_err(Error::InvalidConfig)?
        }
        None => Config::default(),
    };
    Ok((rom_path, rom, config))
}

fn state_path(rom_path: &Path) -> PathBuf {
    rom_path.with_extension("c8state")
}

fn save_state(handle: &SessionHandle, path: &Path) {
    match handle.save_state() {
        Ok(bytes) => match fs::write(path, bytes) {
            Ok(()) => info!("Saved state [path: {}]", path.display()),
            Err(e) => warn!("Saving state failed [path: {}] [error: {}]", path.display(), e),
        },
        Err(e) => warn!("{}", e),
    }
}

fn load_state(handle: &SessionHandle, path: &Path) {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Loading state failed [path: {}] [error: {}]", path.display(), e);
            return;
        }
    };
    match handle.load_state(bytes) {
        Ok(Ok(())) => info!("Loaded state [path: {}]", path.display()),
        Ok(Err(e)) => warn!("Loading state failed [path: {}] [error: {}]", path.display(), e),
        Err(e) => warn!("{}", e),
    }
}

/// Formats registers and the disassembly around the program counter.
fn describe(snapshot: &DebugSnapshot) -> String {
    let mut text = format!(
        "PC {:#05X}  I {:#05X}  SP {}  DT {}  ST {}  {}\n",
        snapshot.program_counter,
        snapshot.index,
        snapshot.stack_pointer,
        snapshot.delay_timer,
        snapshot.sound_timer,
        if snapshot.running { "running" } else { "halted" },
    );
    for (reg, value) in snapshot.registers.iter().enumerate() {
        text.push_str(&format!("V{:X} {:02X} ", reg, value));
        if reg % 8 == 7 {
            text.push('\n');
        }
    }
    text.push('\n');
    for line in &snapshot.disassembly {
        text.push_str(&format!(
            "{}{} {:03X}  {:04X}  {}\n",
            if line.current { '>' } else { ' ' },
            if line.breakpoint { '*' } else { ' ' },
            line.address,
            line.opcode,
            line.mnemonic,
        ));
    }
    text
}

/// Constructs the UI and spawns the event loop and the UI thread.
fn main() {
    let (rom_path, rom, config) = match load_from_args() {
        Ok(loaded) => loaded,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let mut chip8 = Chip8::with_quirks(config.quirks, rand::random());
    for &address in &config.breakpoints {
        chip8.set_breakpoint(address);
    }
    if let Err(e) = chip8.load_rom(&rom) {
        println!("{}", Error::InvalidProgram(e));
        return;
    }

    cursive::logger::init();
    log::set_max_level(LevelFilter::Info);

    let mut siv = cursive::default();

    let (session, handle) = Session::new(chip8);
    let (event_sender, event_receiver) = bounded::<Event>(10);
    let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);

    let io = EventLoopChannels {
        gfx_sender: siv.cb_sink().clone(),
        event_receiver,
        shutdown_sender,
    };
    let driver_handle = handle.clone();
    let clock_hz = config.clock_hz.max(MIN_CLOCK_HZ).min(MAX_CLOCK_HZ);
    std::thread::spawn(move || event_loop(session, driver_handle, clock_hz, io));

    let quit_handle = handle.clone();
    siv.add_global_callback(cursive::event::Key::Esc, move |s| {
        if quit_handle.quit().is_ok() {
            let _ = shutdown_receiver.recv();
        }
        s.quit();
    });

    for &(c, key) in &[
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ] {
        let handle = handle.clone();
        siv.add_global_callback(c, move |_s| {
            let _ = handle.key_down(key);
        });
    }

    // Terminals only report key presses, so releasing is a key of its own.
    let release_handle = handle.clone();
    siv.add_global_callback(' ', move |_s| {
        let _ = release_handle.release_all_keys();
    });

    for (trigger, event) in vec![
        (cursive::event::Event::Key(cursive::event::Key::Up), Event::SpeedUp),
        (cursive::event::Event::Key(cursive::event::Key::Down), Event::SlowDown),
        (cursive::event::Event::Char('p'), Event::TogglePause),
    ] {
        let sender = event_sender.clone();
        siv.add_global_callback(trigger, move |_s| {
            let _ = sender.try_send(event);
        });
    }

    let path = state_path(&rom_path);
    let save_handle = handle.clone();
    let save_path = path.clone();
    siv.add_global_callback(cursive::event::Key::F5, move |_s| {
        save_state(&save_handle, &save_path);
    });
    let load_handle = handle.clone();
    siv.add_global_callback(cursive::event::Key::F9, move |_s| {
        load_state(&load_handle, &path);
    });

    let debug_handle = handle;
    siv.add_global_callback('g', move |s| {
        if let Ok(snapshot) = debug_handle.debug_snapshot() {
            s.add_layer(
                Dialog::around(TextView::new(describe(&snapshot)))
                    .title("Machine")
                    .button("Close", |s| {
                        s.pop_layer();
                    }),
            );
        }
    });
    siv.add_global_callback('~', Cursive::toggle_debug_console);

    siv.add_layer(
        LinearLayout::vertical()
            .child(FrameView::default().with_name(DISPLAY))
            .child(TextView::new("").with_name(STATUS)),
    );

    siv.run();
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidUsage(message) => write!(f, "Usage: {}", message),
            Error::Io(path, error) => write!(f, "Could not read {}: {}", path.display(), error),
            Error::InvalidConfig(error) => write!(f, "Invalid config: {}", error),
            Error::InvalidProgram(error) => write!(f, "{}", error),
        }
    }
}
