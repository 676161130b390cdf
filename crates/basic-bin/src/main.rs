//! `basic` — command-line driver for the interpreter core (SPEC_FULL.md §6,
//! the "thin glue" the core purposely excludes). Parses a CLI argument,
//! loads `basic.toml`, wires a terminal `Console`/`Display` pair, and runs
//! the program to completion.

use std::io::{Write, stdout};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use anyhow::{Context, Result};
use basic_collab::{Console, Display};
use basic_eval::Interpreter;
use clap::Parser;
use crossbeam_channel::{Receiver, Sender, bounded};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event as CtEvent, KeyCode, KeyEventKind, KeyModifiers},
    execute, queue,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

const KEY_QUEUE_CAP: usize = 256;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "basic", version, about = "GW-BASIC/QBasic-compatible interpreter")]
struct Args {
    /// Path to a BASIC source file to load and run.
    program: PathBuf,
    /// Optional configuration file path (overrides discovery of `basic.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn configure_logging(level: &str) -> Option<WorkerGuard> {
    let log_dir = std::path::Path::new(".");
    let log_path = log_dir.join("basic.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "basic.log");
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = if level.is_empty() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        tracing_subscriber::EnvFilter::new(level)
    };
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(_) => Some(guard),
        Err(_) => None,
    }
}

fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

/// RAII guard for raw mode + the alternate screen, mirroring the teacher's
/// `core_terminal::{CrosstermBackend, TerminalGuard}` restoration pattern.
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self { active: true })
    }

    fn leave(&mut self) {
        if self.active {
            let _ = execute!(stdout(), LeaveAlternateScreen, Show);
            let _ = disable_raw_mode();
            self.active = false;
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.leave();
    }
}

/// Pushed by the background reader thread, drained by `Console::read_key`
/// (spec.md §5.1 "Key queue implementation"): a single bounded SPSC channel,
/// not one per collaborator — `Display`'s own key polling is a stub since
/// the platform display bridge is out of scope (spec.md §1).
fn spawn_key_reader(quit: Arc<AtomicBool>) -> Receiver<String> {
    let (tx, rx): (Sender<String>, Receiver<String>) = bounded(KEY_QUEUE_CAP);
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(50)) {
                Ok(true) => match event::read() {
                    Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                            quit.store(true, Ordering::SeqCst);
                            return;
                        }
                        if let Some(text) = key_to_text(key.code) {
                            // Full queue: drop the oldest key rather than block the reader.
                            let _ = tx.try_send(text);
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(target: "input", ?e, "key_read_error");
                        return;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    error!(target: "input", ?e, "poll_error");
                    return;
                }
            }
            if tx.is_full() {
                // Nobody is draining; back off instead of spinning.
                std::thread::sleep(Duration::from_millis(10));
            }
        }
    });
    rx
}

fn key_to_text(code: KeyCode) -> Option<String> {
    match code {
        KeyCode::Char(c) => Some(c.to_string()),
        KeyCode::Enter => Some("\r".to_string()),
        KeyCode::Backspace => Some("\u{8}".to_string()),
        KeyCode::Esc => Some("\u{1b}".to_string()),
        KeyCode::Up => Some("\u{0}H".to_string()),
        KeyCode::Down => Some("\u{0}P".to_string()),
        KeyCode::Left => Some("\u{0}K".to_string()),
        KeyCode::Right => Some("\u{0}M".to_string()),
        KeyCode::Tab => Some("\t".to_string()),
        _ => None,
    }
}

/// Raw-mode terminal `Console` (spec.md §6.1): writes CRLF explicitly since
/// raw mode disables the newline translation a cooked terminal would do.
struct TerminalConsole {
    keys: Receiver<String>,
}

impl TerminalConsole {
    fn new(keys: Receiver<String>) -> Self {
        Self { keys }
    }
}

impl Console for TerminalConsole {
    fn write(&mut self, text: &str) {
        let mut out = stdout();
        let _ = queue!(out, crossterm::style::Print(text.replace('\n', "\r\n")));
        let _ = out.flush();
    }

    fn write_line(&mut self, text: Option<&str>) {
        let mut out = stdout();
        if let Some(t) = text {
            let _ = queue!(out, crossterm::style::Print(t.replace('\n', "\r\n")));
        }
        let _ = queue!(out, crossterm::style::Print("\r\n"));
        let _ = out.flush();
    }

    fn read_line(&mut self) -> Option<String> {
        let mut buf = String::new();
        loop {
            match self.keys.recv() {
                Ok(text) if text == "\r" => {
                    let _ = queue!(stdout(), crossterm::style::Print("\r\n"));
                    let _ = stdout().flush();
                    return Some(buf);
                }
                Ok(text) if text == "\u{8}" => {
                    if buf.pop().is_some() {
                        let _ = queue!(stdout(), crossterm::style::Print("\u{8} \u{8}"));
                        let _ = stdout().flush();
                    }
                }
                Ok(text) => {
                    self.write(&text);
                    buf.push_str(&text);
                }
                Err(_) => return if buf.is_empty() { None } else { Some(buf) },
            }
        }
    }

    fn clear(&mut self) {
        let _ = execute!(stdout(), crossterm::terminal::Clear(crossterm::terminal::ClearType::All));
        let _ = execute!(stdout(), crossterm::cursor::MoveTo(0, 0));
    }

    fn read_key(&mut self) -> String {
        self.keys.try_recv().unwrap_or_default()
    }
}

/// The platform display bridge (window management, pixel presentation) is
/// explicitly out of scope (spec.md §1 "Out of scope"); this `Display`
/// satisfies the trait without attempting to rasterize `SCREEN`-mode pixels
/// onto a text terminal. `process_events` is the one live wire: it observes
/// the Ctrl+C flag the key reader thread sets.
struct TerminalDisplay {
    quit: Arc<AtomicBool>,
    valid: bool,
}

impl TerminalDisplay {
    fn new(quit: Arc<AtomicBool>) -> Self {
        Self { quit, valid: true }
    }
}

impl Display for TerminalDisplay {
    fn initialize(&mut self, w: u32, h: u32) {
        info!(target: "display", w, h, "display_initialize");
    }

    fn present(&mut self, _bgra: &[u8], _w: u32, _h: u32) {
        // No-op: see struct doc comment.
    }

    fn process_events(&mut self) -> bool {
        !self.quit.load(Ordering::SeqCst)
    }

    fn read_key(&mut self) -> String {
        String::new()
    }

    fn key_available(&mut self) -> bool {
        false
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn dispose(&mut self) {
        self.valid = false;
    }
}

fn run(args: Args) -> Result<()> {
    let source = std::fs::read_to_string(&args.program)
        .with_context(|| format!("reading {}", args.program.display()))?;

    let config = basic_config::load_from(args.config.clone())?;
    info!(target: "runtime", path = %args.program.display(), "startup");

    let quit = Arc::new(AtomicBool::new(false));
    let keys = spawn_key_reader(quit.clone());
    let console = TerminalConsole::new(keys);
    let display = TerminalDisplay::new(quit);

    let _guard = TerminalGuard::enter()?;

    let mut interp = Interpreter::initialize(&source, Box::new(console), Box::new(display), &config.runtime)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let result = interp.run_async(|interp| {
        let page = interp.env.graphics.visual_page();
        let (w, h) = (page.width(), page.height());
        let bytes = page.pixels().to_vec();
        interp.display.present(&bytes, w, h);
        if !interp.display.process_events() {
            interp.request_cancel();
        }
    });

    if let Err(e) = &result {
        error!(target: "runtime", code = e.code(), line = e.line(), "program_error");
    }
    result.map_err(|e| anyhow::anyhow!("{e}"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = basic_config::load_from(args.config.clone()).unwrap_or_default();
    let _log_guard = configure_logging(&config.logging.level);
    install_panic_hook();

    if let Err(e) = run(args) {
        eprintln!("?{e}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_to_text_maps_printable_and_control_keys() {
        assert_eq!(key_to_text(KeyCode::Char('a')), Some("a".to_string()));
        assert_eq!(key_to_text(KeyCode::Enter), Some("\r".to_string()));
        assert_eq!(key_to_text(KeyCode::Backspace), Some("\u{8}".to_string()));
        assert_eq!(key_to_text(KeyCode::F(1)), None);
    }

    #[test]
    fn terminal_display_process_events_stops_after_quit_flag() {
        let quit = Arc::new(AtomicBool::new(false));
        let mut display = TerminalDisplay::new(quit.clone());
        assert!(display.process_events());
        quit.store(true, Ordering::SeqCst);
        assert!(!display.process_events());
    }
}
