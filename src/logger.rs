//! Terminal output with colored prefixes.
//!
//! - `log!` prints a line with a colored module prefix
//! - `debug!` prints only with `--verbose`
//! - [`log_entry`] prints a renderer diagnostic in its severity color
//! - `status_*` drive the watch-mode status block, which each render outcome
//!   overwrites in place
//!
//! ```ignore
//! log!("watch"; "watching {}", path.display());
//! debug!("scheduler"; "generation {} started", generation);
//! logger::status_success("rendered song.cho (12.4 KiB)");
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::{
    io::{Write, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::diagnostic::LogEntry;

/// Set by `--verbose`
static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Line output
// ============================================================================

#[inline]
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Print one diagnostic, prefixed with its severity.
pub fn log_entry(entry: &LogEntry) {
    log(entry.severity.label(), &entry.to_string());
}

fn colorize_prefix(module: &str) -> String {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "render" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        "warning" => prefix.bright_magenta().bold().to_string(),
        "notice" => prefix.dimmed().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Watch status block
// ============================================================================

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Leading mark of a status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Busy,
    Ok,
    Warn,
    Fail,
    Quiet,
}

impl Mark {
    fn render(self) -> String {
        match self {
            Self::Busy => "…".dimmed().to_string(),
            Self::Ok => "✓".green().to_string(),
            Self::Warn => "⚠".yellow().to_string(),
            Self::Fail => "✗".red().to_string(),
            Self::Quiet => String::new(),
        }
    }
}

/// Status block for watch mode.
///
/// Each call replaces the block printed by the previous one, so the terminal
/// only ever shows the latest render outcome with its diagnostics.
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    /// A render is running; replaced by its outcome.
    pub fn rendering(&mut self, message: &str) {
        self.display(Mark::Busy, &message.dimmed().to_string());
    }

    pub fn success(&mut self, message: &str) {
        self.display(Mark::Ok, message);
    }

    pub fn unchanged(&mut self, message: &str) {
        self.display(Mark::Quiet, &message.dimmed().to_string());
    }

    pub fn error(&mut self, summary: &str, detail: &str) {
        self.display(Mark::Fail, &with_detail(summary, detail));
    }

    pub fn warning(&mut self, detail: &str) {
        self.display(Mark::Warn, detail);
    }

    fn display(&mut self, mark: Mark, message: &str) {
        let mut stdout = stdout().lock();

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(stdout, cursor::MoveUp(lines)).ok();
            execute!(stdout, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        let line = match mark {
            Mark::Quiet => format!("{timestamp} {message}"),
            mark => format!("{timestamp} {} {message}", mark.render()),
        };

        writeln!(stdout, "{line}").ok();
        stdout.flush().ok();

        self.last_lines = line_count(message);
    }
}

fn with_detail(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Detail line for one entry inside a status block.
pub fn status_line(entry: &LogEntry) -> String {
    format!("  {:<7} {entry}", entry.severity.label())
}

pub fn status_rendering(message: &str) {
    WATCH_STATUS.lock().rendering(message);
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

pub fn status_unchanged(message: &str) {
    WATCH_STATUS.lock().unchanged(message);
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

pub fn status_warning(detail: &str) {
    WATCH_STATUS.lock().warning(detail);
}
