use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};
use tracing::{Event, Level, Subscriber, warn};
use tracing_subscriber::{
    EnvFilter,
    Layer, // Layer is used by .with_filter() on the stdout layer below
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

use crate::config::DEFAULT_LOG_LEVEL;

// --- Formatter ---

struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(
            writer,
            "{} ",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi {
            level_colors(meta.level())
        } else {
            ("", "")
        };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if let (Some(file), Some(line)) = (meta.file().map(short_path), meta.line()) {
            if ansi {
                write!(writer, "\x1b[36m{file}:{line}\x1b[0m ")?;
            } else {
                write!(writer, "{file}:{line} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_colors(level: &Level) -> (&'static str, &'static str) {
    match *level {
        Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
        Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
        Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
        Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
        Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
    }
}

/// Drops the crate-relative `src/` prefix so locations stay short.
fn short_path(file: &str) -> &str {
    file.strip_prefix("src/")
        .or_else(|| file.strip_prefix("src\\"))
        .unwrap_or(file)
}

// --- Late-bound file writer ---

/// A MakeWriter that can be pointed at a file after initialization.
/// While no file is set, all writes are silently discarded.
#[derive(Clone)]
struct FileSlot(Arc<Mutex<Option<File>>>);

struct SlotWriter<'a>(MutexGuard<'a, Option<File>>);

impl Write for SlotWriter<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        match &mut *self.0 {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match &mut *self.0 {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileSlot {
    type Writer = SlotWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        SlotWriter(lock_slot(&self.0))
    }
}

// A panic while holding the slot only loses a partial line; keep logging.
fn lock_slot(slot: &Mutex<Option<File>>) -> MutexGuard<'_, Option<File>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Runtime controls ---

type ReloadLevel = Box<dyn Fn(EnvFilter) -> Result<()> + Send + Sync>;

/// Everything that can be changed after [`init_default_logging`].
struct Controls {
    level: ReloadLevel,
    stdout_gate: ReloadLevel,
    file: Arc<Mutex<Option<File>>>,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS.get().context("logging not yet initialized")
}

fn reloader<S>(handle: reload::Handle<EnvFilter, S>) -> ReloadLevel
where
    S: Subscriber + Send + Sync + 'static,
{
    Box::new(move |filter| {
        handle
            .reload(filter)
            .map_err(|e| anyhow::anyhow!("filter reload failed: {e}"))
    })
}

fn startup_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

// --- Public API ---

/// Replaces the global filter. Accepts a bare level ("warn", "debug", ...)
/// or any EnvFilter directive such as `finfolio_core=trace,info`.
pub fn set_log_level(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}"))?;
    (controls()?.level)(filter)
}

/// Shows or hides stdout output. The file layer keeps logging either way.
pub fn set_stdout_enabled(enabled: bool) -> Result<()> {
    // The global filter stays the ceiling, so "trace" here means "no extra limit".
    let gate = if enabled { "trace" } else { "off" };
    (controls()?.stdout_gate)(EnvFilter::new(gate))
}

/// Starts appending log records to `path`, replacing any file already in
/// use. The parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let controls = controls()?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file '{}'", path.display()))?;
    *lock_slot(&controls.file) = Some(file);
    Ok(())
}

/// Closes the log file, flushing what was written.
pub fn disable_file_logging() {
    if let Ok(controls) = controls() {
        *lock_slot(&controls.file) = None;
    }
}

/// Guard returned by [`pause_stdout`].
#[must_use = "stdout logging resumes as soon as the guard is dropped"]
pub struct StdoutPause(());

/// Switches stdout logging off until the returned guard is dropped.
///
/// The form takes over the terminal, so anything printed to stdout would be
/// drawn over it.
pub fn pause_stdout() -> StdoutPause {
    if let Err(error) = set_stdout_enabled(false) {
        warn!(%error, "could not pause stdout logging");
    }
    StdoutPause(())
}

impl Drop for StdoutPause {
    fn drop(&mut self) {
        // Not initialized means nothing was paused.
        let _ = set_stdout_enabled(true);
    }
}

/// Installs the global subscriber. Call once at startup; later calls are
/// ignored.
///
/// Records go to stdout (colored on a terminal) and, once
/// [`enable_file_logging`] is called, to a file. The starting level comes
/// from `RUST_LOG`, or `info` when unset.
pub fn init_default_logging() {
    let file: Arc<Mutex<Option<File>>> = Arc::new(Mutex::new(None));

    let (level_filter, level_handle) = reload::Layer::new(startup_filter());
    let (stdout_gate, stdout_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let stdout_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stdout().is_terminal())
        .with_filter(stdout_gate);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(false)
        .with_writer(FileSlot(file.clone()));

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        let _ = CONTROLS.set(Controls {
            level: reloader(level_handle),
            stdout_gate: reloader(stdout_handle),
            file,
        });
    }
}
