use log::{debug, info, Level};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, Once};

use crate::shared::errors::AppResult;

static INIT: Once = Once::new();

/// Initialize the logging system
/// This should be called once at application startup. Records go to stderr and,
/// when `log_file` is given, are appended to that file as well.
pub fn init_logger(log_file: Option<&Path>) -> AppResult<()> {
    let file = match log_file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    INIT.call_once(move || {
        let initialized = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Info) // Default level
            .filter_module("diesel", log::LevelFilter::Warn) // Reduce diesel noise
            .filter_module("reqwest", log::LevelFilter::Warn) // Reduce HTTP noise
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("tokio", log::LevelFilter::Warn)
            .parse_default_env()
            .format_timestamp_secs()
            .format_module_path(false)
            .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })))
            .try_init();

        if initialized.is_ok() {
            info!("Logging system initialized");
        }
    });

    Ok(())
}

/// Writes every record to stderr and mirrors it into the log file
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        log::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        log::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        log::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        log::error!($($arg)*)
    };
}

/// Logging capability handed to each pipeline component.
///
/// Components never reach for a global logger directly; they report through
/// whatever sink they were constructed with, so a test can swap in a
/// [`MemoryLog`] and assert on skip reasons.
pub trait PipelineLog: Send + Sync {
    fn record(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}

/// Forwards pipeline events to the `log` facade under a fixed target
#[derive(Debug, Clone)]
pub struct LogFacade {
    target: &'static str,
}

impl LogFacade {
    pub fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        Self::new("starter_packs::pipeline")
    }
}

impl PipelineLog for LogFacade {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: self.target, level, "{}", message);
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        match self.entries.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// True when some event at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|(lvl, msg)| *lvl == level && msg.contains(needle))
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.entries().iter().filter(|(lvl, _)| *lvl == level).count()
    }
}

impl PipelineLog for MemoryLog {
    fn record(&self, level: Level, message: &str) {
        let mut guard = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push((level, message.to_string()));
    }
}

/// Helper for timing operations
pub struct TimedOperation {
    start: std::time::Instant,
    operation: String,
}

impl TimedOperation {
    pub fn new(operation: &str) -> Self {
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation: operation.to_string(),
        }
    }

    pub fn finish_with_info(self, extra: &str) -> u64 {
        let duration = self.start.elapsed().as_millis() as u64;
        info!(
            "Performance: {} took {}ms ({})",
            self.operation, duration, extra
        );
        duration
    }
}
