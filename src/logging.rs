//! Process logging setup and the diagnostic output channel.
//!
//! Process logs go through `tracing`. The output channel is the separate,
//! user-visible diagnostic stream that tool failures are reported to; writes
//! to it are always best-effort.

use std::env;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter (e.g., "debug", "info", "warn", "error")
    pub level: String,
    /// Optional log file path. If None, logs only to stderr
    pub file_path: Option<PathBuf>,
    /// Whether to use structured JSON format for logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Create LogConfig from environment variables
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let unique = env::var("CPP_ASSIST_LOG_UNIQUE").unwrap_or_default() == "true";
        let file_path = env::var("CPP_ASSIST_LOG_FILE")
            .ok()
            .map(|path| log_file_path(PathBuf::from(path), unique, std::process::id()));
        let json_format = env::var("CPP_ASSIST_LOG_JSON").unwrap_or_default() == "true";

        Self {
            level,
            file_path,
            json_format,
        }
    }

    /// Override values from CLI arguments
    pub fn with_overrides(mut self, level: Option<String>, file_path: Option<PathBuf>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        if let Some(file_path) = file_path {
            self.file_path = Some(file_path);
        }
        self
    }
}

/// Insert the process id before the extension when `unique` is set, so
/// several bridge processes can share one log directory.
fn log_file_path(mut path: PathBuf, unique: bool, pid: u32) -> PathBuf {
    if !unique {
        return path;
    }
    if let Some(stem) = path.file_stem() {
        let stem = stem.to_string_lossy();
        let unique_name = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{stem}.{pid}.{ext}"),
            _ => format!("{stem}.{pid}"),
        };
        path.set_file_name(unique_name);
    }
    path
}

/// Initialize the logging system based on configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_new(&config.level).or_else(|_| EnvFilter::try_new("info"))?;
    let subscriber = tracing_subscriber::registry().with(env_filter);

    match (&config.file_path, config.json_format) {
        (Some(file_path), true) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            let file_layer = fmt::layer().json().with_writer(file).with_ansi(false);
            subscriber.with(file_layer).init();
        }
        (Some(file_path), false) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            let file_layer = fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);
            subscriber.with(file_layer).init();
        }
        (None, true) => {
            let stderr_layer = fmt::layer().json().with_writer(io::stderr).with_ansi(false);
            subscriber.with(stderr_layer).init();
        }
        // stdout carries the MCP protocol, so human-readable logs go to stderr
        (None, false) => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);
            subscriber.with(stderr_layer).init();
        }
    }

    Ok(())
}

// ============================================================================
// Diagnostic output channel
// ============================================================================

/// User-visible diagnostic stream for tool failures.
pub trait OutputChannel: Send + Sync {
    fn append_line(&self, line: &str) -> io::Result<()>;
}

/// Append a line to the output channel, discarding any failure.
///
/// Reporting an error must never turn into a second error for the caller.
pub fn append_line_best_effort(channel: &dyn OutputChannel, line: &str) {
    if let Err(e) = channel.append_line(line) {
        tracing::debug!("Dropped output channel line: {}", e);
    }
}

/// Output channel backed by an append-only file.
#[derive(Debug)]
pub struct FileOutputChannel {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileOutputChannel {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputChannel for FileOutputChannel {
    fn append_line(&self, line: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("output channel lock poisoned"))?;
        writeln!(file, "{line}")?;
        file.flush()
    }
}

/// Output channel that forwards lines to the process log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingOutputChannel;

impl OutputChannel for TracingOutputChannel {
    fn append_line(&self, line: &str) -> io::Result<()> {
        tracing::warn!(target: "output", "{}", line);
        Ok(())
    }
}

/// Helper function to log structured MCP requests/responses in one line
#[macro_export]
macro_rules! log_mcp_message {
    ($level:expr, $direction:expr, $method:expr, $data:expr) => {
        tracing::event!(
            $level,
            direction = $direction,
            method = $method,
            data = ?$data,
            pid = std::process::id(),
            "MCP message"
        );
    };
}

/// Helper function to log structured LSP requests/responses in one line
#[macro_export]
macro_rules! log_lsp_message {
    ($level:expr, $direction:expr, $method:expr, $data:expr) => {
        tracing::event!(
            $level,
            direction = $direction,
            method = $method,
            data = ?$data,
            pid = std::process::id(),
            "LSP message"
        );
    };
}

/// Helper function to log performance timing
#[macro_export]
macro_rules! log_timing {
    ($level:expr, $operation:expr, $duration:expr) => {
        tracing::event!(
            $level,
            operation = $operation,
            duration_ms = $duration.as_millis(),
            pid = std::process::id(),
            "Performance timing"
        );
    };
}
