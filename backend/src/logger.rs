//! Lookup log. Messages are appended to `log.txt` in the application directory
//! and, with `ENABLE_PRINT_LOG=true`, mirrored to stdout through `tracing`.
//!
//! Environment: `LOG_LEVEL` (silent, error, warn, info, debug; default info),
//! `DISABLE_LOG=true` to skip the file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, Utc};
use tracing_subscriber::EnvFilter;

use crate::get_create_versefinder_dir;

/// Rotated logs kept next to `log.txt`.
const KEEP_ROTATED: usize = 5;

/// A message is written when its level is at or below the configured one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Silent,
    Error,
    Warn,
    Info,
    Debug,
}

impl Level {
    pub fn parse(s: &str) -> Option<Self> {
        let level = match s.trim().to_lowercase().as_str() {
            "silent" | "off" => Level::Silent,
            "error" => Level::Error,
            "warn" | "warning" => Level::Warn,
            "info" => Level::Info,
            "debug" => Level::Debug,
            _ => return None,
        };
        Some(level)
    }

    fn label(self) -> &'static str {
        match self {
            Level::Silent => "",
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
        }
    }
}

/// Move an existing `log.txt` aside as `log.<modified time>.txt` and prune
/// the oldest rotated files.
fn rotate_log(log_file: &Path) -> Result<()> {
    if !log_file.try_exists().unwrap_or(false) {
        return Ok(());
    }
    let dir = log_file
        .parent()
        .ok_or_else(|| anyhow!("Log file without a directory: {}", log_file.display()))?;

    let modified: DateTime<Local> = fs::metadata(log_file)?.modified()?.into();
    let rotated = dir.join(format!("log.{}.txt", modified.format("%Y-%m-%dT%H-%M-%S")));
    fs::rename(log_file, &rotated).with_context(|| format!("Can't rotate {}", log_file.display()))?;

    // Timestamps in the names sort oldest first.
    let mut old_logs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n != "log.txt" && n.starts_with("log.") && n.ends_with(".txt"))
        })
        .collect();
    old_logs.sort();

    let excess = old_logs.len().saturating_sub(KEEP_ROTATED);
    for p in old_logs.iter().take(excess) {
        if let Err(e) = fs::remove_file(p) {
            eprintln!("Can't remove old log {}: {}", p.display(), e);
        }
    }
    Ok(())
}

fn env_is_true(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v.eq_ignore_ascii_case("true"))
}

pub struct Logger {
    /// None when file logging is off.
    log_file: Option<PathBuf>,
    print: bool,
    level: Level,
}

impl Logger {
    /// Logger configured from the environment, writing into the application directory.
    pub fn from_env() -> Result<Self> {
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| Level::parse(&v))
            .unwrap_or(Level::Info);

        let log_file = if env_is_true("DISABLE_LOG") {
            None
        } else {
            let dir = get_create_versefinder_dir().map_err(|e| anyhow!("No application directory: {}", e))?;
            let path = dir.join("log.txt");
            if let Err(e) = rotate_log(&path) {
                eprintln!("{}", e);
            }
            Some(path)
        };

        Ok(Logger {
            log_file,
            print: env_is_true("ENABLE_PRINT_LOG"),
            level,
        })
    }

    fn disabled() -> Self {
        Logger { log_file: None, print: false, level: Level::Silent }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level != Level::Silent && level <= self.level
    }

    fn append(&self, line: &str) -> Result<()> {
        let Some(path) = &self.log_file else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "[{}] {}", Utc::now().format("%Y-%m-%d %H:%M:%S%.3fZ"), line)?;
        Ok(())
    }

    pub fn log(&self, level: Level, msg: &str) {
        if !self.enabled(level) {
            return;
        }

        if self.print {
            match level {
                Level::Error => tracing::error!("{}", msg),
                Level::Warn => tracing::warn!("{}", msg),
                Level::Info => tracing::info!("{}", msg),
                Level::Debug => tracing::debug!("{}", msg),
                Level::Silent => {}
            }
        }

        if let Err(e) = self.append(&format!("{}: {}", level.label(), msg)) {
            eprintln!("Can't write log: {}", e);
        }
    }
}

/// stdout subscriber for `ENABLE_PRINT_LOG`, filtered by `RUST_LOG`.
fn init_print_subscriber() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Can't set tracing subscriber: {}", e);
    }
}

static LOGGER: OnceLock<Logger> = OnceLock::new();

fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        let logger = Logger::from_env().unwrap_or_else(|e| {
            eprintln!("Logging disabled: {}", e);
            Logger::disabled()
        });
        if logger.print {
            init_print_subscriber();
        }
        logger
    })
}

pub fn info(msg: &str) {
    logger().log(Level::Info, msg);
}

pub fn warn(msg: &str) {
    logger().log(Level::Warn, msg);
}

pub fn debug(msg: &str) {
    logger().log(Level::Debug, msg);
}
