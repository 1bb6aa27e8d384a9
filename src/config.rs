//! CLI flag schema so assistant startup behavior is explicit and discoverable.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::memory::persist;

pub const DEFAULT_TICK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_LISTEN_TIMEOUT_SECS: u64 = crate::speech::LISTEN_TIMEOUT.as_secs();
const MIN_TICK_INTERVAL_SECS: u64 = 1;
const MAX_TICK_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Parser, Clone)]
#[command(name = "jeeves", about = "Jeeves personal assistant engine", author, version)]
pub struct AppConfig {
    /// Memory file path (defaults to the per-user config directory)
    #[arg(long = "memory-file", env = "JEEVES_MEMORY_FILE")]
    pub memory_file: Option<PathBuf>,

    /// Seconds between reminder scheduler scans
    #[arg(
        long = "tick-interval-secs",
        default_value_t = DEFAULT_TICK_INTERVAL_SECS,
        value_parser = parse_tick_interval_secs
    )]
    pub tick_interval_secs: u64,

    /// Seconds to wait for speech before a capture attempt gives up
    #[arg(long = "listen-timeout-secs", default_value_t = DEFAULT_LISTEN_TIMEOUT_SECS)]
    pub listen_timeout_secs: u64,

    /// Enable JSON trace logging to the local log file
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Force-disable logging even when --logs is set
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Effective memory file location. Falls back to a file in the working
    /// directory when no per-user config directory exists.
    pub fn memory_path(&self) -> PathBuf {
        self.memory_file.clone().unwrap_or_else(|| {
            persist::default_memory_path().unwrap_or_else(|| PathBuf::from(persist::MEMORY_FILE))
        })
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    pub fn listen_timeout(&self) -> Duration {
        Duration::from_secs(self.listen_timeout_secs)
    }
}

fn parse_tick_interval_secs(raw: &str) -> Result<u64, String> {
    let value: u64 = raw
        .parse()
        .map_err(|_| format!("invalid tick interval '{raw}'"))?;
    if !(MIN_TICK_INTERVAL_SECS..=MAX_TICK_INTERVAL_SECS).contains(&value) {
        return Err(format!(
            "tick interval must be between {MIN_TICK_INTERVAL_SECS} and {MAX_TICK_INTERVAL_SECS} seconds"
        ));
    }
    Ok(value)
}
