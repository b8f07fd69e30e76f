use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log file used while the terminal UI owns the screen
pub const TUI_LOG_FILE: &str = "dayplan.log";

/// Filter from `RUST_LOG`; logging is off unless it is set.
///
/// Empty, oversized or unparsable values are ignored.
pub fn env_filter() -> EnvFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"))
}

/// Log to stderr (CLI commands)
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter())
        .try_init();
}

/// Log to `dayplan.log` in the data directory (TUI), since stderr would
/// draw over the alternate screen. Falls back to no logging if the file
/// cannot be opened.
pub fn init_file(data_dir: &Path) {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    let file = std::fs::create_dir_all(data_dir).and_then(|()| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(data_dir.join(TUI_LOG_FILE))
    });
    let Ok(file) = file else {
        return;
    };
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(env_filter())
        .try_init();
}
