use std::env;
use std::error::Error;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use simplelog::{CombinedLogger, Config, LevelFilter, WriteLogger};

use crate::config::LoggingSettings;

/// Route `log` output to a file; the terminal belongs to the UI.
///
/// Failures are reported on stderr and the player runs without a logger.
pub fn init(settings: &LoggingSettings) {
    let level: LevelFilter = settings.level.into();
    if level == LevelFilter::Off {
        return;
    }
    let path = log_path(settings);
    if let Err(e) = install(level, &path) {
        eprintln!("cadenza: logging to {} disabled: {e}", path.display());
    }
}

fn log_path(settings: &LoggingSettings) -> PathBuf {
    settings
        .file
        .clone()
        .unwrap_or_else(|| env::temp_dir().join("cadenza.log"))
}

fn install(level: LevelFilter, path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    CombinedLogger::init(vec![WriteLogger::new(
        level,
        Config::default(),
        File::create(path)?,
    )])?;
    log::info!("cadenza {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}
