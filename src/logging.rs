//! File logging
//!
//! The terminal belongs to the editor, so log records go to
//! `<cache dir>/ghostline/ghostline.log`. Nothing is logged unless the binary
//! is started with `--log`. `GHOSTLINE_LOG` overrides the filter using the
//! usual env_logger syntax.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use crate::error::GhostlineError;

pub const LOG_FILTER_ENV: &str = "GHOSTLINE_LOG";
const DEFAULT_FILTER: &str = "ghostline=debug";

/// Default log file location
pub fn log_file_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("ghostline").join("ghostline.log"))
}

/// Install the global logger writing to `path`
///
/// Returns the path actually used.
pub fn init(path: Option<PathBuf>) -> Result<PathBuf, GhostlineError> {
    let path = match path.or_else(log_file_path) {
        Some(path) => path,
        None => {
            return Err(GhostlineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no cache directory for the log file",
            )));
        }
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(&path)?;

    let filter = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    env_logger::Builder::new()
        .parse_filters(&filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| GhostlineError::Io(std::io::Error::other(e)))?;

    log::info!("ghostline {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
    Ok(path)
}
