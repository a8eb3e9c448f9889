//! The persisted settings file, `~/.local/share/xsensors/custom.ini`.
//!
//! The format is line oriented. Section headers (`[...]`) and comments (`;...`) are skipped, and
//! only two keys are understood:
//!
//! ```ini
//! use_fahrenheit=1
//! update_time=5
//! ```
//!
//! Anything else is ignored, so newer files still load in older versions.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::interval::{IntervalError, parse_interval};

const FILE_NAME: &str = "custom.ini";
const FAHRENHEIT_KEY: &str = "use_fahrenheit=";
const UPDATE_TIME_KEY: &str = "update_time=";

/// A malformed entry. The value it tried to set keeps whatever it was before.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsWarning {
    #[error("line {line}: use_fahrenheit can only have a value of 0 or 1")]
    Fahrenheit { line: usize },
    #[error("line {line}: update_time {reason}")]
    UpdateTime { line: usize, reason: IntervalError },
}

pub fn settings_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".local").join("share").join(env!("CARGO_PKG_NAME")).join(FILE_NAME)
}

/// Apply the settings file under the configured home directory, if there is one.
///
/// A file that cannot be opened is not an error: on a first run there simply is no file yet.
pub fn load(config: &mut RuntimeConfig) {
    let path = settings_path(config.home_dir());
    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            debug!(path = %path.display(), %err, "no persisted settings");
            return;
        }
    };

    for warning in apply(config, BufReader::new(file)) {
        warn!("invalid {FILE_NAME} entry, {warning}");
    }
}

/// Apply every recognized line from `reader` to `config`, returning what could not be applied.
pub fn apply(config: &mut RuntimeConfig, reader: impl BufRead) -> Vec<SettingsWarning> {
    let mut warnings = Vec::new();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let bytes = match bytes {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(%err, "stopped reading {FILE_NAME}");
                break;
            }
        };
        let decoded = String::from_utf8_lossy(&bytes);
        let line = decoded.strip_suffix('\r').unwrap_or(&decoded[..]);
        let number = index + 1;

        if line.starts_with('[') || line.starts_with(';') {
            continue;
        }

        if let Some(value) = line.strip_prefix(FAHRENHEIT_KEY) {
            match value.as_bytes().first() {
                Some(b'1') => config.use_fahrenheit = true,
                Some(b'0') => config.use_fahrenheit = false,
                _ => warnings.push(SettingsWarning::Fahrenheit { line: number }),
            }
        } else if let Some(value) = line.strip_prefix(UPDATE_TIME_KEY) {
            match parse_interval(value) {
                Ok(seconds) => config.update_interval = seconds,
                Err(reason) => warnings.push(SettingsWarning::UpdateTime { line: number, reason }),
            }
        }
    }

    warnings
}

/// Write the unit and interval choices back to the settings file, creating its directory.
pub fn save(config: &RuntimeConfig) -> io::Result<PathBuf> {
    let path = settings_path(config.home_dir());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, render(config))?;
    Ok(path)
}

fn render(config: &RuntimeConfig) -> String {
    format!(
        "[{name}]\n; Written by {name} {version}.\n{FAHRENHEIT_KEY}{fahrenheit}\n{UPDATE_TIME_KEY}{interval}\n",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        fahrenheit = u8::from(config.use_fahrenheit),
        interval = config.update_interval,
    )
}
