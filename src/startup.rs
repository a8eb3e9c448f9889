use std::ffi::OsString;
use std::fs::File;
use std::io::{self, Read};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{debug, error};

use crate::app::Frontend;
use crate::config::RuntimeConfig;
use crate::sensors::{SensorBackend, SensorError};
use crate::{options, settings};

/// How the process should exit when nothing went fatally wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("could not determine the home directory from $HOME or the user database")]
    HomeDirectory,
    #[error("error opening config file: {}", path.display())]
    SensorConfigOpen { path: PathBuf, source: io::Error },
    #[error(
        "could not initialize sensors.\nIs everything installed properly?\nError Number: {}",
        source.code()
    )]
    SensorInit { source: SensorError },
    #[error("something has gone wrong closing the config file {}", path.display())]
    SensorConfigClose { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    ConfigLoaded,
    OptionsResolved,
    SensorConfigOpened,
    SensorsInitialized,
    GuiRunning,
    SensorsCleanedUp,
    Terminated,
}

fn enter(phase: Phase) {
    debug!(?phase, "startup");
}

/// The home directory from `$HOME`, or else from the account database.
pub fn resolve_home_dir(
    env_home: Option<OsString>,
    account_home: impl FnOnce() -> Option<PathBuf>,
) -> Result<PathBuf, StartupError> {
    match env_home {
        Some(home) if !home.is_empty() => Ok(PathBuf::from(home)),
        _ => account_home().ok_or(StartupError::HomeDirectory),
    }
}

/// Resolve the configuration, bring up the sensors and hand over to the frontend.
///
/// Returns once the frontend exits. Help, version and usage errors return early without touching
/// the sensors or the frontend.
pub fn run<I, T>(
    args: I,
    home_dir: PathBuf,
    sensors: &mut dyn SensorBackend,
    frontend: &mut dyn Frontend,
) -> Result<Status, StartupError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut config = RuntimeConfig::new(home_dir);
    settings::load(&mut config);
    enter(Phase::ConfigLoaded);

    if let ControlFlow::Break(status) = options::resolve(args, &mut config) {
        return Ok(status);
    }
    enter(Phase::OptionsResolved);
    let config = config;

    let mut sensors_file = match &config.sensors_config {
        Some(path) => match File::open(path) {
            Ok(file) => Some(file),
            Err(source) => {
                return Err(StartupError::SensorConfigOpen { path: path.clone(), source });
            }
        },
        None => None,
    };
    enter(Phase::SensorConfigOpened);

    if let Err(source) = sensors.init(sensors_file.as_mut().map(|file| file as &mut dyn Read)) {
        let err = StartupError::SensorInit { source };
        if config.sensors_config.is_none() {
            frontend.show_error_dialog(&err.to_string());
        }
        return Err(err);
    }
    enter(Phase::SensorsInitialized);

    enter(Phase::GuiRunning);
    if let Err(err) = frontend.start(&config, sensors) {
        error!("GUI failed: {err:#}");
    }

    sensors.cleanup();
    enter(Phase::SensorsCleanedUp);

    if let (Some(file), Some(path)) = (sensors_file, config.sensors_config) {
        close(file).map_err(|source| StartupError::SensorConfigClose { path, source })?;
    }
    enter(Phase::Terminated);

    Ok(Status::Success)
}

/// Close `file`, reporting the error that dropping it would swallow.
#[cfg(unix)]
fn close(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `fd` was just released by `into_raw_fd`, so nothing else owns or closes it.
    match unsafe { libc::close(fd) } {
        0 => Ok(()),
        _ => Err(io::Error::last_os_error()),
    }
}

#[cfg(not(unix))]
fn close(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}
