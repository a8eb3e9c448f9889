use std::ffi::OsString;
use std::ops::ControlFlow;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::interval::{IntervalError, parse_interval};
use crate::startup::Status;

/// Watch hardware temperatures, fan speeds and voltages as gauges.
///
/// Settings from `~/.local/share/xsensors/custom.ini` are read first and can be overridden here.
/// While running, `f` toggles the temperature unit, `r` refreshes, `s` saves the unit and update
/// time, and `q` exits.
#[derive(Parser, Debug)]
#[command(version, disable_version_flag = true, args_override_self = true)]
pub struct Options {
    /// Display all temperatures in Fahrenheit.
    #[arg(short = 'f', long)]
    pub fahrenheit: bool,

    /// Specify the sensor chip configuration file.
    #[arg(short = 'c', long = "config", value_name = "FILENAME")]
    pub sensors_config: Option<PathBuf>,

    /// Specify the image file to use as a theme.
    #[arg(short = 'i', long = "image", value_name = "FILENAME")]
    pub theme_image: Option<PathBuf>,

    /// Specify the update time in number of seconds. Set this to a negative number for the
    /// default time, or to zero for no updates.
    #[arg(short = 't', long = "time", value_name = "TIME", allow_hyphen_values = true)]
    pub update_time: Option<String>,

    /// Display version number.
    #[arg(
        short = 'v',
        long = "version",
        action = ArgAction::Version,
        value_parser = clap::value_parser!(bool)
    )]
    #[allow(dead_code)]
    version: (),

    /// Operands are accepted and ignored.
    #[arg(hide = true, value_name = "OPERAND")]
    operands: Vec<OsString>,
}

impl Options {
    /// Override whatever `config` holds with the options given on the command line.
    pub fn apply(self, config: &mut RuntimeConfig) {
        if !self.operands.is_empty() {
            debug!(operands = ?self.operands, "ignoring operands");
        }
        if self.fahrenheit {
            config.use_fahrenheit = true;
        }
        if let Some(path) = self.sensors_config {
            config.sensors_config = Some(path);
        }
        if let Some(path) = self.theme_image {
            config.theme_image = Some(path);
        }
        if let Some(text) = self.update_time {
            match parse_interval(&text) {
                Ok(seconds) => config.update_interval = seconds,
                Err(IntervalError::InvalidNumber) => {
                    warn!("specified update time {text:?} does not appear to be a valid number")
                }
                Err(IntervalError::Negative) => {
                    debug!(interval = config.update_interval, "negative update time, keeping current")
                }
            }
        }
    }
}

/// Parse `args` and apply them to `config`.
///
/// Breaks with the exit status when the process should stop here: after printing help or the
/// version, or after reporting a usage error.
pub fn resolve<I, T>(args: I, config: &mut RuntimeConfig) -> ControlFlow<Status>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Options::try_parse_from(args) {
        Ok(options) => {
            options.apply(config);
            ControlFlow::Continue(())
        }
        Err(err) => {
            // Help and version go to stdout, usage errors to stderr.
            let _ = err.print();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    ControlFlow::Break(Status::Success)
                }
                _ => ControlFlow::Break(Status::Failure),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::CommandFactory;

    use super::*;

    fn config() -> RuntimeConfig {
        RuntimeConfig::new(PathBuf::from("/nonexistent"))
    }

    fn resolved(args: &[&str]) -> (ControlFlow<Status>, RuntimeConfig) {
        let mut config = config();
        let flow = resolve(std::iter::once("xsensors").chain(args.iter().copied()), &mut config);
        (flow, config)
    }

    #[test]
    fn command_is_well_formed() {
        Options::command().debug_assert();
    }

    #[test]
    fn no_arguments_keep_defaults() {
        let (flow, config) = resolved(&[]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config, self::config());
    }

    #[test]
    fn all_options() {
        let (flow, config) =
            resolved(&["-f", "-c", "/etc/sensors3.conf", "-i", "theme.png", "-t", "10"]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert!(config.use_fahrenheit);
        assert_eq!(config.sensors_config.as_deref(), Some(Path::new("/etc/sensors3.conf")));
        assert_eq!(config.theme_image.as_deref(), Some(Path::new("theme.png")));
        assert_eq!(config.update_interval, 10);
    }

    #[test]
    fn attached_values_and_long_names() {
        let (_, config) = resolved(&["-t5", "--image=a.png", "--fahrenheit"]);
        assert_eq!(config.update_interval, 5);
        assert_eq!(config.theme_image.as_deref(), Some(Path::new("a.png")));
        assert!(config.use_fahrenheit);
    }

    #[test]
    fn last_repeated_option_wins() {
        let (flow, config) =
            resolved(&["-i", "first.png", "-t", "3", "-i", "second.png", "-t", "0", "-f", "-f"]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config.theme_image.as_deref(), Some(Path::new("second.png")));
        assert_eq!(config.update_interval, 0);
    }

    #[test]
    fn bad_update_time_keeps_previous_value() {
        let mut config = config();
        config.update_interval = 30;
        let flow = resolve(["xsensors", "-t", "soon"], &mut config);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config.update_interval, 30);

        let flow = resolve(["xsensors", "-t", "-5"], &mut config);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config.update_interval, 30);
    }

    #[test]
    fn fahrenheit_flag_never_clears() {
        let mut config = config();
        config.use_fahrenheit = true;
        let _ = resolve(["xsensors", "-t", "2"], &mut config);
        assert!(config.use_fahrenheit);
    }

    #[test]
    fn help_and_version_exit_successfully() {
        assert_eq!(resolved(&["-h"]).0, ControlFlow::Break(Status::Success));
        assert_eq!(resolved(&["-v"]).0, ControlFlow::Break(Status::Success));
    }

    #[test]
    fn unknown_flag_fails() {
        let (flow, config) = resolved(&["-x"]);
        assert_eq!(flow, ControlFlow::Break(Status::Failure));
        assert_eq!(config, self::config());
    }

    #[test]
    fn operands_are_ignored() {
        let (flow, config) = resolved(&["extra"]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config, self::config());

        let (flow, config) = resolved(&["extra", "-t", "7", "more"]);
        assert_eq!(flow, ControlFlow::Continue(()));
        assert_eq!(config.update_interval, 7);
    }

    #[test]
    fn missing_value_fails() {
        assert_eq!(resolved(&["-c"]).0, ControlFlow::Break(Status::Failure));
    }
}
