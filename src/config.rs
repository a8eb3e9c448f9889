use std::path::PathBuf;

/// Seconds between sensor refreshes when neither the settings file nor `-t` says otherwise.
pub const DEFAULT_UPDATE_INTERVAL: u32 = 1;

/// Everything the sensor and UI subsystems need to know, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub use_fahrenheit: bool,
    /// Refresh period in seconds. Zero means the readings are taken once and never refreshed.
    pub update_interval: u32,
    pub theme_image: Option<PathBuf>,
    /// Chip configuration for the sensor subsystem, opened by the startup sequence.
    pub sensors_config: Option<PathBuf>,
    home_dir: PathBuf,
}

impl RuntimeConfig {
    pub fn new(home_dir: PathBuf) -> Self {
        Self {
            use_fahrenheit: false,
            update_interval: DEFAULT_UPDATE_INTERVAL,
            theme_image: None,
            sensors_config: None,
            home_dir,
        }
    }

    pub fn home_dir(&self) -> &std::path::Path {
        &self.home_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RuntimeConfig::new(PathBuf::from("/home/someone"));
        assert!(!config.use_fahrenheit);
        assert_eq!(config.update_interval, 1);
        assert_eq!(config.theme_image, None);
        assert_eq!(config.sensors_config, None);
        assert_eq!(config.home_dir(), std::path::Path::new("/home/someone"));
    }
}
