use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::sensors::chips::ChipConfig;

mod chips;
mod hwmon;

/// Where the kernel exposes its hardware monitoring chips.
const HWMON_ROOT: &str = "/sys/class/hwmon";

/// Something that can be initialised once, read repeatedly and cleaned up.
pub trait SensorBackend {
    /// Prepare for reading, optionally taking chip labels and ignores from `config`.
    fn init(&mut self, config: Option<&mut dyn Read>) -> Result<(), SensorError>;
    /// Take a fresh reading of every sensor that is not ignored.
    fn readings(&mut self) -> Vec<Reading>;
    /// Release everything `init` acquired.
    fn cleanup(&mut self);
}

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("no sensors found")]
    NoSensors,
    #[error("sensor configuration, line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("failed to read sensor configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl SensorError {
    /// Error number in the numbering that `libsensors` uses.
    pub fn code(&self) -> i32 {
        match self {
            SensorError::NoSensors => 4,
            SensorError::Parse { .. } => 8,
            SensorError::Io(_) => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SensorKind {
    Temperature,
    Fan,
    Voltage,
}

impl SensorKind {
    /// Unit of the raw value. Temperatures are always read in Celsius.
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Fan => "RPM",
            SensorKind::Voltage => "V",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub chip: String,
    /// Feature name as the chip calls it, like `temp1` or `fan2`.
    pub feature: String,
    pub label: String,
    pub kind: SensorKind,
    pub value: f32,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub critical: Option<f32>,
}

impl Reading {
    /// Stable key for tracking one sensor across refreshes.
    pub fn key(&self) -> String {
        format!("{}/{}", self.chip, self.feature)
    }
}

/// Reads the kernel hwmon tree, falling back to `sysinfo` components where there is none.
pub struct Sensors {
    root: PathBuf,
    chips: ChipConfig,
    components: Option<sysinfo::Components>,
}

impl Sensors {
    pub fn new() -> Self {
        Self::with_root(HWMON_ROOT)
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf(), chips: ChipConfig::default(), components: None }
    }

    fn read_all(&mut self) -> Vec<Reading> {
        let raw = match &mut self.components {
            None => hwmon::scan(&self.root),
            Some(components) => {
                components.refresh(true);
                components.list().iter().filter_map(component_reading).collect()
            }
        };

        raw.into_iter().filter_map(|reading| self.chips.apply(reading)).collect()
    }
}

impl Default for Sensors {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorBackend for Sensors {
    fn init(&mut self, config: Option<&mut dyn Read>) -> Result<(), SensorError> {
        self.chips = match config {
            Some(reader) => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                ChipConfig::parse(&text)?
            }
            None => ChipConfig::default(),
        };

        if !self.root.exists() {
            info!(root = %self.root.display(), "no hwmon tree, using sysinfo components");
            self.components = Some(sysinfo::Components::new_with_refreshed_list());
        }

        let found = self.read_all().len();
        debug!(found, "sensors initialised");
        if found == 0 {
            self.cleanup();
            return Err(SensorError::NoSensors);
        }
        Ok(())
    }

    fn readings(&mut self) -> Vec<Reading> {
        self.read_all()
    }

    fn cleanup(&mut self) {
        self.chips = ChipConfig::default();
        self.components = None;
    }
}

/// `sysinfo` labels look like `coretemp Package id 0`: the chip, then the feature.
fn component_reading(component: &sysinfo::Component) -> Option<Reading> {
    let value = component.temperature()?;
    let label = component.label();
    let (chip, feature) = label.split_once(' ').unwrap_or((label, label));
    Some(Reading {
        chip: chip.to_string(),
        feature: feature.to_string(),
        label: feature.to_string(),
        kind: SensorKind::Temperature,
        value,
        min: None,
        max: component.max(),
        critical: component.critical(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn fake_tree() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let chip = root.path().join("hwmon0");
        fs::create_dir(&chip).unwrap();
        fs::write(chip.join("name"), "coretemp\n").unwrap();
        fs::write(chip.join("temp1_input"), "45000\n").unwrap();
        fs::write(chip.join("temp1_label"), "Package id 0\n").unwrap();
        fs::write(chip.join("temp2_input"), "41000\n").unwrap();
        root
    }

    #[test]
    fn init_and_read() {
        let root = fake_tree();
        let mut sensors = Sensors::with_root(root.path());
        sensors.init(None).unwrap();
        let readings = sensors.readings();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].label, "Package id 0");
        assert_eq!(readings[0].value, 45.0);
        assert_eq!(readings[0].key(), "coretemp/temp1");
        sensors.cleanup();
    }

    #[test]
    fn config_relabels_and_ignores() {
        let root = fake_tree();
        let mut sensors = Sensors::with_root(root.path());
        let mut config = "chip \"core*\"\n  label temp1 \"CPU\"\n  ignore temp2\n".as_bytes();
        sensors.init(Some(&mut config)).unwrap();
        let readings = sensors.readings();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].label, "CPU");
    }

    #[test]
    fn bad_config_is_a_parse_error() {
        let root = fake_tree();
        let mut sensors = Sensors::with_root(root.path());
        let mut config = "label temp1 \"CPU\"\n".as_bytes();
        let err = sensors.init(Some(&mut config)).unwrap_err();
        assert_eq!(err.code(), 8);
    }

    #[test]
    fn empty_tree_has_no_sensors() {
        let root = tempfile::tempdir().unwrap();
        let mut sensors = Sensors::with_root(root.path());
        let err = sensors.init(None).unwrap_err();
        assert!(matches!(err, SensorError::NoSensors));
        assert_eq!(err.code(), 4);
    }
}
