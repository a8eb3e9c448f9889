use std::fs;
use std::path::Path;

use crate::sensors::{Reading, SensorKind};

/// Read every temperature, fan and voltage input below `root`, one directory per chip.
pub fn scan(root: &Path) -> Vec<Reading> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };
    let mut chips: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
    chips.sort();

    let mut readings = Vec::new();
    for path in chips {
        let Some(chip) = read_trimmed(&path.join("name")) else {
            continue;
        };
        readings.extend(read_kind(&path, &chip, SensorKind::Temperature));
        readings.extend(read_kind(&path, &chip, SensorKind::Fan));
        readings.extend(read_kind(&path, &chip, SensorKind::Voltage));
    }
    readings
}

fn read_kind(path: &Path, chip: &str, kind: SensorKind) -> Vec<Reading> {
    // Prefix, index range, and the divisor that turns the raw value into the unit.
    let (prefix, range, scale) = match kind {
        SensorKind::Temperature => ("temp", 1..=16, 1000.0),
        SensorKind::Fan => ("fan", 1..=8, 1.0),
        SensorKind::Voltage => ("in", 0..=16, 1000.0),
    };

    range
        .filter_map(|i| {
            let feature = format!("{prefix}{i}");
            let value = |attr: &str| {
                read_trimmed(&path.join(format!("{feature}_{attr}")))
                    .and_then(|s| s.parse::<f32>().ok())
                    .map(|v| v / scale)
            };

            let input = value("input")?;
            let label = read_trimmed(&path.join(format!("{feature}_label")))
                .unwrap_or_else(|| feature.clone());
            Some(Reading {
                chip: chip.to_string(),
                label,
                kind,
                value: input,
                min: value("min"),
                max: value("max"),
                critical: value("crit"),
                feature,
            })
        })
        .collect()
}

fn read_trimmed(path: &Path) -> Option<String> {
    fs::read_to_string(path).ok().map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_all_kinds_with_limits() {
        let root = tempfile::tempdir().unwrap();
        let chip = root.path().join("hwmon1");
        fs::create_dir(&chip).unwrap();
        fs::write(chip.join("name"), "it87\n").unwrap();
        fs::write(chip.join("temp1_input"), "52500").unwrap();
        fs::write(chip.join("temp1_max"), "80000").unwrap();
        fs::write(chip.join("temp1_crit"), "95000").unwrap();
        fs::write(chip.join("fan2_input"), "1200\n").unwrap();
        fs::write(chip.join("fan2_min"), "300\n").unwrap();
        fs::write(chip.join("fan2_label"), "Chassis\n").unwrap();
        fs::write(chip.join("in0_input"), "1250").unwrap();

        let readings = scan(root.path());
        assert_eq!(readings.len(), 3);

        let temp = &readings[0];
        assert_eq!(temp.kind, SensorKind::Temperature);
        assert_eq!(temp.key(), "it87/temp1");
        assert_eq!(temp.label, "temp1");
        assert_eq!((temp.value, temp.max, temp.critical), (52.5, Some(80.0), Some(95.0)));

        let fan = &readings[1];
        assert_eq!(fan.kind, SensorKind::Fan);
        assert_eq!(fan.label, "Chassis");
        assert_eq!((fan.value, fan.min), (1200.0, Some(300.0)));

        let volts = &readings[2];
        assert_eq!(volts.kind, SensorKind::Voltage);
        assert_eq!(volts.value, 1.25);
    }

    #[test]
    fn directories_without_a_name_are_skipped() {
        let root = tempfile::tempdir().unwrap();
        let chip = root.path().join("hwmon0");
        fs::create_dir(&chip).unwrap();
        fs::write(chip.join("temp1_input"), "40000").unwrap();
        assert!(scan(root.path()).is_empty());
        assert!(scan(&root.path().join("missing")).is_empty());
    }
}
