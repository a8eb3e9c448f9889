use std::collections::VecDeque;

use chrono::Local;

use crate::sensors::{Reading, SensorKind};

/// How many readings an entry keeps for its chart.
pub const HISTORY_LEN: usize = 300;

/// One sensor on screen, with its most recent readings.
pub struct Entry {
    pub state: EntryState,

    pub chip: String,
    pub label: String,
    pub kind: SensorKind,

    /// At most `HISTORY_LEN` readings, oldest first.
    pub values: VecDeque<f32>,
    /// Highest reading this session, including those dropped from `values`.
    peak: Option<f32>,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub critical: Option<f32>,
    pub layout: EntryLayout,
}

impl Entry {
    pub fn new(reading: &Reading) -> Self {
        Self {
            state: EntryState::Live,
            chip: reading.chip.clone(),
            label: reading.label.clone(),
            kind: reading.kind,
            values: VecDeque::with_capacity(HISTORY_LEN),
            peak: None,
            min: reading.min,
            max: reading.max,
            critical: reading.critical,
            layout: EntryLayout::Expanded,
        }
    }

    pub fn push(&mut self, reading: &Reading) {
        self.state = EntryState::Live;
        self.label.clone_from(&reading.label);
        self.min = reading.min;
        self.max = reading.max;
        self.critical = reading.critical;
        if self.values.len() == HISTORY_LEN {
            self.values.pop_front();
        }
        self.values.push_back(reading.value);
        self.peak = Some(self.peak.map_or(reading.value, |peak| peak.max(reading.value)));
    }

    /// The sensor stopped reporting. Keep what we have, but show it condensed.
    pub fn lose(&mut self) {
        match self.state {
            EntryState::Live => {
                self.state = EntryState::Lost(Local::now().naive_local());
                self.layout = EntryLayout::Condensed
            }
            EntryState::Lost(_) => {}
        }
    }

    pub fn is_lost(&self) -> bool {
        match self.state {
            EntryState::Live => false,
            EntryState::Lost(_) => true,
        }
    }

    pub fn current(&self) -> f32 {
        self.values.back().copied().unwrap_or_default()
    }

    pub fn peak(&self) -> f32 {
        self.peak.unwrap_or_default()
    }

    /// The value a full gauge stands for.
    pub fn full_scale(&self) -> f32 {
        self.critical.or(self.max).unwrap_or_else(|| self.peak())
    }

    /// How full the gauge is, always within `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        let ratio = f64::from(self.current()) / f64::from(self.full_scale());
        if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 }
    }

    pub fn alarm(&self) -> Alarm {
        let current = self.current();
        match (self.critical, self.max) {
            (Some(critical), _) if current >= critical => Alarm::Critical,
            (_, Some(max)) if current >= max => Alarm::High,
            _ => Alarm::Normal,
        }
    }
}

pub enum EntryState {
    Live,
    Lost(chrono::NaiveDateTime),
}

#[derive(Default)]
pub enum EntryLayout {
    #[default]
    Expanded,
    Condensed,
}

impl EntryLayout {
    pub fn chart_height(&self) -> u16 {
        match self {
            EntryLayout::Expanded => 3,
            EntryLayout::Condensed => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    Normal,
    High,
    Critical,
}

/// Format `value` in the unit of `kind`, converting temperatures if asked to.
pub fn format_value(kind: SensorKind, value: f32, fahrenheit: bool) -> String {
    match kind {
        SensorKind::Temperature if fahrenheit => format!("{:.1}°F", value * 9.0 / 5.0 + 32.0),
        SensorKind::Temperature => format!("{value:.1}{}", kind.unit()),
        SensorKind::Fan => format!("{value:.0} {}", kind.unit()),
        SensorKind::Voltage => format!("{value:.2} {}", kind.unit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f32, max: Option<f32>, critical: Option<f32>) -> Reading {
        Reading {
            chip: "k10temp".to_string(),
            feature: "temp1".to_string(),
            label: "Tctl".to_string(),
            kind: SensorKind::Temperature,
            value,
            min: None,
            max,
            critical,
        }
    }

    #[test]
    fn units() {
        assert_eq!(format_value(SensorKind::Temperature, 40.0, false), "40.0°C");
        assert_eq!(format_value(SensorKind::Temperature, 40.0, true), "104.0°F");
        assert_eq!(format_value(SensorKind::Temperature, -40.0, true), "-40.0°F");
        assert_eq!(format_value(SensorKind::Fan, 1234.4, true), "1234 RPM");
        assert_eq!(format_value(SensorKind::Voltage, 1.2, false), "1.20 V");
    }

    #[test]
    fn gauge_scale_prefers_critical_then_max_then_peak() {
        let mut entry = Entry::new(&reading(50.0, Some(80.0), Some(100.0)));
        entry.push(&reading(50.0, Some(80.0), Some(100.0)));
        assert_eq!(entry.ratio(), 0.5);

        entry.push(&reading(40.0, Some(80.0), None));
        assert_eq!(entry.ratio(), 0.5);

        entry.push(&reading(25.0, None, None));
        assert_eq!(entry.full_scale(), 50.0);
        assert_eq!(entry.ratio(), 0.5);
    }

    #[test]
    fn empty_entry_has_an_empty_gauge() {
        let entry = Entry::new(&reading(0.0, None, None));
        assert_eq!(entry.ratio(), 0.0);
    }

    #[test]
    fn alarms() {
        let mut entry = Entry::new(&reading(0.0, Some(80.0), Some(95.0)));
        entry.push(&reading(70.0, Some(80.0), Some(95.0)));
        assert_eq!(entry.alarm(), Alarm::Normal);
        entry.push(&reading(85.0, Some(80.0), Some(95.0)));
        assert_eq!(entry.alarm(), Alarm::High);
        entry.push(&reading(99.0, Some(80.0), Some(95.0)));
        assert_eq!(entry.alarm(), Alarm::Critical);
    }

    #[test]
    fn history_is_capped_but_peak_is_kept() {
        let mut entry = Entry::new(&reading(0.0, None, None));
        entry.push(&reading(90.0, None, None));
        for i in 0..HISTORY_LEN * 2 {
            entry.push(&reading(i as f32 / 100.0, None, None));
        }
        assert_eq!(entry.values.len(), HISTORY_LEN);
        assert_eq!(entry.values.front().copied(), Some(HISTORY_LEN as f32 / 100.0));
        assert_eq!(entry.current(), (HISTORY_LEN * 2 - 1) as f32 / 100.0);
        assert_eq!(entry.peak(), 90.0);
    }

    #[test]
    fn lost_sensors_condense_and_come_back() {
        let mut entry = Entry::new(&reading(30.0, None, None));
        entry.lose();
        assert!(entry.is_lost());
        assert_eq!(entry.layout.chart_height(), 1);
        entry.push(&reading(31.0, None, None));
        assert!(!entry.is_lost());
    }
}
