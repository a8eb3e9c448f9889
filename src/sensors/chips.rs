//! Chip configuration, read from the file given with `-c`.
//!
//! This understands the part of the `sensors.conf` format that matters for display:
//!
//! ```text
//! # Comments run to the end of the line.
//! chip "coretemp-isa-*" "k10temp-*"
//!     label temp1 "CPU"
//!     ignore temp3
//! ```
//!
//! `compute`, `set` and `bus` statements are accepted and skipped. Chips are only known by the
//! name the kernel gives them, so a pattern's bus and address parts are not compared.

use std::collections::{HashMap, HashSet};

use crate::sensors::{Reading, SensorError};

#[derive(Debug, Default)]
pub struct ChipConfig {
    sections: Vec<Section>,
}

#[derive(Debug, Default)]
struct Section {
    patterns: Vec<String>,
    labels: HashMap<String, String>,
    ignored: HashSet<String>,
}

impl Section {
    fn matches(&self, chip: &str) -> bool {
        self.patterns.iter().any(|pattern| {
            let name = pattern.split('-').next().unwrap_or(pattern);
            match name.strip_suffix('*') {
                Some(prefix) => chip.starts_with(prefix),
                None => name == chip,
            }
        })
    }
}

impl ChipConfig {
    pub fn parse(text: &str) -> Result<Self, SensorError> {
        let mut sections: Vec<Section> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let number = index + 1;
            let error = |message: &str| SensorError::Parse { line: number, message: message.to_string() };

            let words = tokenize(line).map_err(|message| error(message))?;
            let Some((statement, args)) = words.split_first() else {
                continue;
            };

            match statement.as_str() {
                "chip" => {
                    if args.is_empty() {
                        return Err(error("chip statement without a chip name"));
                    }
                    sections.push(Section { patterns: args.to_vec(), ..Default::default() });
                }
                "label" | "ignore" => {
                    let Some(section) = sections.last_mut() else {
                        return Err(error("statement outside of a chip block"));
                    };
                    match (statement.as_str(), args) {
                        ("label", [feature, text]) => {
                            section.labels.insert(feature.clone(), text.clone());
                        }
                        ("ignore", [feature]) => {
                            section.ignored.insert(feature.clone());
                        }
                        _ => return Err(error("wrong number of arguments")),
                    }
                }
                "compute" | "set" | "bus" => {}
                _ => return Err(error(&format!("unknown statement `{statement}`"))),
            }
        }

        Ok(Self { sections })
    }

    /// Relabel `reading` according to the matching chip blocks, or drop it if it is ignored.
    ///
    /// Later blocks take precedence over earlier ones.
    pub fn apply(&self, mut reading: Reading) -> Option<Reading> {
        for section in self.sections.iter().filter(|s| s.matches(&reading.chip)) {
            if section.ignored.contains(&reading.feature) {
                return None;
            }
            if let Some(label) = section.labels.get(&reading.feature) {
                reading.label = label.clone();
            }
        }
        Some(reading)
    }
}

/// Split a line into words, keeping quoted strings together and dropping comments.
fn tokenize(line: &str) -> Result<Vec<String>, &'static str> {
    let mut words = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '#' => break,
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => word.push(escaped),
                            None => return Err("unterminated string"),
                        },
                        Some(c) => word.push(c),
                        None => return Err("unterminated string"),
                    }
                }
                words.push(word);
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '#' || c == '"' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                words.push(word);
            }
        }
    }

    Ok(words)
}
