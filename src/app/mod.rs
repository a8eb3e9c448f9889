use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Stylize;
use ratatui::text::{Line, Span};
use ratatui::{DefaultTerminal, Frame};
use tracing::{info, warn};

use crate::app::draw::EntryView;
use crate::app::entry::{Entry, EntryLayout};
use crate::config::RuntimeConfig;
use crate::sensors::SensorBackend;
use crate::settings;

mod draw;
mod entry;

/// The user-facing side of the program.
pub trait Frontend {
    /// Show readings from `sensors` until the user quits.
    fn start(&mut self, config: &RuntimeConfig, sensors: &mut dyn SensorBackend)
    -> anyhow::Result<()>;

    /// Tell the user something went wrong before the main view could come up.
    fn show_error_dialog(&mut self, message: &str);
}

/// The terminal frontend.
pub struct Tui;

impl Frontend for Tui {
    fn start(
        &mut self,
        config: &RuntimeConfig,
        sensors: &mut dyn SensorBackend,
    ) -> anyhow::Result<()> {
        Application::new(config, sensors).start()
    }

    fn show_error_dialog(&mut self, message: &str) {
        if let Err(err) = show_error_dialog(message) {
            warn!("could not show error dialog: {err:#}");
        }
    }
}

fn show_error_dialog(message: &str) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init().context("failed to initialise terminal")?;
    let result = wait_for_key(&mut terminal, message);
    ratatui::restore();
    result
}

fn wait_for_key(terminal: &mut DefaultTerminal, message: &str) -> anyhow::Result<()> {
    loop {
        terminal
            .draw(|frame| {
                let area = frame.area();
                draw::error_dialog(message, area, frame.buffer_mut())
            })
            .context("failed to draw error dialog")?;
        if let Event::Key(ke) = event::read().context("failed to read event")? {
            if ke.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

pub struct Application<'a> {
    config: &'a RuntimeConfig,
    sensors: &'a mut dyn SensorBackend,
    is_running: bool,

    fahrenheit: bool,
    last_refresh: Option<Instant>,
    updated: Option<chrono::NaiveDateTime>,
    status: Option<String>,

    entries: BTreeMap<String, Entry>,
}

impl<'a> Application<'a> {
    pub fn new(config: &'a RuntimeConfig, sensors: &'a mut dyn SensorBackend) -> Self {
        Self {
            config,
            sensors,
            is_running: false,
            fahrenheit: config.use_fahrenheit,
            last_refresh: None,
            updated: None,
            status: None,
            entries: BTreeMap::new(),
        }
    }

    pub fn start(&mut self) -> anyhow::Result<()> {
        self.is_running = true;

        let mut terminal = ratatui::try_init().context("failed to initialise terminal")?;
        let result = self.run(&mut terminal);
        ratatui::restore();

        result
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while self.is_running {
            if self.refresh_due() {
                self.refresh();
            }
            terminal.draw(|frame| self.draw(frame)).context("failed to draw frame")?;
            self.handle_events()?;
        }

        Ok(())
    }

    /// Always true before the first reading. After that only with a non-zero interval.
    fn refresh_due(&self) -> bool {
        match (self.last_refresh, self.config.update_interval) {
            (None, _) => true,
            (Some(_), 0) => false,
            (Some(at), seconds) => at.elapsed() >= Duration::from_secs(seconds.into()),
        }
    }

    fn refresh(&mut self) {
        let readings = self.sensors.readings();

        for reading in &readings {
            self.entries
                .entry(reading.key())
                .or_insert_with(|| Entry::new(reading))
                .push(reading);
        }

        // Sensors that did not report this time are marked as lost.
        self.entries.iter_mut().for_each(|(key, entry)| {
            if !readings.iter().any(|r| &r.key() == key) {
                entry.lose()
            }
        });

        self.last_refresh = Some(Instant::now());
        self.updated = Some(Local::now().naive_local());
    }

    fn save(&mut self) {
        let mut config = self.config.clone();
        config.use_fahrenheit = self.fahrenheit;
        self.status = Some(match settings::save(&config) {
            Ok(path) => {
                info!(path = %path.display(), "settings saved");
                format!("saved to {}", path.display())
            }
            Err(err) => format!("could not save settings: {err}"),
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let [title_area, entries_area, footer_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1), Constraint::Length(1)])
                .areas(frame.area());

        frame.render_widget(self.title(), title_area);
        frame.render_widget(self.footer(), footer_area);

        let entry_heights = self.entries.values().map(|e| 1 + e.layout.chart_height());

        let n_visible_entries = {
            let mut n = 0;
            let mut total_height = 0;
            for h in entry_heights.clone() {
                total_height += h;
                if total_height > entries_area.height {
                    break;
                }
                n += 1;
            }
            n
        };
        let vertical =
            Layout::vertical(entry_heights.take(n_visible_entries).map(Constraint::Length));
        let rows = vertical.split(entries_area);
        for (&row, entry) in rows.iter().zip(self.entries.values()) {
            frame.render_widget(EntryView { entry, fahrenheit: self.fahrenheit }, row);
        }
    }

    fn title(&self) -> Line<'_> {
        let theme = match &self.config.theme_image {
            Some(path) => {
                path.file_name().unwrap_or(path.as_os_str()).to_string_lossy().into_owned()
            }
            None => "built-in theme".to_string(),
        };
        let cadence = match self.config.update_interval {
            0 => "updates off".to_string(),
            seconds => format!("every {seconds}s"),
        };
        let updated = match self.updated {
            Some(at) => at.format("%H:%M:%S").to_string(),
            None => "-".to_string(),
        };

        Line::from(vec![
            Span::from(env!("CARGO_PKG_NAME")).bold(),
            Span::from(format!("  {theme}")).dim(),
            Span::from(format!("  {cadence}  updated {updated}")),
            Span::from(if self.fahrenheit { "  °F" } else { "  °C" }).bold(),
        ])
    }

    fn footer(&self) -> Line<'_> {
        match &self.status {
            Some(status) => Line::from(status.as_str()).italic(),
            None => Line::from("q quit  r refresh  f units  s save  E/C expand/condense").dim(),
        }
    }

    fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(Duration::from_millis(200)).context("failed to poll event")? {
            match event::read().context("failed to read event")? {
                Event::Key(ke) if ke.kind != KeyEventKind::Press => {}
                Event::Key(ke)
                    if ke.code == KeyCode::Char('q')
                        || (ke.code == KeyCode::Char('c')
                            && ke.modifiers.contains(KeyModifiers::CONTROL)) =>
                {
                    self.stop();
                }
                Event::Key(ke) if ke.code == KeyCode::Char('r') => {
                    self.refresh();
                }
                Event::Key(ke) if ke.code == KeyCode::Char('f') => {
                    self.fahrenheit = !self.fahrenheit;
                }
                Event::Key(ke) if ke.code == KeyCode::Char('s') => {
                    self.save();
                }
                Event::Key(ke) if ke.code == KeyCode::Char('E') => {
                    self.entries.values_mut().for_each(|e| e.layout = EntryLayout::Expanded);
                }
                Event::Key(ke) if ke.code == KeyCode::Char('C') => {
                    self.entries.values_mut().for_each(|e| e.layout = EntryLayout::Condensed);
                }
                _ => {}
            }
        }

        Ok(())
    }
}
