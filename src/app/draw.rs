use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, BorderType, Chart, Clear, Dataset, Gauge, GraphType, Padding, Paragraph, Widget,
    Wrap,
};

use crate::app::entry::{Alarm, Entry, EntryLayout, EntryState, format_value};
use crate::sensors::SensorKind;

mod colors {
    use ratatui::style::Color;

    pub const INFO: Color = Color::from_u32(0x808a9f);
    pub const LABEL: Color = Color::from_u32(0xd29dc0);
    pub const TEMPERATURE: Color = Color::from_u32(0xf6ab65);
    pub const FAN: Color = Color::from_u32(0x8fa7e0);
    pub const VOLTAGE: Color = Color::from_u32(0xbad29f);
    pub const HIGH: Color = Color::from_u32(0xffd75f);
    pub const CRITICAL: Color = Color::from_u32(0xff5cb0);
    pub const TRACK: Color = Color::from_u32(0x2a2d36);
}

fn kind_color(kind: SensorKind) -> Color {
    match kind {
        SensorKind::Temperature => colors::TEMPERATURE,
        SensorKind::Fan => colors::FAN,
        SensorKind::Voltage => colors::VOLTAGE,
    }
}

/// An entry as it should be drawn, in the unit currently selected.
pub struct EntryView<'a> {
    pub entry: &'a Entry,
    pub fahrenheit: bool,
}

impl EntryView<'_> {
    fn format(&self, value: f32) -> String {
        format_value(self.entry.kind, value, self.fahrenheit)
    }
}

impl Widget for EntryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let entry = self.entry;
        let layout = Layout::vertical([
            Constraint::Length(1),                           // Header.
            Constraint::Length(entry.layout.chart_height()), // Gauge, chart.
        ]);
        let [header_area, body_area] = layout.areas(area);

        // Sensors that went away are dimmed.
        let wilted = if entry.is_lost() { Modifier::DIM } else { Modifier::default() };
        let color = match entry.alarm() {
            Alarm::Normal => kind_color(entry.kind),
            Alarm::High => colors::HIGH,
            Alarm::Critical => colors::CRITICAL,
        };

        // Header: label, chip, peak and limits.
        {
            let mut spans = vec![
                Span::from(entry.label.as_str()).bold().fg(colors::LABEL),
                Span::raw(" "),
                Span::from(entry.chip.as_str()).italic().fg(colors::INFO).dim(),
                Span::from("  peak ").dim(),
                Span::from(self.format(entry.peak())),
            ];
            if let Some(min) = entry.min {
                spans.push(Span::from("  low ").dim());
                spans.push(Span::from(self.format(min)));
            }
            if let Some(max) = entry.max {
                spans.push(Span::from("  high ").dim());
                spans.push(Span::from(self.format(max)));
            }
            if let Some(critical) = entry.critical {
                spans.push(Span::from("  crit ").dim());
                spans.push(Span::from(self.format(critical)).fg(colors::CRITICAL));
            }
            if let EntryState::Lost(at) = entry.state {
                spans.push(Span::from(format!("  lost at {}", at.format("%H:%M:%S"))).italic());
            }
            Line::from(spans).add_modifier(wilted).render(header_area, buf);
        }

        let gauge = Gauge::default()
            .gauge_style(Style::new().fg(color).bg(colors::TRACK))
            .ratio(entry.ratio())
            .label(Span::from(self.format(entry.current())).bold());

        match entry.layout {
            EntryLayout::Condensed => gauge.add_modifier(wilted).render(body_area, buf),
            EntryLayout::Expanded => {
                let [gauge_area, chart_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(body_area);
                gauge.add_modifier(wilted).render(gauge_area, buf);

                let data: Box<[_]> = entry
                    .values
                    .iter()
                    .enumerate()
                    .map(|(x, y)| (x as f64, f64::from(*y)))
                    .collect();
                let dataset = Dataset::default()
                    .data(&data)
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .fg(color);
                Chart::new(vec![dataset])
                    .x_axis(Axis::default().bounds([0.0, data.len() as f64 - 1.0]))
                    .y_axis(Axis::default().bounds([0.0, f64::from(entry.full_scale())]))
                    .add_modifier(wilted)
                    .render(chart_area, buf);
            }
        }
    }
}

/// A bordered message in the middle of `area`, drawn over whatever was there.
pub fn error_dialog(message: &str, area: Rect, buf: &mut Buffer) {
    let width = message.lines().map(str::len).max().unwrap_or_default() as u16 + 4;
    let height = message.lines().count() as u16 + 4;
    let [area] = Layout::horizontal([Constraint::Length(width)]).flex(Flex::Center).areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center).areas(area);

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(colors::CRITICAL))
        .title(Line::from(" Error ").bold())
        .title_bottom(Line::from(" press any key ").dim().right_aligned())
        .padding(Padding::horizontal(1));
    Clear.render(area, buf);
    Paragraph::new(message).wrap(Wrap { trim: false }).block(block).render(area, buf);
}
