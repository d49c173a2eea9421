//! Charts view: one bar chart per charted sensor.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use crate::app::App;
use crate::data::{Series, Thresholds};
use crate::ui::Theme;

/// Bars carry tenths so fractional readings still differ in height.
const SCALE: f64 = 10.0;

const BAR_WIDTH: u16 = 8;

/// Below this width the two charts are stacked.
const SIDE_BY_SIDE_WIDTH: u16 = 120;

/// Render both series side by side, stacked on narrow terminals.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard();
    let chunks = if area.width >= SIDE_BY_SIDE_WIDTH {
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area)
    } else {
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area)
    };

    let thresholds = dashboard.thresholds();
    frame.render_widget(chart(dashboard.temperature(), thresholds, &app.theme), chunks[0]);
    frame.render_widget(chart(dashboard.vibration(), thresholds, &app.theme), chunks[1]);
}

/// Build the bar chart for a series.
///
/// Bars are labelled with the point's time label and show the value above
/// the bar; values above the sensor's threshold are drawn in the alert color.
pub fn chart<'a>(series: &'a Series, thresholds: &Thresholds, theme: &Theme) -> BarChart<'a> {
    let limit = thresholds.limit(series.sensor());
    let color = theme.sensor_color(series.sensor());

    let bars: Vec<Bar> = series
        .points()
        .map(|point| {
            let style = if point.value > limit {
                Style::default().fg(theme.alert)
            } else {
                Style::default().fg(color)
            };
            Bar::default()
                .value(bar_height(point.value))
                .text_value(format_value(point.value))
                .label(Line::from(point.label.as_str()))
                .style(style)
                .value_style(style.add_modifier(Modifier::REVERSED))
        })
        .collect();

    let ceiling = series.max_value().unwrap_or(0.0).max(limit);

    let block = Block::default()
        .title(format!(" {} (limit {}) ", series.label(), format_value(limit)))
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border));

    BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(BAR_WIDTH)
        .bar_gap(1)
        .max(bar_height(ceiling))
}

fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        (value * SCALE).round() as u64
    } else {
        0
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::data::{Sensor, SeriesPoint};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_bar_height() {
        assert_eq!(bar_height(25.0), 250);
        assert_eq!(bar_height(2.34), 23);
        assert_eq!(bar_height(-4.0), 0);
        assert_eq!(bar_height(f64::NAN), 0);
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(25.0), "25");
        assert_eq!(format_value(31.27), "31.3");
    }

    #[test]
    fn test_chart_shows_title_and_labels() {
        let mut series = Series::with_capacity(Sensor::Vibration, 3);
        series.push(SeriesPoint::new("12:00:01", 12.0));
        series.push(SeriesPoint::new("12:00:02", 35.0));

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| {
                let widget = chart(&series, &Thresholds::default(), &Theme::dark());
                frame.render_widget(widget, frame.area());
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Vibration (limit 30)"));
        assert!(text.contains("12:00:01"));
        assert!(text.contains("35"));
    }
}
