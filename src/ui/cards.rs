//! Alert and record card lists.
//!
//! Each card is built by a pure function of one item, so the list views
//! only decide layout and selection.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{display_time, Alert, Record, Sensor, Thresholds};
use crate::ui::Theme;

pub const NO_ALERTS: &str = "No alerts available";
pub const NO_RECORDS: &str = "No records available";

/// Render the alerts list, newest first.
pub fn render_alerts(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app.dashboard().alerts();
    let block = list_block(&app.theme, format!(" Alerts ({}) ", alerts.len()));

    if alerts.is_empty() {
        render_placeholder(frame, block, NO_ALERTS, area);
        return;
    }

    let items: Vec<ListItem> =
        alerts.iter().map(|a| ListItem::new(alert_card(a, &app.theme))).collect();
    render_list(frame, app, block, items, app.alert_index, area);
}

/// Render the records list, newest first.
pub fn render_records(frame: &mut Frame, app: &App, area: Rect) {
    let records = app.dashboard().records();
    let block = list_block(&app.theme, format!(" Records ({}) ", records.len()));

    if records.is_empty() {
        render_placeholder(frame, block, NO_RECORDS, area);
        return;
    }

    let thresholds = app.dashboard().thresholds();
    let items: Vec<ListItem> = records
        .iter()
        .map(|r| ListItem::new(record_card(r, thresholds, &app.theme)))
        .collect();
    render_list(frame, app, block, items, app.record_index, area);
}

/// One alert: sensor, message, value and time.
pub fn alert_card(alert: &Alert, theme: &Theme) -> Text<'static> {
    let sensor = if alert.sensor.is_empty() {
        "Unknown sensor".to_string()
    } else {
        alert.sensor.clone()
    };
    let value = alert.value.map_or_else(|| "-".to_string(), |v| v.to_string());
    let time = alert.timestamp.as_ref().map_or_else(|| "-".to_string(), display_time);

    Text::from(vec![
        Line::from(vec![
            Span::styled("▲ ", Style::default().fg(theme.alert)),
            Span::styled(sensor, theme.header),
        ]),
        Line::from(format!("  {}", alert.message.as_deref().unwrap_or("(no message)"))),
        Line::from(vec![
            Span::raw("  Value: "),
            Span::styled(value, Style::default().fg(theme.alert).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", time), Style::default().add_modifier(Modifier::DIM)),
        ]),
        Line::from(""),
    ])
}

/// One record: sensor, value and time. Charted sensors above their limit
/// are highlighted.
pub fn record_card(record: &Record, thresholds: &Thresholds, theme: &Theme) -> Text<'static> {
    let breached = Sensor::from_name(&record.sensor)
        .is_some_and(|sensor| record.value > thresholds.limit(sensor));

    Text::from(vec![
        Line::from(Span::styled(record.sensor.clone(), theme.header)),
        Line::from(vec![
            Span::raw("  Value: "),
            Span::styled(record.value.to_string(), theme.value_style(breached)),
            Span::styled(
                format!("  {}", display_time(&record.timestamp)),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]),
        Line::from(""),
    ])
}

fn list_block(theme: &Theme, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
}

fn render_placeholder(frame: &mut Frame, block: Block, text: &str, area: Rect) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().add_modifier(Modifier::DIM))
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_list(
    frame: &mut Frame,
    app: &App,
    block: Block,
    items: Vec<ListItem>,
    selected: usize,
    area: Rect,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.selected)
        .highlight_symbol("│");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
