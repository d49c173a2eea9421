//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};

/// Render the header bar.
///
/// Displays: connection indicator, alert and record counts, latest readings.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let dashboard = app.dashboard();

    let (icon_style, state) = if dashboard.is_loading() {
        (Style::default().fg(app.theme.highlight), "loading")
    } else if dashboard.is_live() {
        (Style::default().fg(app.theme.normal), "live")
    } else {
        (Style::default().add_modifier(Modifier::DIM), "offline")
    };

    let mut spans = vec![
        Span::styled(" ● ", icon_style),
        Span::styled("PREVENIX ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("{} │ ", state)),
        Span::styled(
            format!("{}", dashboard.alerts().len()),
            Style::default().fg(app.theme.alert).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" alerts "),
        Span::styled(
            format!("{}", dashboard.records().len()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" records"),
    ];

    for series in [dashboard.temperature(), dashboard.vibration()] {
        if let Some(last) = series.last() {
            let breached = last.value > dashboard.thresholds().limit(series.sensor());
            spans.push(Span::raw(format!(" │ {} ", series.label())));
            spans.push(Span::styled(last.value.to_string(), app.theme.value_style(breached)));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.current_view.index())
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows temporary status messages first, then the endpoints and controls.
/// Fetch failures stay in the log; the lists just keep what they had.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let dashboard = app.dashboard();
    let controls = match app.current_view {
        View::Charts => "Tab:switch r:refresh e:export ?:help q:quit",
        View::Alerts | View::Records => "↑↓:scroll Tab:switch r:refresh ?:help q:quit",
    };
    let status = format!(
        " {} | {} | {}",
        dashboard.api_description(),
        dashboard.push_description(),
        controls
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Navigation",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  1/2/3       Charts/Alerts/Records"),
        Line::from("  ↑/↓ j/k     Scroll cards"),
        Line::from("  PgUp/PgDn   Jump 10 cards"),
        Line::from("  Home/End    Newest/oldest"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Alerts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Enter/Esc   Acknowledge notice"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " General",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  r         Refresh alerts and records"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 22u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
