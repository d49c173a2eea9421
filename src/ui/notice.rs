//! Modal overlay for a pending alert notice.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::notify::Notice;
use crate::ui::Theme;

/// Render the oldest pending notice on top of everything else.
pub fn render_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let Some(notice) = app.current_notice() else {
        return;
    };

    let width = 56u16.min(area.width.saturating_sub(4));
    let height = 9u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay);
    frame.render_widget(modal(&notice, app.pending_notices(), &app.theme), overlay);
}

/// The modal for one notice. `pending` counts the notices still queued,
/// this one included.
pub fn modal(notice: &Notice, pending: usize, theme: &Theme) -> Paragraph<'static> {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(theme.alert).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if pending > 1 {
        lines.push(Line::from(Span::styled(
            format!("{} more waiting", pending - 1),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter/Esc to acknowledge",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Alert ")
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.alert));

    Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}
