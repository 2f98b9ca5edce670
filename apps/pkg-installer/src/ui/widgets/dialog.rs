//! Modal popups: install confirmation and alerts.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::{
    app::{Alert, AlertKind, App},
    theme::styles,
    ui::centered_rect_fixed,
};

pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let name = app
        .state()
        .package()
        .map(|p| p.file_name())
        .unwrap_or_default();

    let text = Text::from(vec![
        Line::from(""),
        Line::from(Span::styled("Install this package?", styles::header())),
        Line::from(""),
        Line::from(Span::styled(name, styles::primary())),
        Line::from(""),
        Line::from(Span::styled(
            "Administrator privileges are required.",
            styles::muted(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", styles::key_hint()),
            Span::styled(" Install  ", styles::muted()),
            Span::styled("n", styles::key_hint()),
            Span::styled(" Cancel", styles::muted()),
        ]),
    ]);

    render_popup(frame, area, " Confirm Installation ", styles::border_active(), text, 60, 11);
}

pub fn render_alert(frame: &mut Frame, alert: &Alert, area: Rect) {
    let (symbol, style) = match alert.kind {
        AlertKind::Info => ("ℹ", styles::info()),
        AlertKind::Success => ("✓", styles::success()),
        AlertKind::Error => ("✗", styles::error()),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("{symbol} {}", alert.title), style)),
        Line::from(""),
    ];
    lines.extend(
        alert
            .message
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), styles::text()))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", styles::key_hint()),
        Span::styled(" OK", styles::muted()),
    ]));

    // Room for wrapped message lines.
    let height = u16::try_from(lines.len() + 4).unwrap_or(u16::MAX).min(20);
    render_popup(frame, area, " Notice ", style, Text::from(lines), 70, height);
}

fn render_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    border_style: ratatui::style::Style,
    text: Text,
    width: u16,
    height: u16,
) {
    let popup = centered_rect_fixed(width, height, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(title)
        .title_alignment(Alignment::Center)
        .title_style(border_style);

    let body = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(body, popup);
}
