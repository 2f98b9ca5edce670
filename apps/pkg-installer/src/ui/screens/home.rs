//! Main screen: selected package, metadata preview and installer output.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::{
    app::App,
    installer::controller::InstallerState,
    theme::{styles, symbols},
    ui::widgets::log_viewer,
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border_active())
        .title(" Package Installer ")
        .title_alignment(Alignment::Center)
        .title_style(styles::title());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),      // Selected package
            Constraint::Percentage(45), // Package info
            Constraint::Min(6),         // Output log
            Constraint::Length(1),      // Key hints
        ])
        .split(inner);

    render_header(frame, app, chunks[0]);
    render_info(frame, app, chunks[1]);
    log_viewer::render(frame, &app.logs, app.log_scroll, chunks[2]);
    render_hints(frame, app, chunks[3]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.state() {
        InstallerState::Idle => Line::from(vec![
            Span::styled("No package selected. Press ", styles::muted()),
            Span::styled("o", styles::key_hint()),
            Span::styled(" to choose an archive.", styles::muted()),
        ]),
        InstallerState::Selected { package, .. } => Line::from(vec![
            Span::styled(format!("{} ", symbols::PACKAGE), styles::primary()),
            Span::styled(package.file_name(), styles::header()),
            Span::styled(
                format!("  {}", package.directory().map(|d| d.display().to_string()).unwrap_or_default()),
                styles::muted(),
            ),
        ]),
        InstallerState::Installing { package, .. } => Line::from(vec![
            Span::styled(format!("{} ", app.spinner()), styles::primary()),
            Span::styled(format!("Installing {}", package.file_name()), styles::header()),
        ]),
    };

    frame.render_widget(Paragraph::new(Text::from(vec![line])), area);
}

fn render_info(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border())
        .title(" Package Info ")
        .title_style(styles::secondary());

    let text = match app.state().metadata() {
        Some(metadata) => Text::from(
            metadata
                .lines()
                .map(|l| Line::from(Span::styled(l, styles::text())))
                .collect::<Vec<_>>(),
        ),
        None => Text::from(Line::from(Span::styled(
            "Select a package archive to see its details.",
            styles::muted(),
        ))),
    };

    let info = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.info_scroll, 0));
    frame.render_widget(info, area);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let install_style = if app.state().can_install() {
        styles::key_hint()
    } else {
        styles::key_hint_disabled()
    };

    let hints = Line::from(vec![
        Span::styled("o", styles::key_hint()),
        Span::styled(" Open  ", styles::muted()),
        Span::styled("i", install_style),
        Span::styled(" Install  ", styles::muted()),
        Span::styled("r", styles::key_hint()),
        Span::styled(" Refresh  ", styles::muted()),
        Span::styled("↑/↓", styles::key_hint()),
        Span::styled(" Scroll log  ", styles::muted()),
        Span::styled("PgUp/PgDn", styles::key_hint()),
        Span::styled(" Scroll info  ", styles::muted()),
        Span::styled("q", styles::key_hint()),
        Span::styled(" Quit", styles::muted()),
    ]);
    frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), area);
}
