//! Status bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::{
    app::App,
    installer::controller::InstallerState,
    theme::{styles, PRODUCT_NAME, VERSION},
};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let state = app.state();
    let state_style: Style = match state {
        InstallerState::Idle => styles::muted(),
        InstallerState::Selected { .. } => styles::success(),
        InstallerState::Installing { .. } => styles::warning(),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", PRODUCT_NAME), styles::primary()),
        Span::styled("│", styles::border()),
        Span::styled(format!(" {} ", state.name()), state_style),
    ];
    if state.is_installing() {
        spans.push(Span::styled(format!("{} ", app.spinner()), styles::primary()));
    }
    spans.extend([
        Span::styled("│", styles::border()),
        Span::styled(format!(" {} log lines ", app.logs.len()), styles::muted()),
        Span::styled("│", styles::border()),
        Span::styled(format!(" v{} ", VERSION), styles::muted()),
    ]);

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
