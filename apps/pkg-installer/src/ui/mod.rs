//! UI module for the package installer.
//!
//! Contains the screen renderers and custom widgets. Overlays are drawn after
//! the main screen so they sit on top of it.

pub mod screens;
pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::app::App;

/// Main UI renderer
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    screens::home::render(frame, app, chunks[0]);
    widgets::status_bar::render(frame, app, chunks[1]);

    if let Some(picker) = &app.picker {
        screens::picker::render(frame, picker, centered_rect(80, 80, frame.area()));
    }
    if app.confirming {
        widgets::dialog::render_confirm(frame, app, frame.area());
    }
    if let Some(alert) = &app.alert {
        widgets::dialog::render_alert(frame, alert, frame.area());
    }
}

/// Helper to create centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Helper to create centered rect with fixed size
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
