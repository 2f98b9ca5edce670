//! Scrollable log viewer widget.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{
        Block, BorderType, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    },
    Frame,
};

use crate::{
    app::{LogEntry, LogLevel},
    theme::styles,
};

pub fn render(frame: &mut Frame, logs: &[LogEntry], scroll: usize, area: Rect) {
    let log_lines: Vec<Line> = logs.iter().map(log_line).collect();

    // Lines are not wrapped, so one entry is one row.
    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = logs.len().saturating_sub(visible_height);
    let top = scroll.saturating_sub(visible_height.saturating_sub(1)).min(max_scroll);

    let log_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border())
        .title(" Output ")
        .title_style(styles::secondary());

    let log_para = Paragraph::new(log_lines)
        .block(log_block)
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));

    frame.render_widget(log_para, area);

    if logs.len() > visible_height {
        let mut scrollbar_state = ScrollbarState::new(max_scroll)
            .position(top)
            .viewport_content_length(visible_height);

        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");

        frame.render_stateful_widget(
            scrollbar,
            area.inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn log_line(entry: &LogEntry) -> Line<'_> {
    // Installer output is shown verbatim.
    if entry.level == LogLevel::Output {
        return Line::from(Span::styled(entry.message.as_str(), styles::text()));
    }

    let (level_str, level_style) = match entry.level {
        LogLevel::Info => ("INF", styles::info()),
        LogLevel::Success => ("OK ", styles::success()),
        LogLevel::Warning => ("WRN", styles::warning()),
        LogLevel::Error => ("ERR", styles::error()),
        LogLevel::Output => ("   ", styles::text()),
    };

    Line::from(vec![
        Span::styled(format!("{} ", entry.timestamp.format("%H:%M:%S")), styles::muted()),
        Span::styled(format!("[{}] ", level_str), level_style),
        Span::styled(entry.message.as_str(), level_style),
    ])
}
