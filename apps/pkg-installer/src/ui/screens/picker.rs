//! File picker overlay.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    picker::{EntryKind, FilePicker},
    theme::{styles, symbols},
};

pub fn render(frame: &mut Frame, picker: &FilePicker, area: Rect) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border_active())
        .title(" Open Package ")
        .title_alignment(Alignment::Center)
        .title_style(styles::title());

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Current directory
            Constraint::Min(3),    // Entries
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    let location = Paragraph::new(Line::from(vec![
        Span::styled("Location: ", styles::muted()),
        Span::styled(picker.dir.display().to_string(), styles::text()),
    ]));
    frame.render_widget(location, chunks[0]);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border());

    if picker.entries.is_empty() {
        let message = match &picker.error {
            Some(err) => Line::from(Span::styled(format!("Cannot read directory: {err}"), styles::error())),
            None => Line::from(Span::styled(
                "No package archives or folders here.",
                styles::muted(),
            )),
        };
        let empty = Paragraph::new(Text::from(vec![Line::from(""), message]))
            .alignment(Alignment::Center)
            .block(list_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        let items: Vec<ListItem> = picker
            .entries
            .iter()
            .map(|entry| {
                let (symbol, name, style) = match entry.kind {
                    EntryKind::Directory => {
                        (symbols::FOLDER, format!("{}/", entry.name), styles::info())
                    }
                    EntryKind::Package => (symbols::PACKAGE, entry.name.clone(), styles::text()),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {symbol} "), style),
                    Span::styled(name, style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(list_block)
            .highlight_style(styles::highlight())
            .highlight_symbol(symbols::ARROW_RIGHT);

        let mut state = ListState::default();
        state.select(Some(picker.selected));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    let hidden = if picker.show_hidden { " Hide hidden  " } else { " Show hidden  " };
    let hints = Line::from(vec![
        Span::styled("Enter", styles::key_hint()),
        Span::styled(" Open/Select  ", styles::muted()),
        Span::styled("Backspace", styles::key_hint()),
        Span::styled(" Parent  ", styles::muted()),
        Span::styled(".", styles::key_hint()),
        Span::styled(hidden, styles::muted()),
        Span::styled("Esc", styles::key_hint()),
        Span::styled(" Cancel", styles::muted()),
    ]);
    frame.render_widget(Paragraph::new(hints).alignment(Alignment::Center), chunks[2]);
}
