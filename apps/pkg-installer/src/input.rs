//! Keyboard routing.
//!
//! Modal layers take input in stacking order: alert, then confirmation
//! prompt, then file picker, then the main screen.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.request_quit();
        return;
    }

    if app.alert.is_some() {
        handle_alert_input(app, key.code);
    } else if app.confirming {
        handle_confirm_input(app, key.code);
    } else if app.picker.is_some() {
        handle_picker_input(app, key.code);
    } else {
        handle_main_input(app, key.code);
    }
}

fn handle_alert_input(app: &mut App, key: KeyCode) {
    if matches!(key, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.dismiss_alert();
    }
}

fn handle_confirm_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_install(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_install(),
        _ => {}
    }
}

fn handle_picker_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => app.close_picker(),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.picker_activate(),
        _ => {
            let Some(picker) = app.picker.as_mut() else {
                return;
            };
            match key {
                KeyCode::Up | KeyCode::Char('k') => picker.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => picker.select_next(),
                KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => picker.parent(),
                KeyCode::Char('.') => picker.toggle_hidden(),
                _ => {}
            }
        }
    }
}

fn handle_main_input(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Char('o') => app.open_picker(),
        KeyCode::Char('i') => app.request_install(),
        KeyCode::Char('r') => app.refresh_metadata(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_log_up(),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_log_down(),
        KeyCode::PageUp => app.scroll_info_up(),
        KeyCode::PageDown => app.scroll_info_down(),
        KeyCode::Char('q') => app.request_quit(),
        _ => {}
    }
}
