//! Color scheme and shared styles.

use ratatui::style::{Color, Modifier, Style};

/// Primary accent - pacman blue
pub const PRIMARY: Color = Color::Rgb(23, 147, 209); // #1793D1

/// Success color - Green
pub const SUCCESS: Color = Color::Rgb(34, 197, 94); // #22C55E

/// Warning color - Yellow
pub const WARNING: Color = Color::Rgb(234, 179, 8); // #EAB308

/// Error color - Red
pub const ERROR: Color = Color::Rgb(239, 68, 68); // #EF4444

/// Info color - Teal
pub const INFO: Color = Color::Rgb(45, 212, 191); // #2DD4BF

/// Foreground/Text color - Light
pub const FOREGROUND: Color = Color::Rgb(229, 231, 235); // #E5E7EB

/// Border color
pub const BORDER: Color = Color::Rgb(75, 85, 99); // #4B5563

/// Muted text color
pub const MUTED: Color = Color::Rgb(107, 114, 128); // #6B7280

/// Secondary text color
pub const SECONDARY: Color = Color::Rgb(156, 163, 175); // #9CA3AF

pub mod symbols {
    pub const ARROW_RIGHT: &str = "▶";
    pub const FOLDER: &str = "▸";
    pub const PACKAGE: &str = "◆";
    pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
}

/// Pre-built styles for common UI elements
pub mod styles {
    use super::*;

    pub fn text() -> Style {
        Style::default().fg(FOREGROUND)
    }

    pub fn primary() -> Style {
        Style::default().fg(PRIMARY)
    }

    pub fn success() -> Style {
        Style::default().fg(SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(ERROR)
    }

    pub fn info() -> Style {
        Style::default().fg(INFO)
    }

    pub fn muted() -> Style {
        Style::default().fg(MUTED)
    }

    pub fn secondary() -> Style {
        Style::default().fg(SECONDARY)
    }

    pub fn title() -> Style {
        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
    }

    /// Highlighted/selected item
    pub fn highlight() -> Style {
        Style::default()
            .fg(Color::Black)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(BORDER)
    }

    pub fn border_active() -> Style {
        Style::default().fg(PRIMARY)
    }

    pub fn header() -> Style {
        Style::default().fg(FOREGROUND).add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for keyboard shortcuts)
    pub fn key_hint() -> Style {
        Style::default().fg(INFO)
    }

    /// Install control, greyed out when unavailable
    pub fn key_hint_disabled() -> Style {
        Style::default().fg(MUTED).add_modifier(Modifier::DIM)
    }
}

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Product name
pub const PRODUCT_NAME: &str = "pkg-installer";
