//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::config::ThemeMode;

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score-based colors (traffic light pattern, high is good)
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,
    pub score_none: Color,

    // Table and list colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,
    pub pane_focused: Color,
    pub pane_unfocused: Color,

    // General colors
    pub muted: Color,
    pub title_color: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
    pub input_focused: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            score_none: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            pane_focused: Color::Cyan,
            pane_unfocused: Color::Indexed(238),
            muted: Color::Gray,
            title_color: Color::Cyan,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
            input_focused: Style::new().fg(Color::Black).bg(Color::Cyan),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Rgb(0, 128, 0),
            score_mid: Color::Rgb(176, 112, 0),
            score_low: Color::Rgb(192, 0, 0),
            score_none: Color::Gray,
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Gray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            pane_focused: Color::Blue,
            pane_unfocused: Color::Indexed(250),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 0),
            flash_error: Color::Rgb(192, 0, 0),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            popup_bg: Color::Indexed(255),
            input_focused: Style::new().fg(Color::White).bg(Color::Blue),
        }
    }

    /// Color for an average on the 1-10 scale; unrated technicians are muted
    pub fn score_color(&self, score: f64, rated: bool) -> Color {
        if !rated {
            self.score_none
        } else if score >= 7.0 {
            self.score_high
        } else if score >= 4.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }
}

/// Pick the palette for the configured mode, probing the terminal in auto mode
pub fn resolve_theme(mode: ThemeMode) -> ThemeColors {
    match mode {
        ThemeMode::Dark => ThemeColors::dark(),
        ThemeMode::Light => ThemeColors::light(),
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => ThemeColors::light(),
            _ => ThemeColors::dark(),
        },
    }
}
