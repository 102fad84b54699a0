use ratatui::style::{Color, Modifier, Style};

use crate::pipeline::ToastKind;

/// Color scheme for the board
pub struct BoardColors;

impl BoardColors {
    // Stage accents
    pub const LEAD: Color = Color::Gray;
    pub const QUALIFIED: Color = Color::Blue;
    pub const PROPOSAL: Color = Color::Magenta;
    pub const NEGOTIATION: Color = Color::Yellow;
    pub const WON: Color = Color::Green;
    pub const LOST: Color = Color::Red;
    pub const OTHER: Color = Color::Gray;

    // Toasts
    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;

    // UI chrome
    pub const HEADER: Color = Color::White;
    pub const DIMMED: Color = Color::DarkGray;
    pub const BORDER: Color = Color::Gray;
    pub const HOVER: Color = Color::Cyan;
    pub const MONEY: Color = Color::Green;
    pub const FILTER_ACTIVE: Color = Color::Yellow;
}

/// Accent for a stage, by its key.
pub fn stage_accent(key: &str) -> Color {
    match key {
        "lead" => BoardColors::LEAD,
        "qualified" => BoardColors::QUALIFIED,
        "proposal" => BoardColors::PROPOSAL,
        "negotiation" => BoardColors::NEGOTIATION,
        "won" => BoardColors::WON,
        "lost" => BoardColors::LOST,
        _ => BoardColors::OTHER,
    }
}

/// Theme provides pre-built styles
pub struct Theme;

impl Theme {
    pub fn header() -> Style {
        Style::default()
            .fg(BoardColors::HEADER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(BoardColors::DIMMED)
    }

    pub fn border() -> Style {
        Style::default().fg(BoardColors::BORDER)
    }

    pub fn column_border(key: &str, hovered: bool) -> Style {
        if hovered {
            Style::default()
                .fg(BoardColors::HOVER)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(stage_accent(key))
        }
    }

    pub fn stage_title(key: &str) -> Style {
        Style::default()
            .fg(stage_accent(key))
            .add_modifier(Modifier::BOLD)
    }

    pub fn money() -> Style {
        Style::default().fg(BoardColors::MONEY)
    }

    pub fn card_title() -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    /// Card left behind in its column while a copy is dragged.
    pub fn card_placeholder() -> Style {
        Style::default()
            .fg(BoardColors::DIMMED)
            .add_modifier(Modifier::DIM)
    }

    pub fn drag_overlay() -> Style {
        Style::default()
            .fg(BoardColors::HOVER)
            .add_modifier(Modifier::BOLD)
    }

    pub fn filter(active: bool) -> Style {
        if active {
            Style::default()
                .fg(BoardColors::FILTER_ACTIVE)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    }

    pub fn toast(kind: ToastKind) -> Style {
        let color = match kind {
            ToastKind::Success => BoardColors::SUCCESS,
            ToastKind::Error => BoardColors::ERROR,
        };
        Style::default().fg(color)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(BoardColors::ERROR)
            .add_modifier(Modifier::BOLD)
    }
}
