//! Theme and Colors
//!
//! Dark backdrop, white card, one accent. Mirrors the portfolio page's
//! black-and-white look in terminal colors.

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// Card Palette
// ============================================================================

/// Card face
pub const CARD_FACE: Color = Color::Rgb(245, 245, 245);

/// Card outline
pub const CARD_EDGE: Color = Color::Rgb(200, 200, 200);

/// Name printed on the card
pub const CARD_TITLE: Color = Color::Rgb(20, 20, 20);

/// Subtitle on the card
pub const CARD_SUBTITLE: Color = Color::Rgb(90, 90, 90);

/// Lanyard strap
pub const STRAP: Color = Color::Rgb(230, 230, 230);

// ============================================================================
// Chat Colors
// ============================================================================

/// Visitor messages
pub const USER_TEXT: Color = Color::Rgb(130, 220, 130);

/// Agent messages
pub const AGENT_TEXT: Color = Color::Rgb(235, 235, 235);

/// Agent name in headers
pub const AGENT_ACCENT: Color = Color::Rgb(150, 180, 255);

/// Blinking reveal cursor
pub const TYPING_CURSOR: Color = Color::Rgb(255, 223, 128);

/// Timestamps, hints, separators
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Status messages
pub const STATUS_TEXT: Color = Color::Rgb(180, 180, 180);

// ============================================================================
// Buttons
// ============================================================================

/// Enabled button
#[must_use]
pub fn button_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(CARD_FACE)
        .add_modifier(Modifier::BOLD)
}

/// Disabled button
#[must_use]
pub fn button_disabled_style() -> Style {
    Style::default().fg(DIM_GRAY).bg(Color::Rgb(40, 40, 40))
}
