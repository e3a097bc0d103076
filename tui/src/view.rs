//! Chat Overlay Rendering
//!
//! Pure drawing functions over a [`ChatWidget`]. Nothing here mutates the
//! widget; scroll position is owned by the app and passed in.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use lanyard_core::{ChatWidget, Message, Sender};

use crate::theme::{
    button_disabled_style, button_style, AGENT_ACCENT, AGENT_TEXT, DIM_GRAY, STATUS_TEXT,
    TYPING_CURSOR, USER_TEXT,
};

/// Rows taken by the input box (separator, draft, hint)
pub const INPUT_HEIGHT: u16 = 3;

/// Rows taken by the chat header
pub const HEADER_HEIGHT: u16 = 2;

/// Shown after a message that is still being revealed
pub const TYPING_CURSOR_GLYPH: &str = "|";

/// Shown while a reply is outstanding
pub const WAITING_INDICATOR: &str = "...";

/// Label of the portfolio action
pub const VIEW_PORTFOLIO_LABEL: &str = "View Portfolio";

/// Label of the chat action
pub const TALK_LABEL: &str = "Talk with My Agent";

/// Hint under the input box
pub const SEND_HINT: &str = "Press Enter to send";

/// Display name of the agent
#[must_use]
pub fn agent_name(owner: &str) -> String {
    format!("{owner}'s Agent")
}

/// One wrapped, styled row of the conversation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatLine {
    /// Row text
    pub text: String,
    /// Row style
    pub style: Style,
}

impl ChatLine {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Build every conversation row for `width` columns
///
/// `cursor_on` controls the blink phase of the typing cursor.
#[must_use]
pub fn conversation_lines(widget: &ChatWidget, width: usize, cursor_on: bool) -> Vec<ChatLine> {
    let width = width.max(8);
    let agent = agent_name(widget.owner());
    let mut lines = Vec::new();

    for message in widget.transcript() {
        lines.push(header_line(message, &agent));

        let body_style = match message.sender {
            Sender::User => Style::default().fg(USER_TEXT),
            Sender::Agent => Style::default().fg(AGENT_TEXT),
        };
        let mut body = message.visible_text().to_string();
        if message.is_typing() && cursor_on {
            body.push_str(TYPING_CURSOR_GLYPH);
        }

        for wrapped in textwrap::wrap(&body, width) {
            lines.push(ChatLine::new(wrapped.into_owned(), body_style));
        }
        lines.push(ChatLine::new(String::new(), Style::default()));
    }

    if widget.is_waiting() {
        lines.push(ChatLine::new(
            format!("{agent} {WAITING_INDICATOR}"),
            Style::default().fg(TYPING_CURSOR),
        ));
    }

    lines
}

fn header_line(message: &Message, agent: &str) -> ChatLine {
    let time = message.formatted_time();
    match message.sender {
        Sender::User => ChatLine::new(
            format!("You · {time}"),
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::BOLD),
        ),
        Sender::Agent => ChatLine::new(
            format!("{agent} · {time}"),
            Style::default().fg(AGENT_ACCENT).add_modifier(Modifier::BOLD),
        ),
    }
}

/// Draw the chat overlay
///
/// `scroll_offset` counts lines up from the bottom; it is clamped to the
/// available history.
pub fn render_chat(
    area: Rect,
    buf: &mut Buffer,
    widget: &ChatWidget,
    scroll_offset: &mut usize,
    cursor_on: bool,
) {
    if area.width < 12 || area.height < HEADER_HEIGHT + INPUT_HEIGHT + 1 {
        return;
    }

    render_header(Rect::new(area.x, area.y, area.width, HEADER_HEIGHT), buf, widget);

    let convo = Rect::new(
        area.x + 1,
        area.y + HEADER_HEIGHT,
        area.width.saturating_sub(2),
        area.height - HEADER_HEIGHT - INPUT_HEIGHT,
    );
    render_conversation(convo, buf, widget, scroll_offset, cursor_on);

    let input = Rect::new(
        area.x,
        area.bottom() - INPUT_HEIGHT,
        area.width,
        INPUT_HEIGHT,
    );
    render_input(input, buf, widget);
}

fn render_header(area: Rect, buf: &mut Buffer, widget: &ChatWidget) {
    let title = agent_name(widget.owner());
    buf.set_string(
        area.x + 1,
        area.y,
        &title,
        Style::default().fg(AGENT_ACCENT).add_modifier(Modifier::BOLD),
    );

    let close = if widget.layout().is_mobile {
        "← Back (Esc)"
    } else {
        "× (Esc)"
    };
    let close_width = u16::try_from(close.chars().count()).unwrap_or(area.width);
    if area.width > close_width + 2 {
        buf.set_string(
            area.right() - close_width - 1,
            area.y,
            close,
            Style::default().fg(DIM_GRAY),
        );
    }

    buf.set_string(
        area.x,
        area.y + 1,
        "─".repeat(usize::from(area.width)),
        Style::default().fg(DIM_GRAY),
    );
}

fn render_conversation(
    area: Rect,
    buf: &mut Buffer,
    widget: &ChatWidget,
    scroll_offset: &mut usize,
    cursor_on: bool,
) {
    let lines = conversation_lines(widget, usize::from(area.width), cursor_on);
    let height = usize::from(area.height);

    let max_scroll = lines.len().saturating_sub(height);
    if *scroll_offset > max_scroll {
        *scroll_offset = max_scroll;
    }

    let visible_end = lines.len().saturating_sub(*scroll_offset);
    let visible_start = visible_end.saturating_sub(height);

    for (row, line) in lines[visible_start..visible_end].iter().enumerate() {
        let Ok(row) = u16::try_from(row) else {
            break;
        };
        let text: String = line.text.chars().take(usize::from(area.width)).collect();
        buf.set_string(area.x, area.y + row, text, line.style);
    }

    if visible_start > 0 {
        buf.set_string(area.right().saturating_sub(1), area.y, "^", Style::default().fg(DIM_GRAY));
    }
}

fn render_input(area: Rect, buf: &mut Buffer, widget: &ChatWidget) {
    buf.set_string(
        area.x,
        area.y,
        "─".repeat(usize::from(area.width)),
        Style::default().fg(DIM_GRAY),
    );

    let send = "[ Send ]";
    let send_width = 8;
    let text_width = usize::from(area.width.saturating_sub(send_width + 3));

    // Only the last line of a multi-line draft fits; show its tail
    let draft = widget.input().rsplit('\n').next().unwrap_or_default();
    let mut shown = format!("> {draft}▏");
    let overflow = shown.chars().count().saturating_sub(text_width);
    if overflow > 0 {
        shown = shown.chars().skip(overflow).collect();
    }
    buf.set_string(area.x + 1, area.y + 1, shown, Style::default().fg(USER_TEXT));

    let send_style = if widget.can_send() {
        button_style()
    } else {
        button_disabled_style()
    };
    buf.set_string(area.right() - send_width - 1, area.y + 1, send, send_style);

    buf.set_string(area.x + 1, area.y + 2, SEND_HINT, Style::default().fg(DIM_GRAY));
}

/// Draw the two landing actions centered in `area`
pub fn render_actions(area: Rect, buf: &mut Buffer) {
    let portfolio = format!("[ {VIEW_PORTFOLIO_LABEL} (p) ]");
    let talk = format!("[ {TALK_LABEL} (Tab) ]");
    let total = portfolio.chars().count() + talk.chars().count() + 3;

    let Ok(total) = u16::try_from(total) else {
        return;
    };
    if area.width < total || area.height == 0 {
        return;
    }

    let left = area.x + (area.width - total) / 2;
    buf.set_string(left, area.y, &portfolio, button_style());
    let talk_x = left + u16::try_from(portfolio.chars().count() + 3).unwrap_or(0);
    buf.set_string(talk_x, area.y, &talk, button_style());
}

/// Draw a one-line status bar
pub fn render_status(area: Rect, buf: &mut Buffer, text: &str) {
    if area.height == 0 {
        return;
    }
    let text: String = text.chars().take(usize::from(area.width)).collect();
    buf.set_string(area.x, area.y, text, Style::default().fg(STATUS_TEXT));
}
