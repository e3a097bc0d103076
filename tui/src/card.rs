//! Lanyard Card
//!
//! Terminal rendition of the hanging ID card. The physics rig of the web
//! page becomes a gentle sway: the strap hangs from the top edge and the
//! card swings a column or two either side of center.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use lanyard_core::{SceneDescription, SceneRenderer};

use crate::theme::{CARD_EDGE, CARD_FACE, CARD_SUBTITLE, CARD_TITLE, STRAP};

/// Card width in cells (including border)
pub const CARD_WIDTH: u16 = 24;

/// Card height in cells (including border)
pub const CARD_HEIGHT: u16 = 9;

/// Frames per full swing
const SWAY_PERIOD: u32 = 40;

/// Draws the lanyard scene into a ratatui buffer
#[derive(Debug, Default)]
pub struct CardRenderer {
    scene: Option<SceneDescription>,
    frame: u32,
}

impl SceneRenderer for CardRenderer {
    fn render(&mut self, scene: &SceneDescription) {
        self.scene = Some(scene.clone());
    }
}

impl CardRenderer {
    /// Create a renderer with no scene yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The scene most recently handed over
    #[must_use]
    pub fn scene(&self) -> Option<&SceneDescription> {
        self.scene.as_ref()
    }

    /// Advance the sway animation one frame
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % SWAY_PERIOD;
    }

    /// Horizontal offset of the card for the current frame
    ///
    /// Stronger gravity means a shorter, stiffer swing.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sway(&self) -> i16 {
        let Some(scene) = &self.scene else {
            return 0;
        };
        let stiffness = (scene.gravity[1].abs() / 20.0).max(1.0);
        let amplitude = 3.0 / stiffness;
        let phase = f64::from(self.frame) / f64::from(SWAY_PERIOD) * std::f64::consts::TAU;
        (phase.sin() * f64::from(amplitude)).round() as i16
    }

    /// Draw into `area` of `buf`
    pub fn draw(&self, area: Rect, buf: &mut Buffer) {
        let Some(scene) = &self.scene else {
            return;
        };
        if area.width < CARD_WIDTH + 4 || area.height < CARD_HEIGHT + 2 {
            // Too small for the card; just the name
            buf.set_string(area.x, area.y, &scene.card_title, Style::default().fg(CARD_FACE));
            return;
        }

        let center = i32::from(area.x) + i32::from(area.width / 2) + i32::from(self.sway());
        let strap_len = (area.height - CARD_HEIGHT) / 2;
        let strap_style = Style::default().fg(STRAP);

        // Strap: straight down from the anchor, leaning toward the card
        let anchor_x = area.x + area.width / 2;
        for row in 0..strap_len {
            let t = f64::from(row) / f64::from(strap_len.max(1));
            let x = f64::from(anchor_x) + (f64::from(center) - f64::from(anchor_x)) * t;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let x = x.round().max(0.0) as u16;
            buf.set_string(x, area.y + row, "│", strap_style);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let left = (center - i32::from(CARD_WIDTH / 2)).max(i32::from(area.x)) as u16;
        let left = left.min(area.right().saturating_sub(CARD_WIDTH));
        let top = area.y + strap_len;
        draw_card(buf, left, top, scene);
    }
}

fn draw_card(buf: &mut Buffer, left: u16, top: u16, scene: &SceneDescription) {
    let edge = Style::default().fg(CARD_EDGE).bg(CARD_FACE);
    let face = Style::default().bg(CARD_FACE);
    let inner = usize::from(CARD_WIDTH - 2);

    buf.set_string(left, top, format!("╭{}╮", "─".repeat(inner)), edge);
    for row in 1..CARD_HEIGHT - 1 {
        buf.set_string(left, top + row, "│", edge);
        buf.set_string(left + 1, top + row, " ".repeat(inner), face);
        buf.set_string(left + CARD_WIDTH - 1, top + row, "│", edge);
    }
    buf.set_string(
        left,
        top + CARD_HEIGHT - 1,
        format!("╰{}╯", "─".repeat(inner)),
        edge,
    );

    // Clip hole
    buf.set_string(left + CARD_WIDTH / 2 - 1, top + 1, "══", edge);

    let title = centered(&scene.card_title, inner);
    buf.set_string(left + 1, top + 4, title, face.fg(CARD_TITLE));
    let subtitle = centered(&scene.card_subtitle, inner);
    buf.set_string(left + 1, top + 5, subtitle, face.fg(CARD_SUBTITLE));
}

fn centered(text: &str, width: usize) -> String {
    let text: String = text.chars().take(width).collect();
    let pad = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanyard_core::Layout;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn renderer() -> CardRenderer {
        let mut renderer = CardRenderer::new();
        renderer.render(&SceneDescription::for_layout("JC", &Layout::default(), false));
        renderer
    }

    #[test]
    fn test_nothing_drawn_without_scene() {
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        CardRenderer::new().draw(area, &mut buf);
        assert!(buffer_text(&buf).trim().is_empty());
    }

    #[test]
    fn test_card_shows_owner_and_subtitle() {
        let area = Rect::new(0, 0, 40, 20);
        let mut buf = Buffer::empty(area);
        renderer().draw(area, &mut buf);

        let text = buffer_text(&buf);
        assert!(text.contains("JC"));
        assert!(text.contains("Creative Developer"));
        assert!(text.contains('│'));
    }

    #[test]
    fn test_small_area_falls_back_to_name() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buf = Buffer::empty(area);
        renderer().draw(area, &mut buf);
        assert!(buffer_text(&buf).contains("JC"));
    }

    #[test]
    fn test_sway_stays_bounded() {
        let mut renderer = renderer();
        for _ in 0..SWAY_PERIOD * 2 {
            renderer.tick();
            assert!(renderer.sway().abs() <= 3);
        }
    }
}
