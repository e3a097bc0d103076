//! Viewport Layout Policy
//!
//! Derives the mobile/desktop layout flags from the live viewport width.
//! Recomputed on every resize; there is no debouncing.

use serde::{Deserialize, Serialize};

/// Widths at or below this are laid out as mobile
pub const DEFAULT_MOBILE_MAX_WIDTH: u32 = 768;

/// Widths below this use the reduced rope resolution
pub const DEFAULT_SMALL_MAX_WIDTH: u32 = 1024;

/// Rope resolution used on large viewports
pub const FULL_ROPE_RESOLUTION: (u32, u32) = (1920, 1080);

/// Thresholds for the layout flags, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportPolicy {
    /// `width <= mobile_max_width` is mobile
    pub mobile_max_width: u32,
    /// `width < small_max_width` is small
    pub small_max_width: u32,
}

impl Default for ViewportPolicy {
    fn default() -> Self {
        Self {
            mobile_max_width: DEFAULT_MOBILE_MAX_WIDTH,
            small_max_width: DEFAULT_SMALL_MAX_WIDTH,
        }
    }
}

impl ViewportPolicy {
    /// Compute the layout for a viewport
    #[must_use]
    pub fn layout(&self, width: u32, height: u32) -> Layout {
        Layout {
            width,
            height,
            is_mobile: width <= self.mobile_max_width,
            is_small: width < self.small_max_width,
        }
    }
}

/// Layout flags for the current viewport
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Mobile layout (chat replaces the scene instead of splitting)
    pub is_mobile: bool,
    /// Reduced rope quality
    pub is_small: bool,
}

impl Default for Layout {
    fn default() -> Self {
        ViewportPolicy::default().layout(1280, 800)
    }
}

impl Layout {
    /// Whether the scene is drawn at all
    #[must_use]
    pub fn shows_scene(&self, chat_mode: bool) -> bool {
        !self.is_mobile || !chat_mode
    }

    /// Whether scene and chat share the screen side by side
    #[must_use]
    pub fn split_view(&self, chat_mode: bool) -> bool {
        chat_mode && !self.is_mobile
    }

    /// Whether the custom cursor overlay is active
    #[must_use]
    pub fn cursor_overlay(&self) -> bool {
        !self.is_mobile
    }

    /// Resolution the rope material renders at
    #[must_use]
    pub fn rope_resolution(&self) -> (u32, u32) {
        if self.is_small {
            (self.width, self.height)
        } else {
            FULL_ROPE_RESOLUTION
        }
    }

    /// Rope line width
    #[must_use]
    pub fn rope_line_width(&self) -> f32 {
        if self.is_small {
            1.8
        } else {
            1.2
        }
    }
}
