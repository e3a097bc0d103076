//! Scene Description
//!
//! The lanyard-and-card scene is presentation only. The core describes it
//! declaratively and hands it to whatever [`SceneRenderer`] the surface
//! provides; no physics is simulated here.

use serde::{Deserialize, Serialize};

use crate::layout::Layout;

/// Number of rope joints between the fixed anchor and the card
pub const ROPE_JOINTS: usize = 3;

/// Declarative description of the lanyard scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Camera position
    pub camera_position: [f32; 3],
    /// Camera field of view in degrees
    pub fov: f32,
    /// Gravity vector for the physics rig
    pub gravity: [f32; 3],
    /// Physics step in seconds
    pub timestep: f32,
    /// Whether the canvas background is transparent
    pub transparent: bool,
    /// Length of each rope segment
    pub rope_segment_length: f32,
    /// Rope render resolution
    pub rope_resolution: (u32, u32),
    /// Rope line width
    pub rope_line_width: f32,
    /// Name printed on the card
    pub card_title: String,
    /// Second line on the card
    pub card_subtitle: String,
    /// Whether the scene shares the screen with the chat
    pub split_view: bool,
}

impl SceneDescription {
    /// Describe the scene for the given owner and layout
    #[must_use]
    pub fn for_layout(owner: &str, layout: &Layout, chat_mode: bool) -> Self {
        Self {
            camera_position: [0.0, 0.0, 20.0],
            fov: 45.0,
            gravity: [0.0, -40.0, 0.0],
            timestep: 1.0 / 60.0,
            transparent: true,
            rope_segment_length: 1.5,
            rope_resolution: layout.rope_resolution(),
            rope_line_width: layout.rope_line_width(),
            card_title: owner.to_string(),
            card_subtitle: "Creative Developer".to_string(),
            split_view: layout.split_view(chat_mode),
        }
    }
}

/// Capability to draw a scene
///
/// Surfaces implement this however they like; the description is the whole
/// contract.
pub trait SceneRenderer {
    /// Draw the scene
    fn render(&mut self, scene: &SceneDescription);
}
