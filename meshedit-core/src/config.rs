//! Editor tuning knobs

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;

/// Interaction settings for the editor.
///
/// Every field has a default, so a partial JSON document only overrides
/// the values it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Divisor applied to screen-radius change when scaling (pixels · distance per unit of scale)
    pub scaling_sensitivity: f32,
    /// Radians of rotation per world unit of near-plane pointer travel
    pub rotation_speed: f32,
    /// Fraction of the camera distance covered by one scroll step
    pub zoom_speed: f32,
    /// Closest the camera may get to its target
    pub min_camera_distance: f32,
    /// Clicking empty space clears the selection
    pub clear_selection_on_miss: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scaling_sensitivity: 1000.0,
            rotation_speed: 40.0,
            zoom_speed: 0.1,
            min_camera_distance: 0.5,
            clear_selection_on_miss: true,
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON, falling back to defaults for missing fields.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration as pretty JSON.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
