use serde::{Deserialize, Serialize};

use crate::error::RegionError;
use crate::gesture::{GestureConfig, LockSide};

/// Gap left between a clamped edge and the neighbor it ran into (seconds).
pub const OVERLAP_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoscrollConfig {
    /// Distance from the viewport edge (px) at which scrolling kicks in.
    pub edge_px: f64,
    pub interval_ms: u32,
    /// Upper bound on pixels scrolled per tick.
    pub max_speed: f64,
}

impl Default for AutoscrollConfig {
    fn default() -> Self {
        Self { edge_px: 120.0, interval_ms: 30, max_speed: 15.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub covered_color: String,
    pub uncovered_color: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            covered_color: "rgba(255, 255, 255, 0)".to_string(),
            uncovered_color: "rgba(0, 0, 0, 0.35)".to_string(),
        }
    }
}

/// Tunables for the regions layer. Every field has a default, so a JSON
/// document only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionsConfig {
    /// Activation threshold (px) for whole-region drags and drag-to-create.
    pub drag_threshold: f64,
    /// Activation threshold (px) for resize handles.
    pub handle_threshold: f64,
    pub mouse_button: i16,
    /// Touch moves this soon after the press are treated as scroll/tap noise.
    pub touch_delay_ms: f64,
    /// How long the click guard outlives a finished drag.
    pub click_guard_ms: u32,
    pub overlap_epsilon: f64,
    pub default_color: String,
    pub autoscroll: AutoscrollConfig,
    pub overlay: OverlayConfig,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3.0,
            handle_threshold: 1.0,
            mouse_button: 0,
            touch_delay_ms: 100.0,
            click_guard_ms: 10,
            overlap_epsilon: OVERLAP_EPSILON,
            default_color: "rgba(0, 0, 0, 0.1)".to_string(),
            autoscroll: AutoscrollConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl RegionsConfig {
    pub fn from_json(json: &str) -> Result<Self, RegionError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Gesture settings for dragging a whole region (no directional lock
    /// other than the grab offset).
    pub fn move_gesture(&self) -> GestureConfig {
        GestureConfig {
            threshold: self.drag_threshold,
            button: self.mouse_button,
            touch_delay_ms: self.touch_delay_ms,
            lock_side: None,
            suppress_lagging: true,
        }
    }

    pub fn handle_gesture(&self, side: LockSide) -> GestureConfig {
        GestureConfig {
            threshold: self.handle_threshold,
            button: self.mouse_button,
            touch_delay_ms: self.touch_delay_ms,
            lock_side: Some(side),
            suppress_lagging: true,
        }
    }

    /// Drag-to-create binds the static timeline, so the draft may grow and
    /// shrink in either direction.
    pub fn create_gesture(&self) -> GestureConfig {
        GestureConfig { suppress_lagging: false, ..self.move_gesture() }
    }
}
