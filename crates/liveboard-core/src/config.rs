//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::shapes::ShapeStyle;
use crate::tools::Tool;

/// Tunables for one collaborative session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Tool armed at start and after discrete actions.
    pub default_tool: Tool,
    /// Tools that stay armed after a gesture completes.
    pub sticky_tools: Vec<Tool>,
    /// Style applied to newly drawn shapes.
    pub default_style: ShapeStyle,
    /// Content of a freshly placed text object.
    pub text_placeholder: String,
    /// Ramer-Douglas-Peucker tolerance for freeform paths (0 disables).
    pub freeform_tolerance: f64,
    /// Inserted images are scaled down to fit this square.
    pub max_image_size: f64,
    /// Pointer slop used when picking objects.
    pub hit_tolerance: f64,
    pub max_undo_steps: usize,
    /// Local edits closer together than this are undone as one step.
    pub undo_merge_interval_ms: i64,
    /// Keep an object being dragged locally out of remote re-renders.
    pub suppress_remote_during_gesture: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_tool: Tool::Selection,
            sticky_tools: vec![Tool::FreeformPen],
            default_style: ShapeStyle::default(),
            text_placeholder: "Tap to type".to_string(),
            freeform_tolerance: 0.5,
            max_image_size: 800.0,
            hit_tolerance: 4.0,
            max_undo_steps: 100,
            undo_merge_interval_ms: 0,
            suppress_remote_during_gesture: true,
        }
    }
}

impl SessionConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
