//! Active-tool tracking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::shapes::ShapeKind;

/// Tools selectable from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Selection,
    Rectangle,
    Ellipse,
    Line,
    FreeformPath,
    /// Continuous pen handled natively by the surface.
    FreeformPen,
    Text,
    Image,
    Comment,
    Delete,
    Reset,
}

impl Tool {
    /// The kind drawn by a pointer gesture with this tool, if any.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            Tool::Rectangle => Some(ShapeKind::Rectangle),
            Tool::Ellipse => Some(ShapeKind::Ellipse),
            Tool::Line => Some(ShapeKind::Line),
            Tool::FreeformPath => Some(ShapeKind::FreeformPath),
            Tool::Text => Some(ShapeKind::Text),
            _ => None,
        }
    }

    /// Whether the surface should allow picking and dragging objects.
    pub fn selection_enabled(&self) -> bool {
        matches!(self, Tool::Selection | Tool::Image)
    }

    /// Whether the surface's native pen is on.
    pub fn native_drawing(&self) -> bool {
        *self == Tool::FreeformPen
    }
}

/// Side effect requested by a tool change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    /// The tool is now active; nothing else to do.
    Armed,
    /// Ask the host to open an image file picker.
    OpenFilePicker,
    /// Run delete-selected; the tool has already reverted.
    DeleteSelected,
    /// Run clear-all; the tool has already reverted.
    ClearAll,
}

/// Records which tool is armed and when it falls back to the default.
#[derive(Debug, Clone)]
pub struct ActiveToolTracker {
    current: Tool,
    default: Tool,
    sticky: HashSet<Tool>,
}

impl Default for ActiveToolTracker {
    fn default() -> Self {
        Self::new(Tool::Selection, [Tool::FreeformPen])
    }
}

impl ActiveToolTracker {
    pub fn new(default: Tool, sticky: impl IntoIterator<Item = Tool>) -> Self {
        Self {
            current: default,
            default,
            sticky: sticky.into_iter().collect(),
        }
    }

    pub fn current(&self) -> Tool {
        self.current
    }

    pub fn default_tool(&self) -> Tool {
        self.default
    }

    pub fn is_sticky(&self, tool: Tool) -> bool {
        self.sticky.contains(&tool)
    }

    /// Switch tools and report the side effect the caller must perform.
    pub fn set(&mut self, tool: Tool) -> ToolEffect {
        log::debug!("Tool {:?} -> {:?}", self.current, tool);
        match tool {
            Tool::Delete => {
                self.current = self.default;
                ToolEffect::DeleteSelected
            }
            Tool::Reset => {
                self.current = self.default;
                ToolEffect::ClearAll
            }
            Tool::Image => {
                self.current = Tool::Image;
                ToolEffect::OpenFilePicker
            }
            other => {
                self.current = other;
                ToolEffect::Armed
            }
        }
    }

    /// Return to the default tool.
    pub fn reset(&mut self) {
        self.current = self.default;
    }

    /// Called when a gesture completes. Returns true if the tool was reset.
    pub fn finish_gesture(&mut self) -> bool {
        if self.is_sticky(self.current) || self.current == self.default {
            return false;
        }
        self.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_and_reset_revert_immediately() {
        let mut tracker = ActiveToolTracker::default();
        tracker.set(Tool::Rectangle);
        assert_eq!(tracker.set(Tool::Delete), ToolEffect::DeleteSelected);
        assert_eq!(tracker.current(), Tool::Selection);

        tracker.set(Tool::Ellipse);
        assert_eq!(tracker.set(Tool::Reset), ToolEffect::ClearAll);
        assert_eq!(tracker.current(), Tool::Selection);
    }

    #[test]
    fn test_image_opens_picker_without_shape_kind() {
        let mut tracker = ActiveToolTracker::default();
        assert_eq!(tracker.set(Tool::Image), ToolEffect::OpenFilePicker);
        assert_eq!(tracker.current(), Tool::Image);
        assert_eq!(tracker.current().shape_kind(), None);
    }

    #[test]
    fn test_finish_gesture_respects_sticky() {
        let mut tracker = ActiveToolTracker::default();
        tracker.set(Tool::FreeformPen);
        assert!(!tracker.finish_gesture());
        assert_eq!(tracker.current(), Tool::FreeformPen);

        tracker.set(Tool::Line);
        assert!(tracker.finish_gesture());
        assert_eq!(tracker.current(), Tool::Selection);
    }

    #[test]
    fn test_comment_arms_without_shape() {
        let mut tracker = ActiveToolTracker::default();
        assert_eq!(tracker.set(Tool::Comment), ToolEffect::Armed);
        assert!(!Tool::Comment.selection_enabled());
        assert!(Tool::Comment.shape_kind().is_none());
    }

    #[test]
    fn test_tool_names_deserialize() {
        let tool: Tool = serde_json::from_str("\"freeform-pen\"").unwrap();
        assert_eq!(tool, Tool::FreeformPen);
    }
}
