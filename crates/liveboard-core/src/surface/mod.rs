//! Canvas surface contract.
//!
//! The surface owns the live drawable objects. The engine refers to them only
//! through [`ObjectHandle`]s and never keeps a borrow past one event.

mod scene;

pub use scene::SceneSurface;

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::events::SurfaceEvent;
use crate::shapes::{Drawable, ShapeStyle};

/// Transient, surface-assigned handle to one displayed object.
///
/// Handles are not reused within one surface, so a stale handle never aliases
/// a newer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(pub u64);

/// Display list and input source the engine drives.
pub trait CanvasSurface {
    /// Add an object on top of the display list.
    fn add(&mut self, object: Drawable) -> ObjectHandle;

    /// Remove an object. Clears the active object if it was this one.
    fn remove(&mut self, handle: ObjectHandle) -> Option<Drawable>;

    /// Remove every object.
    fn clear(&mut self);

    fn object(&self, handle: ObjectHandle) -> Option<&Drawable>;

    fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut Drawable>;

    /// Handles in paint order (back to front).
    fn handles(&self) -> Vec<ObjectHandle>;

    fn len(&self) -> usize {
        self.handles().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Topmost object under `point`.
    fn object_at(&self, point: Point) -> Option<ObjectHandle>;

    /// Select an object, or clear the selection with `None`.
    fn set_active_object(&mut self, handle: Option<ObjectHandle>);

    fn active_object(&self) -> Option<ObjectHandle>;

    /// Request one redraw.
    fn repaint(&mut self);

    /// Allow picking and dragging objects with the pointer.
    fn set_selection_enabled(&mut self, enabled: bool);

    /// Turn the surface's native freehand pen on or off.
    fn set_drawing_mode(&mut self, enabled: bool);

    /// Style for strokes drawn by the native pen.
    fn set_pen_style(&mut self, style: &ShapeStyle);

    /// Pointer slop used when picking objects.
    fn set_hit_tolerance(&mut self, tolerance: f64);

    /// Drain queued events in the order they occurred.
    fn take_events(&mut self) -> Vec<SurfaceEvent>;
}
