//! In-memory display list implementing [`CanvasSurface`].

use std::collections::HashMap;

use kurbo::{Affine, Point};

use super::{CanvasSurface, ObjectHandle};
use crate::events::{KeyEvent, SurfaceEvent};
use crate::shapes::{Drawable, Freehand, ShapeStyle};

/// A native drag of one object.
#[derive(Debug, Clone, Copy)]
struct NativeDrag {
    handle: ObjectHandle,
    last: Point,
    moved: bool,
}

/// Headless canvas surface.
///
/// Host input arrives through [`press`](Self::press), [`drag`](Self::drag),
/// [`release`](Self::release) and friends. The surface performs its own native
/// behaviors (dragging the picked object, pen strokes in drawing mode) and
/// queues the resulting [`SurfaceEvent`]s for the engine.
#[derive(Debug)]
pub struct SceneSurface {
    objects: HashMap<ObjectHandle, Drawable>,
    /// Paint order (back to front).
    z_order: Vec<ObjectHandle>,
    next_handle: u64,
    active: Option<ObjectHandle>,
    selection_enabled: bool,
    drawing_mode: bool,
    hit_tolerance: f64,
    pen_style: ShapeStyle,
    drag: Option<NativeDrag>,
    stroke: Option<Vec<Point>>,
    editing_text: Option<ObjectHandle>,
    events: Vec<SurfaceEvent>,
    repaints: usize,
}

impl Default for SceneSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneSurface {
    pub fn new() -> Self {
        Self {
            objects: HashMap::new(),
            z_order: Vec::new(),
            next_handle: 1,
            active: None,
            selection_enabled: true,
            drawing_mode: false,
            hit_tolerance: 4.0,
            pen_style: ShapeStyle::default(),
            drag: None,
            stroke: None,
            editing_text: None,
            events: Vec::new(),
            repaints: 0,
        }
    }

    pub fn pen_style(&self) -> &ShapeStyle {
        &self.pen_style
    }

    pub fn hit_tolerance(&self) -> f64 {
        self.hit_tolerance
    }

    /// Number of repaints requested so far.
    pub fn repaint_count(&self) -> usize {
        self.repaints
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    pub fn drawing_mode(&self) -> bool {
        self.drawing_mode
    }

    /// Objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &Drawable)> {
        self.z_order
            .iter()
            .filter_map(|h| self.objects.get(h).map(|d| (*h, d)))
    }

    /// Pointer pressed at `position`.
    pub fn press(&mut self, position: Point) {
        if self.drawing_mode {
            self.stroke = Some(vec![position]);
            self.events.push(SurfaceEvent::PointerDown {
                position,
                target: None,
            });
            return;
        }

        let target = if self.selection_enabled {
            self.object_at(position)
        } else {
            None
        };
        if self.selection_enabled {
            self.active = target;
        }
        self.drag = target.map(|handle| NativeDrag {
            handle,
            last: position,
            moved: false,
        });
        self.events
            .push(SurfaceEvent::PointerDown { position, target });
    }

    /// Pointer moved to `position` (button held or not).
    pub fn drag(&mut self, position: Point) {
        if let Some(stroke) = &mut self.stroke {
            stroke.push(position);
        } else if let Some(drag) = &mut self.drag {
            let delta = position - drag.last;
            if let Some(object) = self.objects.get_mut(&drag.handle) {
                object.transform(Affine::translate(delta));
                drag.moved = true;
            }
            drag.last = position;
        }
        self.events.push(SurfaceEvent::PointerMove { position });
    }

    /// Pointer released at `position`.
    pub fn release(&mut self, position: Point) {
        if let Some(mut points) = self.stroke.take() {
            if points.last() != Some(&position) {
                points.push(position);
            }
            if points.len() >= 2 {
                let mut path = Freehand::from_points(points);
                path.style = self.pen_style.clone();
                let target = self.add(Drawable::FreeformPath(path));
                self.events.push(SurfaceEvent::PathCreated { target });
            }
        } else if let Some(drag) = self.drag.take() {
            if drag.moved && self.objects.contains_key(&drag.handle) {
                self.events.push(SurfaceEvent::ObjectModified {
                    target: drag.handle,
                });
            }
        }
        self.events.push(SurfaceEvent::PointerUp { position });
    }

    /// A key was pressed.
    pub fn key(&mut self, event: KeyEvent) {
        self.events.push(SurfaceEvent::Key(event));
    }

    /// Apply a finalized edit (resize, rotate, recolor) to an object.
    ///
    /// Returns false if the handle is unknown.
    pub fn modify(&mut self, handle: ObjectHandle, edit: impl FnOnce(&mut Drawable)) -> bool {
        let Some(object) = self.objects.get_mut(&handle) else {
            return false;
        };
        edit(object);
        self.events
            .push(SurfaceEvent::ObjectModified { target: handle });
        true
    }

    /// Enter inline text editing on a text object.
    pub fn begin_text_edit(&mut self, handle: ObjectHandle) -> bool {
        if !matches!(self.objects.get(&handle), Some(Drawable::Text(_))) {
            return false;
        }
        self.editing_text = Some(handle);
        self.events.push(SurfaceEvent::TextEditing {
            target: handle,
            active: true,
        });
        true
    }

    /// Leave inline text editing, committing `content`.
    pub fn end_text_edit(&mut self, content: &str) -> bool {
        let Some(handle) = self.editing_text.take() else {
            return false;
        };
        self.events.push(SurfaceEvent::TextEditing {
            target: handle,
            active: false,
        });
        if let Some(Drawable::Text(text)) = self.objects.get_mut(&handle) {
            text.set_content(content);
            self.events
                .push(SurfaceEvent::ObjectModified { target: handle });
        }
        true
    }
}

impl CanvasSurface for SceneSurface {
    fn add(&mut self, object: Drawable) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.insert(handle, object);
        self.z_order.push(handle);
        handle
    }

    fn remove(&mut self, handle: ObjectHandle) -> Option<Drawable> {
        let removed = self.objects.remove(&handle)?;
        self.z_order.retain(|h| *h != handle);
        if self.active == Some(handle) {
            self.active = None;
        }
        if self.drag.is_some_and(|d| d.handle == handle) {
            self.drag = None;
        }
        if self.editing_text == Some(handle) {
            self.editing_text = None;
        }
        Some(removed)
    }

    fn clear(&mut self) {
        self.objects.clear();
        self.z_order.clear();
        self.active = None;
        self.drag = None;
        self.editing_text = None;
    }

    fn object(&self, handle: ObjectHandle) -> Option<&Drawable> {
        self.objects.get(&handle)
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut Drawable> {
        self.objects.get_mut(&handle)
    }

    fn handles(&self) -> Vec<ObjectHandle> {
        self.z_order.clone()
    }

    fn len(&self) -> usize {
        self.z_order.len()
    }

    fn object_at(&self, point: Point) -> Option<ObjectHandle> {
        self.z_order.iter().rev().copied().find(|h| {
            self.objects
                .get(h)
                .is_some_and(|d| d.hit_test(point, self.hit_tolerance))
        })
    }

    fn set_active_object(&mut self, handle: Option<ObjectHandle>) {
        self.active = handle.filter(|h| self.objects.contains_key(h));
    }

    fn active_object(&self) -> Option<ObjectHandle> {
        self.active
    }

    fn repaint(&mut self) {
        self.repaints += 1;
    }

    fn set_selection_enabled(&mut self, enabled: bool) {
        self.selection_enabled = enabled;
        if !enabled {
            self.active = None;
        }
    }

    fn set_drawing_mode(&mut self, enabled: bool) {
        self.drawing_mode = enabled;
        if !enabled {
            self.stroke = None;
        }
    }

    fn set_pen_style(&mut self, style: &ShapeStyle) {
        self.pen_style = style.clone();
    }

    fn set_hit_tolerance(&mut self, tolerance: f64) {
        self.hit_tolerance = tolerance.max(0.0);
    }

    fn take_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Rectangle;

    fn rect(x: f64, y: f64) -> Drawable {
        Drawable::Rectangle(Rectangle::new(Point::new(x, y), 50.0, 50.0))
    }

    #[test]
    fn test_object_at_prefers_topmost() {
        let mut surface = SceneSurface::new();
        let below = surface.add(rect(0.0, 0.0));
        let above = surface.add(rect(25.0, 25.0));
        assert_eq!(surface.object_at(Point::new(30.0, 30.0)), Some(above));
        assert_eq!(surface.object_at(Point::new(5.0, 5.0)), Some(below));
        assert_eq!(surface.object_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_native_drag_emits_modified_before_up() {
        let mut surface = SceneSurface::new();
        let handle = surface.add(rect(0.0, 0.0));
        surface.press(Point::new(10.0, 10.0));
        surface.drag(Point::new(20.0, 15.0));
        surface.release(Point::new(20.0, 15.0));

        let bounds = surface.object(handle).unwrap().bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 5.0).abs() < f64::EPSILON);
        assert_eq!(surface.active_object(), Some(handle));
        assert_eq!(
            surface.take_events(),
            vec![
                SurfaceEvent::PointerDown {
                    position: Point::new(10.0, 10.0),
                    target: Some(handle)
                },
                SurfaceEvent::PointerMove {
                    position: Point::new(20.0, 15.0)
                },
                SurfaceEvent::ObjectModified { target: handle },
                SurfaceEvent::PointerUp {
                    position: Point::new(20.0, 15.0)
                },
            ]
        );
        assert!(surface.take_events().is_empty());
    }

    #[test]
    fn test_click_without_move_is_not_a_modification() {
        let mut surface = SceneSurface::new();
        surface.add(rect(0.0, 0.0));
        surface.press(Point::new(10.0, 10.0));
        surface.release(Point::new(10.0, 10.0));
        assert!(
            !surface
                .take_events()
                .iter()
                .any(|e| matches!(e, SurfaceEvent::ObjectModified { .. }))
        );
    }

    #[test]
    fn test_selection_disabled_never_targets() {
        let mut surface = SceneSurface::new();
        surface.add(rect(0.0, 0.0));
        surface.set_selection_enabled(false);
        surface.press(Point::new(10.0, 10.0));
        assert_eq!(
            surface.take_events()[0],
            SurfaceEvent::PointerDown {
                position: Point::new(10.0, 10.0),
                target: None
            }
        );
        assert_eq!(surface.active_object(), None);
    }

    #[test]
    fn test_pen_stroke_creates_path() {
        let mut surface = SceneSurface::new();
        surface.set_drawing_mode(true);
        surface.press(Point::new(0.0, 0.0));
        surface.drag(Point::new(5.0, 5.0));
        surface.release(Point::new(10.0, 0.0));

        assert_eq!(surface.len(), 1);
        let events = surface.take_events();
        let created = events
            .iter()
            .find_map(|e| match e {
                SurfaceEvent::PathCreated { target } => Some(*target),
                _ => None,
            })
            .unwrap();
        match surface.object(created) {
            Some(Drawable::FreeformPath(path)) => assert_eq!(path.len(), 3),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_remove_clears_active() {
        let mut surface = SceneSurface::new();
        let handle = surface.add(rect(0.0, 0.0));
        surface.set_active_object(Some(handle));
        assert!(surface.remove(handle).is_some());
        assert_eq!(surface.active_object(), None);
        assert!(surface.remove(handle).is_none());

        // Selecting an unknown handle is ignored.
        surface.set_active_object(Some(handle));
        assert_eq!(surface.active_object(), None);
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut surface = SceneSurface::new();
        let first = surface.add(rect(0.0, 0.0));
        surface.clear();
        let second = surface.add(rect(0.0, 0.0));
        assert_ne!(first, second);
    }

    #[test]
    fn test_text_edit_commits_content() {
        let mut surface = SceneSurface::new();
        let handle = surface.add(Drawable::Text(crate::shapes::Text::new(
            Point::ZERO,
            "old".to_string(),
        )));
        assert!(surface.begin_text_edit(handle));
        assert!(surface.end_text_edit("new"));
        match surface.object(handle) {
            Some(Drawable::Text(t)) => assert_eq!(t.content, "new"),
            other => panic!("unexpected {other:?}"),
        }
        let events = surface.take_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], SurfaceEvent::ObjectModified { target: handle });
    }
}
