//! Interaction state machine: surface events in, store writes out.
//!
//! Local edits go through two phases. While a gesture is in progress the
//! surface object is updated locally on every pointer move and nothing is
//! written. When the gesture finalizes (pointer-up after drawing,
//! `ObjectModified`, `PathCreated`) the object is encoded once and written
//! under its `shapeId`.

use kurbo::Point;
use uuid::Uuid;

use crate::codec;
use crate::config::SessionConfig;
use crate::error::StoreResult;
use crate::events::{KeyCommand, SurfaceEvent};
use crate::identity::IdentityTable;
use crate::shapes::{Drawable, ShapeId, ShapeKind, ShapeStyle};
use crate::store::SharedStore;
use crate::surface::{CanvasSurface, ObjectHandle};
use crate::tools::{ActiveToolTracker, Tool};

/// Where the current gesture is.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// A new object is being drawn; it exists only on the surface.
    Drawing { handle: ObjectHandle, anchor: Point },
    /// An existing object is being dragged or transformed by the surface.
    Editing { handle: ObjectHandle },
}

/// Per-session interaction state.
#[derive(Debug)]
pub struct InteractionSession {
    tools: ActiveToolTracker,
    state: GestureState,
    identities: IdentityTable,
    /// Text object in inline editing, if any.
    text_target: Option<ObjectHandle>,
    /// Style applied to new shapes.
    pub current_style: ShapeStyle,
    text_placeholder: String,
    freeform_tolerance: f64,
}

impl Default for InteractionSession {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl InteractionSession {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            tools: ActiveToolTracker::new(config.default_tool, config.sticky_tools.iter().copied()),
            state: GestureState::Idle,
            identities: IdentityTable::new(),
            text_target: None,
            current_style: config.default_style.clone(),
            text_placeholder: config.text_placeholder.clone(),
            freeform_tolerance: config.freeform_tolerance,
        }
    }

    pub fn tools(&self) -> &ActiveToolTracker {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ActiveToolTracker {
        &mut self.tools
    }

    pub fn current_tool(&self) -> Tool {
        self.tools.current()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn identities(&self) -> &IdentityTable {
        &self.identities
    }

    pub fn identities_mut(&mut self) -> &mut IdentityTable {
        &mut self.identities
    }

    pub fn is_text_editing(&self) -> bool {
        self.text_target.is_some()
    }

    pub fn text_target(&self) -> Option<ObjectHandle> {
        self.text_target
    }

    /// Drop any in-progress gesture without committing it.
    ///
    /// An object still being drawn was never written, so it leaves the surface.
    pub fn reset_gesture<C: CanvasSurface>(&mut self, surface: &mut C) {
        if let GestureState::Drawing { handle, .. } = std::mem::take(&mut self.state) {
            log::debug!("Discarding unfinished drawing {handle:?}");
            self.identities.unbind(handle);
            if surface.remove(handle).is_some() {
                surface.repaint();
            }
        }
    }

    /// Forget gesture and text-edit targets that are no longer displayed.
    pub fn release_missing<C: CanvasSurface>(&mut self, surface: &C) {
        let gesture_target = match self.state {
            GestureState::Drawing { handle, .. } | GestureState::Editing { handle } => Some(handle),
            GestureState::Idle => None,
        };
        if gesture_target.is_some_and(|h| surface.object(h).is_none()) {
            log::debug!("Abandoning gesture on a removed object");
            self.state = GestureState::Idle;
        }
        if self.text_target.is_some_and(|h| surface.object(h).is_none()) {
            log::debug!("Text edit target was removed");
            self.text_target = None;
        }
    }

    /// Objects a reconciliation must leave in place.
    ///
    /// The object being drawn and the text object being edited are always
    /// pinned. The object being dragged is pinned when `include_dragged` is set.
    pub fn pinned_handles(&self, include_dragged: bool) -> Vec<ObjectHandle> {
        let mut pinned = match self.state {
            GestureState::Drawing { handle, .. } => vec![handle],
            GestureState::Editing { handle } if include_dragged => vec![handle],
            _ => Vec::new(),
        };
        if let Some(handle) = self.text_target.filter(|h| !pinned.contains(h)) {
            pinned.push(handle);
        }
        pinned
    }

    /// Push the armed tool's modes and the current style to the surface.
    pub fn sync_surface_mode<C: CanvasSurface>(&self, surface: &mut C) {
        let tool = self.tools.current();
        surface.set_selection_enabled(tool.selection_enabled());
        surface.set_drawing_mode(tool.native_drawing());
        surface.set_pen_style(&self.current_style);
    }

    /// Feed one surface event through the state machine.
    ///
    /// Returns the keyboard command to dispatch, if any.
    pub fn handle<C: CanvasSurface, S: SharedStore>(
        &mut self,
        event: &SurfaceEvent,
        surface: &mut C,
        store: &mut S,
    ) -> StoreResult<Option<KeyCommand>> {
        match *event {
            SurfaceEvent::PointerDown { position, target } => {
                self.pointer_down(position, target, surface);
                Ok(None)
            }
            SurfaceEvent::PointerMove { position } => {
                if let GestureState::Drawing { handle, anchor } = self.state {
                    if let Some(object) = surface.object_mut(handle) {
                        object.resize_from(anchor, position);
                        surface.repaint();
                    }
                }
                Ok(None)
            }
            SurfaceEvent::PointerUp { position } => {
                self.pointer_up(position, surface, store)?;
                Ok(None)
            }
            SurfaceEvent::ObjectModified { target } => {
                self.commit(target, surface, store)?;
                Ok(None)
            }
            SurfaceEvent::PathCreated { target } => {
                self.simplify_path(target, surface);
                self.commit(target, surface, store)?;
                if self.tools.finish_gesture() {
                    self.sync_surface_mode(surface);
                }
                Ok(None)
            }
            SurfaceEvent::TextEditing { target, active } => {
                self.text_target = active.then_some(target);
                Ok(None)
            }
            SurfaceEvent::Key(key) => {
                if self.is_text_editing() {
                    return Ok(None);
                }
                Ok(key.to_command())
            }
        }
    }

    fn pointer_down<C: CanvasSurface>(
        &mut self,
        position: Point,
        target: Option<ObjectHandle>,
        surface: &mut C,
    ) {
        let tool = self.tools.current();
        if let Some(kind) = tool.shape_kind() {
            let Some(object) = self.new_object(kind, position) else {
                return;
            };
            let handle = surface.add(object);
            log::debug!("Drawing {kind} as {handle:?} from {position:?}");
            self.state = GestureState::Drawing {
                handle,
                anchor: position,
            };
            surface.repaint();
        } else if let Some(handle) = target.filter(|_| tool.selection_enabled()) {
            self.state = GestureState::Editing { handle };
        }
    }

    fn new_object(&self, kind: ShapeKind, anchor: Point) -> Option<Drawable> {
        let mut object = Drawable::begin(kind, anchor, self.current_style.clone())?;
        if let Drawable::Text(text) = &mut object {
            text.set_content(self.text_placeholder.as_str());
        }
        Some(object)
    }

    fn pointer_up<C: CanvasSurface, S: SharedStore>(
        &mut self,
        position: Point,
        surface: &mut C,
        store: &mut S,
    ) -> StoreResult<()> {
        match std::mem::take(&mut self.state) {
            GestureState::Drawing { handle, anchor } => {
                if let Some(object) = surface.object_mut(handle) {
                    object.resize_from(anchor, position);
                }
                self.simplify_path(handle, surface);
                let committed = self.commit(handle, surface, store);
                if self.tools.finish_gesture() {
                    self.sync_surface_mode(surface);
                }
                match committed {
                    Ok(Some(_)) => surface.set_active_object(Some(handle)),
                    Ok(None) => {
                        log::debug!("Discarding empty gesture {handle:?}");
                        surface.remove(handle);
                    }
                    Err(e) => {
                        self.identities.unbind(handle);
                        surface.remove(handle);
                        return Err(e);
                    }
                }
                surface.repaint();
                Ok(())
            }
            GestureState::Editing { .. } | GestureState::Idle => Ok(()),
        }
    }

    fn simplify_path<C: CanvasSurface>(&self, handle: ObjectHandle, surface: &mut C) {
        if self.freeform_tolerance <= 0.0 {
            return;
        }
        if let Some(Drawable::FreeformPath(path)) = surface.object_mut(handle) {
            path.simplify(self.freeform_tolerance);
        }
    }

    /// Encode `handle` and write it under its shapeId, allocating one if new.
    ///
    /// Returns the id written, or `None` if the object was absent or empty.
    pub fn commit<C: CanvasSurface, S: SharedStore>(
        &mut self,
        handle: ObjectHandle,
        surface: &C,
        store: &mut S,
    ) -> StoreResult<Option<ShapeId>> {
        let id = self.identities.shape_of(handle).unwrap_or_else(Uuid::new_v4);
        let Some(record) = codec::encode(surface.object(handle), id) else {
            return Ok(None);
        };
        self.identities.bind(handle, id);
        store.set(id, record)?;
        log::debug!("Committed {handle:?} as {id}");
        Ok(Some(id))
    }
}
