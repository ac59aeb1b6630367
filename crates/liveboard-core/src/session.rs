//! Collaborative session scope.
//!
//! A [`Session`] owns one surface, one store handle and all engine state for
//! the lifetime of a board. Store notifications are parked as they arrive and
//! folded into a single reconciliation on the next [`Session::flush`], which
//! every event handler and command calls before returning.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::Point;

use crate::assets::{DecodingImageLoader, ImageLoader, ImageSource};
use crate::codec::ShapeMap;
use crate::commands::CommandDispatcher;
use crate::config::SessionConfig;
use crate::error::{CommandError, StoreError, StoreResult};
use crate::events::{KeyCommand, SurfaceEvent};
use crate::interaction::InteractionSession;
use crate::reconcile::{ReconcileReport, Reconciler};
use crate::shapes::{ShapeId, ShapeStyle};
use crate::store::{LoroShapeStore, SharedStore, SubscriptionId};
use crate::surface::CanvasSurface;
use crate::tools::{Tool, ToolEffect};

/// Non-fatal outcome the host should surface to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The image tool was armed; the host should open a file picker.
    ImagePickerRequested,
    ImageLoadFailed { source: String, reason: String },
    StoreWriteFailed(String),
}

/// One board: a canvas surface kept in step with a shared store.
///
/// Host input goes to [`surface_mut`](Self::surface_mut) and is drained with
/// [`pump_surface`](Self::pump_surface); toolbar actions go through
/// [`set_tool`](Self::set_tool) and the command methods. Failures never
/// panic; they are queued as [`Notification`]s.
pub struct Session<C: CanvasSurface, S: SharedStore, L: ImageLoader = DecodingImageLoader> {
    surface: C,
    store: S,
    interaction: InteractionSession,
    reconciler: Reconciler,
    dispatcher: CommandDispatcher<L>,
    config: SessionConfig,
    pending: Rc<RefCell<Option<ShapeMap>>>,
    subscription: SubscriptionId,
    notifications: Vec<Notification>,
}

impl<C: CanvasSurface, S: SharedStore> Session<C, S, DecodingImageLoader> {
    pub fn new(surface: C, store: S, config: SessionConfig) -> Self {
        Self::with_loader(surface, store, DecodingImageLoader, config)
    }
}

impl<C: CanvasSurface, S: SharedStore, L: ImageLoader> Session<C, S, L> {
    /// Start a session and render whatever the store already holds.
    pub fn with_loader(surface: C, mut store: S, loader: L, config: SessionConfig) -> Self {
        let pending = Rc::new(RefCell::new(Some(store.records())));
        let sink = Rc::clone(&pending);
        let subscription = store.subscribe(Box::new(move |records: &ShapeMap| {
            *sink.borrow_mut() = Some(records.clone());
        }));

        let mut session = Self {
            surface,
            store,
            interaction: InteractionSession::new(&config),
            reconciler: Reconciler::new(),
            dispatcher: CommandDispatcher::new(loader, config.max_image_size),
            config,
            pending,
            subscription,
            notifications: Vec::new(),
        };
        session.surface.set_hit_tolerance(session.config.hit_tolerance);
        session.interaction.sync_surface_mode(&mut session.surface);
        session.flush();
        log::debug!("Session started with {} shapes", session.store.len());
        session
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    /// Host access for feeding input to the surface.
    pub fn surface_mut(&mut self) -> &mut C {
        &mut self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn interaction(&self) -> &InteractionSession {
        &self.interaction
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn current_tool(&self) -> Tool {
        self.interaction.current_tool()
    }

    /// The shapeId of the selected object, if it has one.
    pub fn selected_shape(&self) -> Option<ShapeId> {
        self.surface
            .active_object()
            .and_then(|h| self.interaction.identities().shape_of(h))
    }

    /// Drain queued notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Handle one surface event and reconcile any resulting store change.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match self
            .interaction
            .handle(&event, &mut self.surface, &mut self.store)
        {
            Ok(Some(command)) => self.run_key_command(command),
            Ok(None) => {}
            Err(e) => self.store_failed(e),
        }
        self.flush();
    }

    /// Handle every event the surface has queued. Returns how many there were.
    pub fn pump_surface(&mut self) -> usize {
        let events = self.surface.take_events();
        let count = events.len();
        for event in events {
            self.handle_event(event);
        }
        count
    }

    fn run_key_command(&mut self, command: KeyCommand) {
        log::debug!("Key command {command:?}");
        match command {
            KeyCommand::DeleteSelected => {
                self.delete_selected();
            }
            KeyCommand::Undo => {
                self.undo();
            }
            KeyCommand::Redo => {
                self.redo();
            }
        }
    }

    /// Arm a tool, running its discrete side effect if it has one.
    pub fn set_tool(&mut self, tool: Tool) -> ToolEffect {
        let effect = self.interaction.tools_mut().set(tool);
        self.interaction.reset_gesture(&mut self.surface);
        self.interaction.sync_surface_mode(&mut self.surface);
        match effect {
            ToolEffect::Armed => {}
            ToolEffect::OpenFilePicker => self.notifications.push(Notification::ImagePickerRequested),
            ToolEffect::DeleteSelected => {
                self.delete_selected();
            }
            ToolEffect::ClearAll => {
                self.clear_all();
            }
        }
        effect
    }

    /// Style for shapes drawn from now on, pen strokes included.
    pub fn set_style(&mut self, style: ShapeStyle) {
        self.interaction.current_style = style;
        self.interaction.sync_surface_mode(&mut self.surface);
    }

    /// Returns false if nothing was selected or the store write failed.
    pub fn delete_selected(&mut self) -> bool {
        let result = self.dispatcher.delete_selected(
            &mut self.surface,
            &mut self.store,
            &mut self.interaction,
        );
        let deleted = self.report(result).unwrap_or(false);
        self.flush();
        deleted
    }

    /// Returns whether the store ended empty.
    pub fn clear_all(&mut self) -> bool {
        let result = self
            .dispatcher
            .clear_all(&mut self.surface, &mut self.store, &mut self.interaction);
        let empty = self.report(result).unwrap_or(false);
        self.flush();
        empty
    }

    /// Insert an image at `position`. Failures become notifications.
    pub fn insert_image(&mut self, source: &ImageSource, position: Point) -> Option<ShapeId> {
        let result = self.dispatcher.insert_image(
            source,
            position,
            &mut self.surface,
            &mut self.store,
            &mut self.interaction,
        );
        let inserted = match result {
            Ok(id) => Some(id),
            Err(CommandError::Asset(e)) => {
                log::warn!("Failed to load image {}: {e}", source.name());
                self.notifications.push(Notification::ImageLoadFailed {
                    source: source.name(),
                    reason: e.to_string(),
                });
                None
            }
            Err(CommandError::Store(e)) => {
                self.store_failed(e);
                None
            }
        };
        self.flush();
        inserted
    }

    /// Returns whether anything was undone.
    pub fn undo(&mut self) -> bool {
        let result = self.dispatcher.undo(&mut self.store);
        let changed = self.report(result).unwrap_or(false);
        self.flush();
        changed
    }

    pub fn redo(&mut self) -> bool {
        let result = self.dispatcher.redo(&mut self.store);
        let changed = self.report(result).unwrap_or(false);
        self.flush();
        changed
    }

    /// Reconcile the surface with the latest store state, if it changed.
    pub fn flush(&mut self) -> Option<ReconcileReport> {
        let records = self.pending.borrow_mut().take()?;
        let pinned = self
            .interaction
            .pinned_handles(self.config.suppress_remote_during_gesture);
        let report = self.reconciler.reconcile(
            &records,
            &mut self.surface,
            self.interaction.identities_mut(),
            &pinned,
        );
        // Gesture or text-edit targets may have been deleted remotely.
        self.interaction.release_missing(&self.surface);
        Some(report)
    }

    fn report<T>(&mut self, result: StoreResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.store_failed(e);
                None
            }
        }
    }

    fn store_failed(&mut self, error: StoreError) {
        log::error!("Store write failed: {error}");
        self.notifications
            .push(Notification::StoreWriteFailed(error.to_string()));
    }
}

impl<C: CanvasSurface, L: ImageLoader> Session<C, LoroShapeStore, L> {
    /// Merge updates from a remote peer and re-render.
    pub fn import_remote(&mut self, bytes: &[u8]) -> StoreResult<()> {
        self.store.import(bytes)?;
        self.flush();
        Ok(())
    }

    /// Updates from this client since `since`, for sending to peers.
    pub fn export_updates(&self, since: &loro::VersionVector) -> Vec<u8> {
        self.store.export_updates(since)
    }

    pub fn export_snapshot(&self) -> Vec<u8> {
        self.store.export_snapshot()
    }
}

impl<C: CanvasSurface, S: SharedStore, L: ImageLoader> Drop for Session<C, S, L> {
    fn drop(&mut self) {
        self.store.unsubscribe(self.subscription);
    }
}
