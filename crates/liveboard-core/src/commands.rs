//! Discrete commands: delete, clear, insert image, undo, redo.

use kurbo::Point;

use crate::assets::{ImageLoader, ImageSource};
use crate::error::{AssetError, CommandResult, StoreResult};
use crate::interaction::InteractionSession;
use crate::shapes::{Drawable, Image, ShapeId};
use crate::store::SharedStore;
use crate::surface::CanvasSurface;

/// Maps UI commands to store mutations and surface side effects.
///
/// Every command is a no-op when its end state already holds.
#[derive(Debug)]
pub struct CommandDispatcher<L: ImageLoader> {
    loader: L,
    max_image_size: f64,
}

impl<L: ImageLoader> CommandDispatcher<L> {
    pub fn new(loader: L, max_image_size: f64) -> Self {
        Self {
            loader,
            max_image_size,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Remove the selected object from the display and its record from the store.
    ///
    /// Returns false if nothing was selected.
    pub fn delete_selected<C: CanvasSurface, S: SharedStore>(
        &self,
        surface: &mut C,
        store: &mut S,
        interaction: &mut InteractionSession,
    ) -> StoreResult<bool> {
        let Some(handle) = surface.active_object() else {
            return Ok(false);
        };
        let id = interaction.identities_mut().unbind(handle);
        surface.remove(handle);
        surface.set_active_object(None);
        interaction.reset_gesture(surface);
        interaction.tools_mut().reset();
        interaction.sync_surface_mode(surface);
        surface.repaint();

        if let Some(id) = id {
            log::debug!("Deleting {id}");
            store.delete(&id)?;
        }
        Ok(true)
    }

    /// Remove every record and every displayed object.
    ///
    /// Returns whether the store ended empty.
    pub fn clear_all<C: CanvasSurface, S: SharedStore>(
        &self,
        surface: &mut C,
        store: &mut S,
        interaction: &mut InteractionSession,
    ) -> StoreResult<bool> {
        let empty = store.transact(|txn| {
            for id in txn.keys() {
                txn.delete(&id);
            }
            Ok(txn.is_empty())
        })?;
        surface.clear();
        interaction.identities_mut().clear();
        interaction.reset_gesture(surface);
        interaction.tools_mut().reset();
        interaction.sync_surface_mode(surface);
        surface.repaint();
        log::debug!("Cleared board (empty: {empty})");
        Ok(empty)
    }

    /// Load `source`, place it at `position` and write its record.
    ///
    /// Nothing is added or written if loading fails.
    pub fn insert_image<C: CanvasSurface, S: SharedStore>(
        &self,
        source: &ImageSource,
        position: Point,
        surface: &mut C,
        store: &mut S,
        interaction: &mut InteractionSession,
    ) -> CommandResult<ShapeId> {
        let loaded = self.loader.load(source)?;
        let mut image = Image::new(
            position,
            &loaded.data,
            loaded.width,
            loaded.height,
            loaded.format,
        )
        .with_source_name(loaded.name.as_str())
        .fit_within(self.max_image_size, self.max_image_size);
        image.style = interaction.current_style.clone();

        let handle = surface.add(Drawable::Image(image));
        let committed = match interaction.commit(handle, surface, store) {
            Ok(Some(id)) => id,
            Ok(None) => {
                surface.remove(handle);
                return Err(AssetError::Empty(loaded.name).into());
            }
            Err(e) => {
                interaction.identities_mut().unbind(handle);
                surface.remove(handle);
                return Err(e.into());
            }
        };

        interaction.tools_mut().reset();
        interaction.sync_surface_mode(surface);
        surface.set_active_object(Some(handle));
        surface.repaint();
        log::debug!("Inserted image {} as {committed}", loaded.name);
        Ok(committed)
    }

    /// Revert this client's last change.
    pub fn undo<S: SharedStore>(&self, store: &mut S) -> StoreResult<bool> {
        store.undo()
    }

    pub fn redo<S: SharedStore>(&self, store: &mut S) -> StoreResult<bool> {
        store.redo()
    }
}
