//! Rebuilds the surface from the authoritative record set.

use std::collections::HashSet;

use crate::codec::{self, ShapeMap};
use crate::identity::IdentityTable;
use crate::surface::{CanvasSurface, ObjectHandle};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Objects rebuilt from records.
    pub rendered: usize,
    /// Records skipped because they could not be deserialized.
    pub skipped: usize,
    /// Pinned objects left untouched.
    pub pinned: usize,
    /// Pinned objects dropped because their record was deleted.
    pub dropped_pinned: usize,
    /// Whether a selection existed and was carried over.
    pub selection_restored: bool,
}

/// Remote render reconciler.
///
/// Every pass clears the display and re-adds one object per record, then
/// re-selects the previously selected shape by `shapeId`. Objects named as
/// pinned (those in an active local gesture) are kept with their local
/// geometry instead, unless their record has been deleted.
#[derive(Debug, Default)]
pub struct Reconciler {
    passes: u64,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of passes run so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn reconcile<C: CanvasSurface>(
        &mut self,
        records: &ShapeMap,
        surface: &mut C,
        identities: &mut IdentityTable,
        pinned: &[ObjectHandle],
    ) -> ReconcileReport {
        self.passes += 1;
        let mut report = ReconcileReport::default();

        let previous_active = surface.active_object();
        let selected_id = previous_active.and_then(|h| identities.shape_of(h));

        // Pinned objects survive unless the shape was deleted upstream.
        let mut kept: HashSet<ObjectHandle> = HashSet::new();
        for &handle in pinned {
            if surface.object(handle).is_none() {
                continue;
            }
            match identities.shape_of(handle) {
                Some(id) if !records.contains_key(&id) => {
                    log::debug!("Pinned {handle:?} ({id}) was deleted remotely");
                    surface.remove(handle);
                    identities.unbind(handle);
                    report.dropped_pinned += 1;
                }
                _ => {
                    kept.insert(handle);
                }
            }
        }
        report.pinned = kept.len();

        if kept.is_empty() {
            surface.clear();
            identities.clear();
        } else {
            for handle in surface.handles() {
                if !kept.contains(&handle) {
                    surface.remove(handle);
                }
            }
            identities.retain(|handle, _| kept.contains(&handle));
        }

        for (id, record) in records {
            if identities.handle_of(id).is_some() {
                // Pinned local copy wins until its gesture ends.
                continue;
            }
            match codec::deserialize(record) {
                Some(object) => {
                    let handle = surface.add(object);
                    identities.bind(handle, *id);
                    report.rendered += 1;
                }
                None => report.skipped += 1,
            }
        }

        let restored = match selected_id {
            Some(id) => identities.handle_of(&id),
            // An unbound active object can only be a pinned in-progress drawing.
            None => previous_active.filter(|h| kept.contains(h)),
        };
        surface.set_active_object(restored);
        report.selection_restored = previous_active.is_some() && restored.is_some();

        surface.repaint();
        log::debug!("Reconciled {} records: {report:?}", records.len());
        report
    }
}
