//! Deleting a techno from the map.

use log::debug;
use mapforge_core::{ObjectRef, Techno, TechnoHandle};
use mapforge_world::{Cell, MutationTarget, PurgedOverlaps};

use crate::{
    lifecycle::Lifecycle,
    placement::{place_at, SubCellPolicy},
    Mutation, MutationError, MutationState,
};

/// Removes a techno and keeps it so undo can put the same object back.
#[derive(Debug)]
pub struct DeleteObjectMutation {
    handle: TechnoHandle,
    removed: Option<Techno>,
    overlaps: PurgedOverlaps,
    type_name: Option<String>,
    lifecycle: Lifecycle,
}

impl DeleteObjectMutation {
    /// Creates a mutation deleting `object`, which must live in `cell`.
    pub fn new(cell: &Cell, object: ObjectRef) -> Result<Self, MutationError> {
        if !object.kind.is_techno() {
            return Err(MutationError::UnsupportedObject { kind: object.kind });
        }
        if !cell.contains_object(object) {
            return Err(MutationError::MissingObject {
                kind: object.kind,
                position: cell.position(),
            });
        }
        Ok(Self::from_handle(TechnoHandle::new(
            object.kind,
            object.id,
            cell.position(),
        )))
    }

    /// Creates a mutation deleting the techno located by `handle`.
    #[must_use]
    pub fn from_handle(handle: TechnoHandle) -> Self {
        Self {
            handle,
            removed: None,
            overlaps: PurgedOverlaps::default(),
            type_name: None,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Mutation for DeleteObjectMutation {
    fn display_name(&self) -> String {
        match &self.type_name {
            Some(type_name) => format!("Delete {} at {}", type_name, self.handle.position),
            None => format!("Delete {:?} at {}", self.handle.kind, self.handle.position),
        }
    }

    fn state(&self) -> MutationState {
        self.lifecycle.state()
    }

    fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_perform()?;

        let (removed, overlaps) = target
            .map_mut()
            .detach_techno(self.handle)
            .ok_or(MutationError::MissingObject {
                kind: self.handle.kind,
                position: self.handle.position,
            })?;

        debug!(
            "deleted {:?} {} at {}",
            self.handle.kind,
            self.handle.id.get(),
            self.handle.position
        );
        self.type_name = Some(removed.attributes().type_name.clone());
        self.removed = Some(removed);
        self.overlaps = overlaps;
        self.lifecycle.mark_performed();
        target.add_refresh_point(self.handle.position);
        Ok(())
    }

    fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_undo()?;

        let techno = self.removed.take().ok_or(MutationError::MissingObject {
            kind: self.handle.kind,
            position: self.handle.position,
        })?;

        let map = target.map_mut();
        if let Err(rejected) = place_at(map, techno, self.handle.position, SubCellPolicy::Keep) {
            self.removed = rejected.techno;
            return Err(rejected.error);
        }
        map.restore_overlaps(std::mem::take(&mut self.overlaps));

        debug!(
            "restored {:?} {} at {}",
            self.handle.kind,
            self.handle.id.get(),
            self.handle.position
        );
        self.lifecycle.mark_undone();
        target.add_refresh_point(self.handle.position);
        Ok(())
    }
}
