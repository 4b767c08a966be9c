//! Creation of new technos from a template, shared by placing and cloning.

use log::{debug, warn};
use mapforge_core::{GameObject, Point2D, Techno, TechnoHandle};
use mapforge_world::{MutationTarget, PurgedOverlaps};

use crate::{
    lifecycle::Lifecycle,
    placement::{place_at, SubCellPolicy},
    Mutation, MutationError, MutationState,
};

/// Places a fresh copy of `template` at `destination` and can take it back.
///
/// The copy receives its identity on the first perform. After an undo the
/// copy stays owned here, so redo puts the same object back.
#[derive(Debug)]
pub(crate) struct Spawn {
    template: Techno,
    destination: Point2D,
    placed: Option<TechnoHandle>,
    retained: Option<Techno>,
    overlaps: PurgedOverlaps,
    lifecycle: Lifecycle,
}

impl Spawn {
    pub(crate) fn new(template: Techno, destination: Point2D) -> Self {
        Self {
            template,
            destination,
            placed: None,
            retained: None,
            overlaps: PurgedOverlaps::default(),
            lifecycle: Lifecycle::default(),
        }
    }

    pub(crate) fn template(&self) -> &Techno {
        &self.template
    }

    pub(crate) const fn destination(&self) -> Point2D {
        self.destination
    }

    pub(crate) const fn placed(&self) -> Option<TechnoHandle> {
        self.placed
    }

    pub(crate) const fn state(&self) -> MutationState {
        self.lifecycle.state()
    }

    pub(crate) fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_perform()?;

        let map = target.map_mut();
        let object = match self.retained.take() {
            Some(object) => object,
            None => self.template.duplicate(map.allocate_object_id()?),
        };

        let handle = match place_at(map, object, self.destination, SubCellPolicy::FirstFree) {
            Ok(handle) => handle,
            Err(rejected) => {
                warn!(
                    "could not place {:?} at {}: {}",
                    self.template.kind(),
                    self.destination,
                    rejected.error
                );
                self.retained = rejected.techno;
                return Err(rejected.error);
            }
        };

        debug!(
            "placed {} {} at {}",
            self.template.attributes().type_name,
            handle.id.get(),
            self.destination
        );
        map.restore_overlaps(std::mem::take(&mut self.overlaps));
        self.placed = Some(handle);
        self.lifecycle.mark_performed();
        target.add_refresh_point(self.destination);
        Ok(())
    }

    pub(crate) fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_undo()?;

        let missing = MutationError::MissingObject {
            kind: self.template.kind(),
            position: self.destination,
        };
        let handle = self.placed.ok_or(missing)?;
        let (removed, overlaps) = target.map_mut().detach_techno(handle).ok_or(missing)?;

        debug!(
            "removed {} {} from {}",
            self.template.attributes().type_name,
            handle.id.get(),
            self.destination
        );
        self.retained = Some(removed);
        self.overlaps = overlaps;
        self.placed = None;
        self.lifecycle.mark_undone();
        target.add_refresh_point(self.destination);
        Ok(())
    }
}

/// Places a new techno built from a template.
#[derive(Debug)]
pub struct PlaceTechnoMutation {
    spawn: Spawn,
}

impl PlaceTechnoMutation {
    /// Creates a mutation placing a copy of `template` at `position`.
    ///
    /// The template's identity and sub-cell are ignored; the placed object
    /// receives a fresh identity and, for infantry, the first free sub-cell.
    #[must_use]
    pub fn new(template: Techno, position: Point2D) -> Self {
        Self {
            spawn: Spawn::new(template, position),
        }
    }

    /// Handle of the placed object while the mutation is performed.
    #[must_use]
    pub const fn placed(&self) -> Option<TechnoHandle> {
        self.spawn.placed()
    }
}

impl Mutation for PlaceTechnoMutation {
    fn display_name(&self) -> String {
        format!(
            "Place {} at {}",
            self.spawn.template().attributes().type_name,
            self.spawn.destination()
        )
    }

    fn state(&self) -> MutationState {
        self.spawn.state()
    }

    fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.spawn.perform(target)
    }

    fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.spawn.undo(target)
    }
}
