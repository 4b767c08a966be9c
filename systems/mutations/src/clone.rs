//! Duplicating an existing techno onto another cell.

use mapforge_core::{GameObject, ObjectRef, Point2D, Techno, TechnoHandle};
use mapforge_world::{Cell, MutationTarget};

use crate::{spawn::Spawn, Mutation, MutationError, MutationState};

/// Clones a techno to a destination cell.
///
/// The source is captured when the mutation is built; later changes to the
/// source object do not affect what gets cloned. Callers validate the
/// destination with [`Cell::can_add_object`] before building the mutation;
/// if the destination has no room when performing, the perform fails and
/// nothing is placed.
#[derive(Debug)]
pub struct CloneObjectMutation {
    source: TechnoHandle,
    spawn: Spawn,
}

impl CloneObjectMutation {
    /// Creates a mutation cloning `object`, which must live in `cell`.
    ///
    /// Only technos can be cloned; terrain and decorations are rejected.
    pub fn new(
        cell: &Cell,
        object: ObjectRef,
        destination: Point2D,
    ) -> Result<Self, MutationError> {
        if !object.kind.is_techno() {
            return Err(MutationError::UnsupportedObject { kind: object.kind });
        }

        let source = cell
            .technos()
            .find(|techno| techno.id() == object.id && techno.kind() == object.kind)
            .ok_or(MutationError::MissingObject {
                kind: object.kind,
                position: cell.position(),
            })?;

        Ok(Self::from_techno(source.to_techno(), destination))
    }

    /// Creates a mutation cloning an already captured techno.
    #[must_use]
    pub fn from_techno(source: Techno, destination: Point2D) -> Self {
        Self {
            source: source.handle(),
            spawn: Spawn::new(source, destination),
        }
    }

    /// Locator of the object that was cloned.
    #[must_use]
    pub const fn source(&self) -> TechnoHandle {
        self.source
    }

    /// Handle of the clone while the mutation is performed.
    #[must_use]
    pub const fn placed_clone(&self) -> Option<TechnoHandle> {
        self.spawn.placed()
    }
}

impl Mutation for CloneObjectMutation {
    fn display_name(&self) -> String {
        format!(
            "Clone {} from {} to {}",
            self.spawn.template().attributes().type_name,
            self.spawn.template().position(),
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
