//! Moving a techno to another cell.

use log::{debug, warn};
use mapforge_core::{Point2D, SubCell, Techno, TechnoHandle};
use mapforge_world::{Map, MutationTarget, PurgedOverlaps};

use crate::{
    lifecycle::Lifecycle,
    placement::{place_at, SubCellPolicy},
    Mutation, MutationError, MutationState,
};

/// Moves a techno from its current cell to a destination cell.
///
/// Infantry takes the first free sub-cell at the destination. Undo returns
/// the object to its original cell and, for infantry, its original slot.
#[derive(Debug)]
pub struct MoveTechnoMutation {
    origin: TechnoHandle,
    origin_sub_cell: Option<SubCell>,
    destination: Point2D,
    current: TechnoHandle,
    overlaps: PurgedOverlaps,
    lifecycle: Lifecycle,
}

impl MoveTechnoMutation {
    /// Creates a mutation moving the techno located by `handle`.
    #[must_use]
    pub fn new(handle: TechnoHandle, destination: Point2D) -> Self {
        Self {
            origin: handle,
            origin_sub_cell: None,
            destination,
            current: handle,
            overlaps: PurgedOverlaps::default(),
            lifecycle: Lifecycle::default(),
        }
    }

    /// Where the techno was before the mutation was first performed.
    #[must_use]
    pub const fn origin(&self) -> TechnoHandle {
        self.origin
    }

    /// Where the techno currently is according to this mutation.
    #[must_use]
    pub const fn current(&self) -> TechnoHandle {
        self.current
    }

    /// Moves the techno and swaps the overlap entries it leaves behind with
    /// the ones it left at `destination` on the previous relocation.
    fn relocate(
        &mut self,
        target: &mut dyn MutationTarget,
        destination: Point2D,
        sub_cell: Option<SubCell>,
    ) -> Result<(), MutationError> {
        let from = self.current;
        let map = target.map_mut();
        let (mut techno, purged) = map
            .detach_techno(from)
            .ok_or(MutationError::MissingObject {
                kind: from.kind,
                position: from.position,
            })?;
        let previous_sub_cell = techno.sub_cell();

        let policy = match (&mut techno, sub_cell) {
            (Techno::Infantry(infantry), Some(slot)) => {
                infantry.set_sub_cell(Some(slot));
                SubCellPolicy::Keep
            }
            _ => SubCellPolicy::FirstFree,
        };

        match place_at(map, techno, destination, policy) {
            Ok(handle) => {
                if self.lifecycle.state() != MutationState::Performed {
                    self.origin_sub_cell = previous_sub_cell;
                }
                self.current = handle;
                map.restore_overlaps(std::mem::replace(&mut self.overlaps, purged));
            }
            Err(rejected) => {
                warn!(
                    "could not move {:?} {} to {}: {}",
                    from.kind,
                    from.id.get(),
                    destination,
                    rejected.error
                );
                put_back(map, rejected.techno, from, previous_sub_cell)?;
                map.restore_overlaps(purged);
                return Err(rejected.error);
            }
        }

        target.add_refresh_point(from.position);
        target.add_refresh_point(destination);
        Ok(())
    }
}

/// Returns a techno whose move was rejected to the slot it came from.
fn put_back(
    map: &mut Map,
    techno: Option<Techno>,
    from: TechnoHandle,
    sub_cell: Option<SubCell>,
) -> Result<(), MutationError> {
    let Some(mut techno) = techno else {
        warn!("{:?} {} was dropped by the map", from.kind, from.id.get());
        return Err(MutationError::MissingObject {
            kind: from.kind,
            position: from.position,
        });
    };
    if let Techno::Infantry(infantry) = &mut techno {
        infantry.set_sub_cell(sub_cell);
    }
    place_at(map, techno, from.position, SubCellPolicy::Keep)
        .map(|_| ())
        .map_err(|rejected| {
            warn!(
                "lost {:?} {} while putting it back at {}: {}",
                from.kind,
                from.id.get(),
                from.position,
                rejected.error
            );
            rejected.error
        })
}

impl Mutation for MoveTechnoMutation {
    fn display_name(&self) -> String {
        format!(
            "Move {:?} from {} to {}",
            self.origin.kind, self.origin.position, self.destination
        )
    }

    fn state(&self) -> MutationState {
        self.lifecycle.state()
    }

    fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_perform()?;
        self.relocate(target, self.destination, None)?;
        debug!(
            "moved {:?} {} to {}",
            self.current.kind,
            self.current.id.get(),
            self.destination
        );
        self.lifecycle.mark_performed();
        Ok(())
    }

    fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_undo()?;
        self.relocate(target, self.origin.position, self.origin_sub_cell)?;
        debug!(
            "moved {:?} {} back to {}",
            self.current.kind,
            self.current.id.get(),
            self.origin.position
        );
        self.lifecycle.mark_undone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_core::{
        GameObject, Infantry, ObjectId, ObjectKind, PlacementError, TechnoAttributes, Unit,
    };
    use mapforge_world::EditorSession;

    #[test]
    fn origin_is_remembered_across_cycles() {
        let mut session = EditorSession::new(6, 6);
        let start = Point2D::new(1, 1);
        session
            .map_mut()
            .place_infantry(Infantry::new(
                ObjectId::new(1),
                start,
                TechnoAttributes::new("E2", "GDI"),
                Some(SubCell::Left),
            ))
            .expect("infantry");

        let handle = session
            .map()
            .find_techno(ObjectId::new(1))
            .map(|techno| techno.handle())
            .expect("placed");
        let mut mutation = MoveTechnoMutation::new(handle, Point2D::new(4, 4));

        for _ in 0..2 {
            mutation.perform(&mut session).expect("perform");
            assert_eq!(mutation.current().position, Point2D::new(4, 4));
            mutation.undo(&mut session).expect("undo");
            assert_eq!(mutation.current(), mutation.origin());
            let cell = session.map().tile(start).expect("cell in bounds");
            assert_eq!(
                cell.infantry_at(SubCell::Left).map(|infantry| infantry.id()),
                Some(ObjectId::new(1)),
                "undo must restore the original slot"
            );
        }
    }

    #[test]
    fn put_back_reports_an_occupied_origin() {
        let mut map = Map::new(4, 4);
        let origin = Point2D::new(1, 1);
        map.place_unit(Unit::new(ObjectId::new(2), origin, TechnoAttributes::new("BGGY", "Nod")))
            .expect("squatter");
        let handle = TechnoHandle::new(ObjectKind::Unit, ObjectId::new(1), origin);
        let attributes = TechnoAttributes::new("MCV", "Nod");
        let mover = Unit::new(ObjectId::new(1), Point2D::new(3, 3), attributes);

        assert_eq!(
            put_back(&mut map, Some(mover.into()), handle, None),
            Err(MutationError::Placement(PlacementError::Occupied {
                kind: ObjectKind::Unit,
                position: origin,
            }))
        );
        assert!(matches!(
            put_back(&mut map, None, handle, None),
            Err(MutationError::MissingObject { .. })
        ));
    }
}
