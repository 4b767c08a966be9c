//! Validated placement shared by the techno mutations.

use mapforge_core::{GameObject, PlacementError, Point2D, Techno, TechnoHandle};
use mapforge_world::Map;

use crate::MutationError;

/// How an infantry sub-cell is chosen at the destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SubCellPolicy {
    /// Take the first free spot of the destination cell.
    FirstFree,
    /// Restore the slot the infantry already carries.
    Keep,
}

/// A placement that did not happen. The object is handed back so the caller
/// can keep owning it.
#[derive(Debug)]
pub(crate) struct Rejected {
    pub(crate) error: MutationError,
    pub(crate) techno: Option<Techno>,
}

/// Moves `techno` to `destination` and writes it into the map.
///
/// The destination slot is validated before the map is touched, so a
/// rejection leaves the map unchanged and returns the object.
pub(crate) fn place_at(
    map: &mut Map,
    mut techno: Techno,
    destination: Point2D,
    policy: SubCellPolicy,
) -> Result<TechnoHandle, Rejected> {
    techno.set_position(destination);

    let verdict = match map.tile(destination) {
        None => Err(MutationError::OutOfBounds(destination)),
        Some(cell) => match &mut techno {
            Techno::Infantry(infantry) => {
                let slot = match policy {
                    SubCellPolicy::FirstFree => cell
                        .free_sub_cell_spot()
                        .ok_or(PlacementError::NoFreeSubCell(destination)),
                    SubCellPolicy::Keep => match infantry.sub_cell() {
                        None => Err(PlacementError::MissingSubCell(infantry.id())),
                        Some(slot) if cell.infantry_at(slot).is_some() => {
                            Err(PlacementError::SubCellTaken {
                                position: destination,
                                sub_cell: slot,
                            })
                        }
                        Some(slot) => Ok(slot),
                    },
                };
                slot.map(|slot| infantry.set_sub_cell(Some(slot)))
                    .map_err(MutationError::from)
            }
            other if cell.can_add_object(&*other) => Ok(()),
            other => Err(MutationError::from(PlacementError::Occupied {
                kind: other.kind(),
                position: destination,
            })),
        },
    };

    if let Err(error) = verdict {
        return Err(Rejected {
            error,
            techno: Some(techno),
        });
    }

    let handle = techno.handle();
    map.place_techno(techno).map_err(|error| Rejected {
        error: error.into(),
        techno: None,
    })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_core::{Infantry, ObjectId, ObjectKind, Structure, SubCell, TechnoAttributes};

    fn rifleman(id: u32, sub_cell: Option<SubCell>) -> Techno {
        Techno::from(Infantry::new(
            ObjectId::new(id),
            Point2D::new(0, 0),
            TechnoAttributes::new("E1", "GDI"),
            sub_cell,
        ))
    }

    #[test]
    fn first_free_policy_assigns_slot_and_position() {
        let mut map = Map::new(4, 4);
        let destination = Point2D::new(2, 1);
        let handle = place_at(&mut map, rifleman(1, None), destination, SubCellPolicy::FirstFree)
            .expect("empty cell accepts infantry");

        assert_eq!(handle.position, destination);
        let cell = map.tile(destination).expect("cell in bounds");
        assert_eq!(
            cell.infantry_at(SubCell::Bottom).map(|infantry| infantry.id()),
            Some(ObjectId::new(1))
        );
    }

    #[test]
    fn keep_policy_restores_exact_slot() {
        let mut map = Map::new(4, 4);
        let destination = Point2D::new(0, 3);
        let _ = place_at(
            &mut map,
            rifleman(1, Some(SubCell::Right)),
            destination,
            SubCellPolicy::Keep,
        )
        .expect("right slot is free");

        let cell = map.tile(destination).expect("cell in bounds");
        assert!(cell.infantry_at(SubCell::Right).is_some());
        assert!(cell.infantry_at(SubCell::Bottom).is_none());
    }

    #[test]
    fn rejection_hands_object_back_and_leaves_map_untouched() {
        let mut map = Map::new(4, 4);
        let destination = Point2D::new(1, 1);
        let first = Techno::from(Structure::new(
            ObjectId::new(1),
            destination,
            TechnoAttributes::new("GAPOWR", "GDI"),
        ));
        let _ = place_at(&mut map, first, destination, SubCellPolicy::FirstFree)
            .expect("empty cell accepts structure");
        let before = map.clone();

        let second = Techno::from(Structure::new(
            ObjectId::new(2),
            Point2D::new(0, 0),
            TechnoAttributes::new("GAPOWR", "GDI"),
        ));
        let rejected = place_at(&mut map, second, destination, SubCellPolicy::FirstFree)
            .expect_err("occupied slot must be rejected");

        assert_eq!(
            rejected.error,
            MutationError::Placement(PlacementError::Occupied {
                kind: ObjectKind::Building,
                position: destination,
            })
        );
        assert_eq!(rejected.techno.map(|techno| techno.id()), Some(ObjectId::new(2)));
        assert_eq!(map, before);
    }

    #[test]
    fn out_of_bounds_destination_is_rejected() {
        let mut map = Map::new(2, 2);
        let rejected = place_at(
            &mut map,
            rifleman(1, None),
            Point2D::new(5, 5),
            SubCellPolicy::FirstFree,
        )
        .expect_err("destination outside the map");
        assert_eq!(rejected.error, MutationError::OutOfBounds(Point2D::new(5, 5)));
        assert!(rejected.techno.is_some());
    }
}
