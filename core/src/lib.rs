#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Mapforge editor.
//!
//! This crate defines the value types that connect adapters, the
//! authoritative world, and the mutation systems. Adapters describe edits in
//! terms of [`Point2D`] coordinates and game objects, the world stores those
//! objects inside its cell grid, and mutations move owned objects between the
//! grid and their own undo state. Every placeable object carries an
//! [`ObjectId`] so that identity survives being moved out of and back into the
//! grid.

use std::ops::{Add, AddAssign, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod objects;

pub use objects::{
    Aircraft, CellTag, GameObject, Infantry, Overlay, OverlayType, Smudge, Structure, Techno,
    TechnoAttributes, TechnoHandle, TechnoRef, TerrainObject, Unit, Waypoint,
};

/// Number of infantry sub-cell slots available in a single cell.
pub const SUB_CELL_COUNT: usize = 5;

/// Integer coordinate used for cell addressing and pixel-space offsets.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point2D {
    /// Horizontal component.
    pub x: i32,
    /// Vertical component.
    pub y: i32,
}

impl Point2D {
    /// Creates a new point from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Largest per-axis distance between two points.
    #[must_use]
    pub fn chebyshev_distance(self, other: Point2D) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl Add for Point2D {
    type Output = Point2D;

    fn add(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point2D {
    fn add_assign(&mut self, rhs: Point2D) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point2D {
    type Output = Point2D;

    fn sub(self, rhs: Point2D) -> Point2D {
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::fmt::Display for Point2D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identity of an object placed on the map.
///
/// Two objects are "the same object" exactly when their identifiers match.
/// Identifiers are allocated by the map and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Discriminant reported by every game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Flying techno.
    Aircraft,
    /// Structure techno.
    Building,
    /// Vehicle techno.
    Unit,
    /// Infantry techno, stored in sub-cell slots.
    Infantry,
    /// Passive terrain decoration such as trees.
    Terrain,
    /// Cell-anchored overlay such as walls or resources.
    Overlay,
    /// Cell-anchored ground decal.
    Smudge,
    /// Numbered waypoint marker.
    Waypoint,
    /// Opaque scripting marker attached to a cell.
    CellTag,
}

impl ObjectKind {
    /// Reports whether the kind is one of the placeable techno categories.
    #[must_use]
    pub const fn is_techno(self) -> bool {
        matches!(
            self,
            Self::Aircraft | Self::Building | Self::Unit | Self::Infantry
        )
    }
}

/// Non-owning reference to an object, used by advisory bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Identity of the referenced object.
    pub id: ObjectId,
    /// Category of the referenced object.
    pub kind: ObjectKind,
}

impl ObjectRef {
    /// Creates a reference from its parts.
    #[must_use]
    pub const fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self { id, kind }
    }
}

/// Infantry sub-cell slots, listed in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubCell {
    /// Lower part of the cell.
    Bottom,
    /// Left part of the cell.
    Left,
    /// Right part of the cell.
    Right,
    /// Upper part of the cell.
    Top,
    /// Centre of the cell. Reserved; never handed out as a free spot.
    Center,
}

impl SubCell {
    /// Every storage slot in index order.
    pub const ALL: [SubCell; SUB_CELL_COUNT] = [
        SubCell::Bottom,
        SubCell::Left,
        SubCell::Right,
        SubCell::Top,
        SubCell::Center,
    ];

    /// Slots handed out to new infantry, in precedence order.
    pub const FREE_SPOT_PRECEDENCE: [SubCell; 3] = [SubCell::Bottom, SubCell::Left, SubCell::Right];

    /// Storage index of the slot inside a cell's infantry table.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Bottom => 0,
            Self::Left => 1,
            Self::Right => 2,
            Self::Top => 3,
            Self::Center => 4,
        }
    }
}

/// Reasons the map refuses to place an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The object's position lies outside the map.
    #[error("position {0} lies outside the map")]
    OutOfBounds(Point2D),
    /// The category slot at the position already holds a different object.
    #[error("{kind:?} slot at {position} is already occupied")]
    Occupied {
        /// Category whose slot is taken.
        kind: ObjectKind,
        /// Cell that was targeted.
        position: Point2D,
    },
    /// Every infantry sub-cell spot of the cell is taken.
    #[error("no free infantry sub-cell at {0}")]
    NoFreeSubCell(Point2D),
    /// Infantry was handed to the map without a sub-cell assignment.
    #[error("infantry {0:?} has no sub-cell assignment")]
    MissingSubCell(ObjectId),
    /// The infantry's assigned sub-cell is already taken.
    #[error("sub-cell {sub_cell:?} at {position} is already occupied")]
    SubCellTaken {
        /// Cell that was targeted.
        position: Point2D,
        /// Slot that was requested.
        sub_cell: SubCell,
    },
    /// Another object on the map already carries this identity.
    #[error("object identity {0:?} is already in use")]
    DuplicateId(ObjectId),
    /// Every object identity has been handed out.
    #[error("object identities are exhausted")]
    IdsExhausted,
}

#[cfg(test)]
mod tests {
    use super::{ObjectKind, Point2D, SubCell, SUB_CELL_COUNT};

    #[test]
    fn point_arithmetic_matches_expectation() {
        let mut point = Point2D::new(2, 3) + Point2D::new(-1, 4);
        assert_eq!(point, Point2D::new(1, 7));
        point += Point2D::new(1, 1);
        assert_eq!(point - Point2D::new(2, 8), Point2D::new(0, 0));
    }

    #[test]
    fn chebyshev_distance_uses_largest_axis() {
        let origin = Point2D::new(1, 1);
        assert_eq!(origin.chebyshev_distance(Point2D::new(4, 3)), 3);
        assert_eq!(Point2D::new(4, 3).chebyshev_distance(origin), 3);
    }

    #[test]
    fn sub_cell_indices_cover_storage_exactly_once() {
        let mut seen = [false; SUB_CELL_COUNT];
        for slot in SubCell::ALL {
            assert!(!seen[slot.index()], "duplicate index for {slot:?}");
            seen[slot.index()] = true;
        }
        assert!(seen.iter().all(|flag| *flag));
    }

    #[test]
    fn only_the_four_techno_kinds_are_technos() {
        let technos = [
            ObjectKind::Aircraft,
            ObjectKind::Building,
            ObjectKind::Unit,
            ObjectKind::Infantry,
        ];
        let others = [
            ObjectKind::Terrain,
            ObjectKind::Overlay,
            ObjectKind::Smudge,
            ObjectKind::Waypoint,
            ObjectKind::CellTag,
        ];
        assert!(technos.iter().all(|kind| kind.is_techno()));
        assert!(others.iter().all(|kind| !kind.is_techno()));
    }

    #[test]
    fn point_round_trips_through_bincode() {
        let point = Point2D::new(-3, 12);
        let bytes = bincode::serialize(&point).expect("serialize");
        let restored: Point2D = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, point);
    }
}
