//! Game objects that can be placed on map cells.

use serde::{Deserialize, Serialize};

use crate::{ObjectId, ObjectKind, Point2D, SubCell};

/// Shared interface implemented by every placeable object category.
pub trait GameObject {
    /// Identity of the object.
    fn id(&self) -> ObjectId;

    /// Category discriminant of the object.
    fn kind(&self) -> ObjectKind;

    /// Cell the object is anchored to.
    fn position(&self) -> Point2D;

    /// Re-anchors the object to a different cell.
    fn set_position(&mut self, position: Point2D);
}

macro_rules! impl_game_object {
    ($ty:ty, $kind:expr) => {
        impl GameObject for $ty {
            fn id(&self) -> ObjectId {
                self.id
            }

            fn kind(&self) -> ObjectKind {
                $kind
            }

            fn position(&self) -> Point2D {
                self.position
            }

            fn set_position(&mut self, position: Point2D) {
                self.position = position;
            }
        }
    };
}

/// Attributes shared by all techno categories.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnoAttributes {
    /// Rules identifier of the object type, e.g. `E1` or `GAPOWR`.
    pub type_name: String,
    /// House that owns the object.
    pub owner: String,
    /// Health on the game's 0..=256 scale.
    pub strength: u16,
    /// Facing on the game's 0..=255 scale.
    pub facing: u8,
}

impl TechnoAttributes {
    /// Full strength value assigned to freshly placed objects.
    pub const FULL_STRENGTH: u16 = 256;

    /// Creates attributes for a full-strength, north-facing object.
    #[must_use]
    pub fn new(type_name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            owner: owner.into(),
            strength: Self::FULL_STRENGTH,
            facing: 0,
        }
    }
}

/// Flying techno.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Aircraft {
    id: ObjectId,
    position: Point2D,
    attributes: TechnoAttributes,
}

impl Aircraft {
    /// Creates an aircraft anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, attributes: TechnoAttributes) -> Self {
        Self {
            id,
            position,
            attributes,
        }
    }

    /// Type and ownership attributes.
    #[must_use]
    pub fn attributes(&self) -> &TechnoAttributes {
        &self.attributes
    }
}

/// Structure techno; reports [`ObjectKind::Building`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Structure {
    id: ObjectId,
    position: Point2D,
    attributes: TechnoAttributes,
}

impl Structure {
    /// Creates a structure anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, attributes: TechnoAttributes) -> Self {
        Self {
            id,
            position,
            attributes,
        }
    }

    /// Type and ownership attributes.
    #[must_use]
    pub fn attributes(&self) -> &TechnoAttributes {
        &self.attributes
    }
}

/// Vehicle techno.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    id: ObjectId,
    position: Point2D,
    attributes: TechnoAttributes,
}

impl Unit {
    /// Creates a vehicle anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, attributes: TechnoAttributes) -> Self {
        Self {
            id,
            position,
            attributes,
        }
    }

    /// Type and ownership attributes.
    #[must_use]
    pub fn attributes(&self) -> &TechnoAttributes {
        &self.attributes
    }
}

/// Infantry techno. Several infantry share a cell through sub-cell slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Infantry {
    id: ObjectId,
    position: Point2D,
    attributes: TechnoAttributes,
    sub_cell: Option<SubCell>,
}

impl Infantry {
    /// Creates an infantry object with an optional sub-cell assignment.
    #[must_use]
    pub fn new(
        id: ObjectId,
        position: Point2D,
        attributes: TechnoAttributes,
        sub_cell: Option<SubCell>,
    ) -> Self {
        Self {
            id,
            position,
            attributes,
            sub_cell,
        }
    }

    /// Type and ownership attributes.
    #[must_use]
    pub fn attributes(&self) -> &TechnoAttributes {
        &self.attributes
    }

    /// Slot the infantry occupies within its cell, if assigned.
    #[must_use]
    pub const fn sub_cell(&self) -> Option<SubCell> {
        self.sub_cell
    }

    /// Assigns (or clears) the infantry's sub-cell slot.
    pub fn set_sub_cell(&mut self, sub_cell: Option<SubCell>) {
        self.sub_cell = sub_cell;
    }
}

impl_game_object!(Aircraft, ObjectKind::Aircraft);
impl_game_object!(Structure, ObjectKind::Building);
impl_game_object!(Unit, ObjectKind::Unit);
impl_game_object!(Infantry, ObjectKind::Infantry);

/// Closed set of techno categories.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Techno {
    /// Flying techno.
    Aircraft(Aircraft),
    /// Structure techno.
    Building(Structure),
    /// Vehicle techno.
    Unit(Unit),
    /// Infantry techno.
    Infantry(Infantry),
}

impl Techno {
    /// Type and ownership attributes of the wrapped object.
    #[must_use]
    pub fn attributes(&self) -> &TechnoAttributes {
        self.as_techno_ref().attributes()
    }

    /// Produces a detached copy carrying the provided identity.
    ///
    /// The copy keeps category, position and attributes. Infantry copies lose
    /// their sub-cell assignment so they can be slotted into a new cell.
    #[must_use]
    pub fn duplicate(&self, id: ObjectId) -> Techno {
        match self {
            Self::Aircraft(aircraft) => {
                Self::Aircraft(Aircraft::new(id, aircraft.position, aircraft.attributes.clone()))
            }
            Self::Building(structure) => Self::Building(Structure::new(
                id,
                structure.position,
                structure.attributes.clone(),
            )),
            Self::Unit(unit) => Self::Unit(Unit::new(id, unit.position, unit.attributes.clone())),
            Self::Infantry(infantry) => Self::Infantry(Infantry::new(
                id,
                infantry.position,
                infantry.attributes.clone(),
                None,
            )),
        }
    }

    /// Everything the map needs to locate this object again.
    #[must_use]
    pub fn handle(&self) -> TechnoHandle {
        TechnoHandle::new(self.kind(), self.id(), self.position())
    }

    /// Borrowed view of the wrapped object.
    #[must_use]
    pub fn as_techno_ref(&self) -> TechnoRef<'_> {
        match self {
            Self::Aircraft(aircraft) => TechnoRef::Aircraft(aircraft),
            Self::Building(structure) => TechnoRef::Building(structure),
            Self::Unit(unit) => TechnoRef::Unit(unit),
            Self::Infantry(infantry) => TechnoRef::Infantry(infantry),
        }
    }

    /// Sub-cell slot of wrapped infantry; `None` for other categories.
    #[must_use]
    pub fn sub_cell(&self) -> Option<SubCell> {
        match self {
            Self::Infantry(infantry) => infantry.sub_cell(),
            _ => None,
        }
    }
}

impl GameObject for Techno {
    fn id(&self) -> ObjectId {
        self.as_techno_ref().id()
    }

    fn kind(&self) -> ObjectKind {
        self.as_techno_ref().kind()
    }

    fn position(&self) -> Point2D {
        self.as_techno_ref().position()
    }

    fn set_position(&mut self, position: Point2D) {
        match self {
            Self::Aircraft(aircraft) => aircraft.set_position(position),
            Self::Building(structure) => structure.set_position(position),
            Self::Unit(unit) => unit.set_position(position),
            Self::Infantry(infantry) => infantry.set_position(position),
        }
    }
}

impl From<Aircraft> for Techno {
    fn from(value: Aircraft) -> Self {
        Self::Aircraft(value)
    }
}

impl From<Structure> for Techno {
    fn from(value: Structure) -> Self {
        Self::Building(value)
    }
}

impl From<Unit> for Techno {
    fn from(value: Unit) -> Self {
        Self::Unit(value)
    }
}

impl From<Infantry> for Techno {
    fn from(value: Infantry) -> Self {
        Self::Infantry(value)
    }
}

/// Borrowed view of a techno stored inside a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TechnoRef<'a> {
    /// Flying techno.
    Aircraft(&'a Aircraft),
    /// Structure techno.
    Building(&'a Structure),
    /// Vehicle techno.
    Unit(&'a Unit),
    /// Infantry techno.
    Infantry(&'a Infantry),
}

impl<'a> TechnoRef<'a> {
    /// Identity of the referenced object.
    #[must_use]
    pub fn id(&self) -> ObjectId {
        match self {
            Self::Aircraft(aircraft) => aircraft.id(),
            Self::Building(structure) => structure.id(),
            Self::Unit(unit) => unit.id(),
            Self::Infantry(infantry) => infantry.id(),
        }
    }

    /// Category of the referenced object.
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Aircraft(_) => ObjectKind::Aircraft,
            Self::Building(_) => ObjectKind::Building,
            Self::Unit(_) => ObjectKind::Unit,
            Self::Infantry(_) => ObjectKind::Infantry,
        }
    }

    /// Cell the referenced object is anchored to.
    #[must_use]
    pub fn position(&self) -> Point2D {
        match self {
            Self::Aircraft(aircraft) => aircraft.position(),
            Self::Building(structure) => structure.position(),
            Self::Unit(unit) => unit.position(),
            Self::Infantry(infantry) => infantry.position(),
        }
    }

    /// Type and ownership attributes.
    #[must_use]
    pub fn attributes(&self) -> &'a TechnoAttributes {
        match self {
            Self::Aircraft(aircraft) => aircraft.attributes(),
            Self::Building(structure) => structure.attributes(),
            Self::Unit(unit) => unit.attributes(),
            Self::Infantry(infantry) => infantry.attributes(),
        }
    }

    /// Handle that locates the referenced object.
    #[must_use]
    pub fn handle(&self) -> TechnoHandle {
        TechnoHandle::new(self.kind(), self.id(), self.position())
    }

    /// Clones the referenced object into an owned [`Techno`].
    #[must_use]
    pub fn to_techno(&self) -> Techno {
        match self {
            Self::Aircraft(aircraft) => Techno::Aircraft((*aircraft).clone()),
            Self::Building(structure) => Techno::Building((*structure).clone()),
            Self::Unit(unit) => Techno::Unit((*unit).clone()),
            Self::Infantry(infantry) => Techno::Infantry((*infantry).clone()),
        }
    }
}

/// Locator for a techno placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TechnoHandle {
    /// Category of the object.
    pub kind: ObjectKind,
    /// Identity of the object.
    pub id: ObjectId,
    /// Cell the object is anchored to.
    pub position: Point2D,
}

impl TechnoHandle {
    /// Creates a handle from its parts.
    #[must_use]
    pub const fn new(kind: ObjectKind, id: ObjectId, position: Point2D) -> Self {
        Self { kind, id, position }
    }
}

/// Passive terrain decoration such as a tree or rock.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainObject {
    id: ObjectId,
    position: Point2D,
    type_name: String,
}

impl TerrainObject {
    /// Creates a terrain object anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, type_name: impl Into<String>) -> Self {
        Self {
            id,
            position,
            type_name: type_name.into(),
        }
    }

    /// Rules identifier of the terrain type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Rules description of an overlay type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayType {
    /// Rules identifier of the overlay type.
    pub name: String,
    /// Whether the overlay is a harvestable resource.
    pub tiberium: bool,
}

/// Cell-anchored overlay such as a wall segment or a resource patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlay {
    id: ObjectId,
    position: Point2D,
    overlay_type: OverlayType,
    frame: u8,
}

impl Overlay {
    /// Creates an overlay anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, overlay_type: OverlayType, frame: u8) -> Self {
        Self {
            id,
            position,
            overlay_type,
            frame,
        }
    }

    /// Rules description of the overlay.
    #[must_use]
    pub fn overlay_type(&self) -> &OverlayType {
        &self.overlay_type
    }

    /// Frame index selecting the overlay's graphic.
    #[must_use]
    pub const fn frame(&self) -> u8 {
        self.frame
    }
}

/// Cell-anchored ground decal such as a crater.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Smudge {
    id: ObjectId,
    position: Point2D,
    type_name: String,
}

impl Smudge {
    /// Creates a smudge anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, type_name: impl Into<String>) -> Self {
        Self {
            id,
            position,
            type_name: type_name.into(),
        }
    }

    /// Rules identifier of the smudge type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// Numbered waypoint marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waypoint {
    id: ObjectId,
    position: Point2D,
    number: u32,
}

impl Waypoint {
    /// Creates a waypoint anchored at the provided cell.
    #[must_use]
    pub const fn new(id: ObjectId, position: Point2D, number: u32) -> Self {
        Self {
            id,
            position,
            number,
        }
    }

    /// Waypoint number referenced by scripts.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }
}

/// Opaque scripting marker attached to a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellTag {
    id: ObjectId,
    position: Point2D,
    tag: String,
}

impl CellTag {
    /// Creates a cell tag anchored at the provided cell.
    #[must_use]
    pub fn new(id: ObjectId, position: Point2D, tag: impl Into<String>) -> Self {
        Self {
            id,
            position,
            tag: tag.into(),
        }
    }

    /// Identifier of the tag this marker triggers.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl_game_object!(TerrainObject, ObjectKind::Terrain);
impl_game_object!(Overlay, ObjectKind::Overlay);
impl_game_object!(Smudge, ObjectKind::Smudge);
impl_game_object!(Waypoint, ObjectKind::Waypoint);
impl_game_object!(CellTag, ObjectKind::CellTag);
