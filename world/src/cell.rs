//! Per-cell storage for terrain, decorations and technos.

use mapforge_core::{
    Aircraft, CellTag, GameObject, Infantry, ObjectId, ObjectKind, ObjectRef, Overlay,
    PlacementError, Point2D, Smudge, Structure, SubCell, Techno, TechnoRef, TerrainObject, Unit,
    Waypoint, SUB_CELL_COUNT,
};

/// A single grid location and everything placed on it.
///
/// Each category slot holds at most one occupant, except infantry which is
/// keyed by [`SubCell`]. The cell owns its occupants; they leave the cell only
/// by being moved out through the map's removal primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    position: Point2D,
    tile_index: u32,
    sub_tile_index: u8,
    terrain_object: Option<TerrainObject>,
    structure: Option<Structure>,
    vehicle: Option<Unit>,
    aircraft: Option<Aircraft>,
    infantry: [Option<Infantry>; SUB_CELL_COUNT],
    overlay: Option<Overlay>,
    smudge: Option<Smudge>,
    waypoint: Option<Waypoint>,
    cell_tag: Option<CellTag>,
    overlap_list: Vec<ObjectRef>,
    last_refresh_index: u64,
}

impl Cell {
    /// Creates an empty clear-ground cell at the provided coordinate.
    #[must_use]
    pub fn new(position: Point2D) -> Self {
        Self {
            position,
            tile_index: 0,
            sub_tile_index: 0,
            terrain_object: None,
            structure: None,
            vehicle: None,
            aircraft: None,
            infantry: Default::default(),
            overlay: None,
            smudge: None,
            waypoint: None,
            cell_tag: None,
            overlap_list: Vec::new(),
            last_refresh_index: 0,
        }
    }

    /// Coordinate of the cell.
    #[must_use]
    pub const fn position(&self) -> Point2D {
        self.position
    }

    /// Index of the tile graphic drawn for this cell.
    #[must_use]
    pub const fn tile_index(&self) -> u32 {
        self.tile_index
    }

    /// Sub-tile within the tile graphic.
    #[must_use]
    pub const fn sub_tile_index(&self) -> u8 {
        self.sub_tile_index
    }

    /// Terrain decoration occupying the cell.
    #[must_use]
    pub fn terrain_object(&self) -> Option<&TerrainObject> {
        self.terrain_object.as_ref()
    }

    /// Structure occupying the cell.
    #[must_use]
    pub fn structure(&self) -> Option<&Structure> {
        self.structure.as_ref()
    }

    /// Vehicle occupying the cell.
    #[must_use]
    pub fn vehicle(&self) -> Option<&Unit> {
        self.vehicle.as_ref()
    }

    /// Aircraft occupying the cell.
    #[must_use]
    pub fn aircraft(&self) -> Option<&Aircraft> {
        self.aircraft.as_ref()
    }

    /// Overlay anchored to the cell.
    #[must_use]
    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Smudge anchored to the cell.
    #[must_use]
    pub fn smudge(&self) -> Option<&Smudge> {
        self.smudge.as_ref()
    }

    /// Waypoint placed on the cell.
    #[must_use]
    pub fn waypoint(&self) -> Option<&Waypoint> {
        self.waypoint.as_ref()
    }

    /// Scripting marker attached to the cell.
    #[must_use]
    pub fn cell_tag(&self) -> Option<&CellTag> {
        self.cell_tag.as_ref()
    }

    /// Objects whose graphics bleed into this cell's draw region.
    #[must_use]
    pub fn overlap_list(&self) -> &[ObjectRef] {
        &self.overlap_list
    }

    /// Refresh generation in which the cell was last drawn.
    #[must_use]
    pub const fn last_refresh_index(&self) -> u64 {
        self.last_refresh_index
    }

    /// Infantry occupying the provided slot.
    #[must_use]
    pub fn infantry_at(&self, sub_cell: SubCell) -> Option<&Infantry> {
        self.infantry[sub_cell.index()].as_ref()
    }

    /// Iterator over every occupied infantry slot in storage order.
    pub fn infantry(&self) -> impl Iterator<Item = &Infantry> {
        self.infantry.iter().flatten()
    }

    /// First free slot for new infantry: bottom, then left, then right.
    #[must_use]
    pub fn free_sub_cell_spot(&self) -> Option<SubCell> {
        SubCell::FREE_SPOT_PRECEDENCE
            .into_iter()
            .find(|slot| self.infantry_at(*slot).is_none())
    }

    /// First infantry in storage order.
    #[must_use]
    pub fn first_infantry(&self) -> Option<&Infantry> {
        self.infantry().next()
    }

    /// Determines whether the provided object can be assigned to this cell.
    ///
    /// A structure may be re-placed onto a cell it already occupies.
    #[must_use]
    pub fn can_add_object<O>(&self, object: &O) -> bool
    where
        O: GameObject + ?Sized,
    {
        match object.kind() {
            ObjectKind::Aircraft => self.aircraft.is_none(),
            ObjectKind::Building => self
                .structure
                .as_ref()
                .map_or(true, |structure| structure.id() == object.id()),
            ObjectKind::Unit => self.vehicle.is_none(),
            ObjectKind::Infantry => self.free_sub_cell_spot().is_some(),
            ObjectKind::Terrain => self.terrain_object.is_none(),
            ObjectKind::Overlay
            | ObjectKind::Smudge
            | ObjectKind::Waypoint
            | ObjectKind::CellTag => false,
        }
    }

    /// Iterator over technos in scan order: structure, vehicle, aircraft,
    /// then infantry slots in storage order.
    pub fn technos(&self) -> impl Iterator<Item = TechnoRef<'_>> {
        self.structure
            .iter()
            .map(TechnoRef::Building)
            .chain(self.vehicle.iter().map(TechnoRef::Unit))
            .chain(self.aircraft.iter().map(TechnoRef::Aircraft))
            .chain(self.infantry().map(TechnoRef::Infantry))
    }

    /// First techno in scan order.
    #[must_use]
    pub fn techno(&self) -> Option<TechnoRef<'_>> {
        self.technos().next()
    }

    /// First techno in scan order accepted by the predicate.
    #[must_use]
    pub fn first_techno_matching<F>(&self, mut predicate: F) -> Option<TechnoRef<'_>>
    where
        F: FnMut(&TechnoRef<'_>) -> bool,
    {
        self.technos().find(|techno| predicate(techno))
    }

    /// Reports whether any techno is accepted by the predicate.
    #[must_use]
    pub fn has_techno_matching<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&TechnoRef<'_>) -> bool,
    {
        self.first_techno_matching(predicate).is_some()
    }

    /// Primary object of the cell: the first techno, else the terrain object.
    #[must_use]
    pub fn object(&self) -> Option<ObjectRef> {
        self.techno()
            .map(|techno| ObjectRef::new(techno.id(), techno.kind()))
            .or_else(|| {
                self.terrain_object
                    .as_ref()
                    .map(|terrain| ObjectRef::new(terrain.id(), terrain.kind()))
            })
    }

    /// Reports whether any techno occupies the cell.
    #[must_use]
    pub fn has_techno(&self) -> bool {
        self.techno().is_some()
    }

    /// Reports whether the overlay is a harvestable resource.
    #[must_use]
    pub fn has_tiberium(&self) -> bool {
        self.overlay
            .as_ref()
            .is_some_and(|overlay| overlay.overlay_type().tiberium)
    }

    /// Reports whether the cell shows the default clear ground tile.
    #[must_use]
    pub const fn is_clear_ground(&self) -> bool {
        self.tile_index == 0
    }

    /// Reports whether the referenced object is stored in this cell.
    #[must_use]
    pub fn contains_object(&self, object: ObjectRef) -> bool {
        let id = object.id;
        match object.kind {
            ObjectKind::Aircraft => self.aircraft.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Building => self.structure.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Unit => self.vehicle.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Infantry => self.infantry().any(|o| o.id() == id),
            ObjectKind::Terrain => self.terrain_object.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Overlay => self.overlay.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Smudge => self.smudge.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::Waypoint => self.waypoint.as_ref().is_some_and(|o| o.id() == id),
            ObjectKind::CellTag => self.cell_tag.as_ref().is_some_and(|o| o.id() == id),
        }
    }

    /// Appends the structure and vehicle of this cell to `out`.
    pub fn collect_objects(&self, out: &mut Vec<ObjectRef>) {
        if let Some(structure) = &self.structure {
            out.push(ObjectRef::new(structure.id(), structure.kind()));
        }
        if let Some(vehicle) = &self.vehicle {
            out.push(ObjectRef::new(vehicle.id(), vehicle.kind()));
        }
    }

    /// Translates the cell coordinate together with its overlay and smudge.
    ///
    /// Technos keep their own positions.
    pub(crate) fn shift_position(&mut self, dx: i32, dy: i32) {
        let delta = Point2D::new(dx, dy);
        self.position += delta;

        if let Some(overlay) = self.overlay.as_mut() {
            let shifted = overlay.position() + delta;
            overlay.set_position(shifted);
        }

        if let Some(smudge) = self.smudge.as_mut() {
            let shifted = smudge.position() + delta;
            smudge.set_position(shifted);
        }
    }

    /// Translates every object that tracks its own position: technos,
    /// the terrain object, the waypoint and the cell tag.
    pub(crate) fn shift_occupants(&mut self, delta: Point2D) {
        fn shift<O: GameObject>(object: &mut O, delta: Point2D) {
            let shifted = object.position() + delta;
            object.set_position(shifted);
        }

        if let Some(terrain) = self.terrain_object.as_mut() {
            shift(terrain, delta);
        }
        if let Some(structure) = self.structure.as_mut() {
            shift(structure, delta);
        }
        if let Some(vehicle) = self.vehicle.as_mut() {
            shift(vehicle, delta);
        }
        if let Some(aircraft) = self.aircraft.as_mut() {
            shift(aircraft, delta);
        }
        for infantry in self.infantry.iter_mut().flatten() {
            shift(infantry, delta);
        }
        if let Some(waypoint) = self.waypoint.as_mut() {
            shift(waypoint, delta);
        }
        if let Some(cell_tag) = self.cell_tag.as_mut() {
            shift(cell_tag, delta);
        }
    }

    pub(crate) fn change_tile_index(&mut self, tile_index: u32, sub_tile_index: u8) -> (u32, u8) {
        let previous = (self.tile_index, self.sub_tile_index);
        self.tile_index = tile_index;
        self.sub_tile_index = sub_tile_index;
        previous
    }

    pub(crate) fn set_last_refresh_index(&mut self, generation: u64) {
        self.last_refresh_index = generation;
    }

    pub(crate) fn insert_techno(&mut self, techno: Techno) -> Result<(), PlacementError> {
        let position = self.position;
        if !self.can_accept_techno(&techno) {
            return Err(match techno {
                Techno::Infantry(ref infantry) => match infantry.sub_cell() {
                    None => PlacementError::MissingSubCell(infantry.id()),
                    Some(_) if self.holds_infantry(infantry.id()) => PlacementError::Occupied {
                        kind: ObjectKind::Infantry,
                        position,
                    },
                    Some(sub_cell) => PlacementError::SubCellTaken { position, sub_cell },
                },
                other => PlacementError::Occupied {
                    kind: other.kind(),
                    position,
                },
            });
        }

        match techno {
            Techno::Aircraft(aircraft) => self.aircraft = Some(aircraft),
            Techno::Building(structure) => self.structure = Some(structure),
            Techno::Unit(unit) => self.vehicle = Some(unit),
            Techno::Infantry(infantry) => {
                if let Some(sub_cell) = infantry.sub_cell() {
                    self.infantry[sub_cell.index()] = Some(infantry);
                }
            }
        }
        Ok(())
    }

    fn can_accept_techno(&self, techno: &Techno) -> bool {
        match techno {
            Techno::Infantry(infantry) => {
                let Some(sub_cell) = infantry.sub_cell() else {
                    return false;
                };
                self.infantry_at(sub_cell).is_none() && !self.holds_infantry(infantry.id())
            }
            other => self.can_add_object(other),
        }
    }

    fn holds_infantry(&self, id: ObjectId) -> bool {
        self.contains_object(ObjectRef::new(id, ObjectKind::Infantry))
    }

    pub(crate) fn take_aircraft(&mut self) -> Option<Aircraft> {
        self.aircraft.take()
    }

    pub(crate) fn take_structure(&mut self) -> Option<Structure> {
        self.structure.take()
    }

    pub(crate) fn take_vehicle(&mut self) -> Option<Unit> {
        self.vehicle.take()
    }

    pub(crate) fn take_infantry(&mut self, id: ObjectId) -> Option<Infantry> {
        self.infantry
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|infantry| infantry.id() == id))
            .and_then(Option::take)
    }

    /// Removes the techno with the provided identity, leaving other
    /// occupants of the same category untouched.
    pub(crate) fn take_techno(&mut self, kind: ObjectKind, id: ObjectId) -> Option<Techno> {
        match kind {
            ObjectKind::Aircraft if self.aircraft.as_ref().is_some_and(|o| o.id() == id) => {
                self.take_aircraft().map(Techno::Aircraft)
            }
            ObjectKind::Building if self.structure.as_ref().is_some_and(|o| o.id() == id) => {
                self.take_structure().map(Techno::Building)
            }
            ObjectKind::Unit if self.vehicle.as_ref().is_some_and(|o| o.id() == id) => {
                self.take_vehicle().map(Techno::Unit)
            }
            ObjectKind::Infantry => self.take_infantry(id).map(Techno::Infantry),
            _ => None,
        }
    }

    pub(crate) fn insert_terrain_object(
        &mut self,
        terrain: TerrainObject,
    ) -> Result<(), PlacementError> {
        if !self.can_add_object(&terrain) {
            return Err(self.occupied(ObjectKind::Terrain));
        }
        self.terrain_object = Some(terrain);
        Ok(())
    }

    pub(crate) fn take_terrain_object(&mut self) -> Option<TerrainObject> {
        self.terrain_object.take()
    }

    pub(crate) fn insert_overlay(&mut self, overlay: Overlay) -> Result<(), PlacementError> {
        if self.overlay.is_some() {
            return Err(self.occupied(ObjectKind::Overlay));
        }
        self.overlay = Some(overlay);
        Ok(())
    }

    pub(crate) fn take_overlay(&mut self) -> Option<Overlay> {
        self.overlay.take()
    }

    pub(crate) fn insert_smudge(&mut self, smudge: Smudge) -> Result<(), PlacementError> {
        if self.smudge.is_some() {
            return Err(self.occupied(ObjectKind::Smudge));
        }
        self.smudge = Some(smudge);
        Ok(())
    }

    pub(crate) fn take_smudge(&mut self) -> Option<Smudge> {
        self.smudge.take()
    }

    pub(crate) fn insert_waypoint(&mut self, waypoint: Waypoint) -> Result<(), PlacementError> {
        if self.waypoint.is_some() {
            return Err(self.occupied(ObjectKind::Waypoint));
        }
        self.waypoint = Some(waypoint);
        Ok(())
    }

    pub(crate) fn take_waypoint(&mut self) -> Option<Waypoint> {
        self.waypoint.take()
    }

    pub(crate) fn insert_cell_tag(&mut self, cell_tag: CellTag) -> Result<(), PlacementError> {
        if self.cell_tag.is_some() {
            return Err(self.occupied(ObjectKind::CellTag));
        }
        self.cell_tag = Some(cell_tag);
        Ok(())
    }

    pub(crate) fn take_cell_tag(&mut self) -> Option<CellTag> {
        self.cell_tag.take()
    }

    pub(crate) fn push_overlap(&mut self, object: ObjectRef) {
        if !self.overlap_list.contains(&object) {
            self.overlap_list.push(object);
        }
    }

    pub(crate) fn clear_overlaps(&mut self) {
        self.overlap_list.clear();
    }

    /// Drops every overlap entry of `id`, returning each with the index it
    /// held in the original list.
    pub(crate) fn purge_overlap(&mut self, id: ObjectId) -> Vec<(usize, ObjectRef)> {
        let purged: Vec<_> = self
            .overlap_list
            .iter()
            .enumerate()
            .filter(|(_, object)| object.id == id)
            .map(|(index, object)| (index, *object))
            .collect();
        if !purged.is_empty() {
            self.overlap_list.retain(|object| object.id != id);
        }
        purged
    }

    /// Inserts an overlap entry at `index`, or appends it when the list has
    /// become shorter.
    pub(crate) fn insert_overlap_at(&mut self, index: usize, object: ObjectRef) {
        if self.overlap_list.contains(&object) {
            return;
        }
        let index = index.min(self.overlap_list.len());
        self.overlap_list.insert(index, object);
    }

    fn occupied(&self, kind: ObjectKind) -> PlacementError {
        PlacementError::Occupied {
            kind,
            position: self.position,
        }
    }
}
