//! Dense cell grid with typed placement and removal primitives.

use log::{debug, trace, warn};
use mapforge_core::{
    Aircraft, CellTag, GameObject, Infantry, ObjectId, ObjectKind, ObjectRef, Overlay,
    PlacementError, Point2D, Smudge, Structure, Techno, TechnoHandle, TechnoRef, TerrainObject,
    Unit, Waypoint,
};

use crate::cell::Cell;

/// Owns every cell of the map in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Map {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    next_object_id: u64,
}

/// Overlap-list entries taken out of the map together with an object.
///
/// Each entry remembers the cell and the list index it came from so that
/// [`Map::restore_overlaps`] rebuilds the lists in their original order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PurgedOverlaps(Vec<(Point2D, usize, ObjectRef)>);

impl PurgedOverlaps {
    /// Reports whether nothing was purged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of purged entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Map {
    /// Creates a map of clear-ground cells with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: blank_cells(width, height),
            next_object_id: 0,
        }
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the coordinate addresses a cell of this map.
    #[must_use]
    pub fn contains(&self, point: Point2D) -> bool {
        self.index(point).is_some()
    }

    /// Looks up the cell at the provided coordinate.
    #[must_use]
    pub fn tile(&self, point: Point2D) -> Option<&Cell> {
        self.index(point).and_then(|index| self.cells.get(index))
    }

    /// Iterator over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterator over all technos in row-major cell order.
    pub fn technos(&self) -> impl Iterator<Item = TechnoRef<'_>> {
        self.cells.iter().flat_map(Cell::technos)
    }

    /// Locates a techno by identity.
    #[must_use]
    pub fn find_techno(&self, id: ObjectId) -> Option<TechnoRef<'_>> {
        self.technos().find(|techno| techno.id() == id)
    }

    /// Hands out an identity no object on the map has carried before.
    ///
    /// Identities chosen by callers of the placement primitives are
    /// accounted for, so the allocator never repeats one of them.
    pub fn allocate_object_id(&mut self) -> Result<ObjectId, PlacementError> {
        let id = u32::try_from(self.next_object_id).map_err(|_| PlacementError::IdsExhausted)?;
        self.next_object_id += 1;
        Ok(ObjectId::new(id))
    }

    fn reserve_object_id(&mut self, id: ObjectId) {
        self.next_object_id = self.next_object_id.max(u64::from(id.get()) + 1);
    }

    /// Places an aircraft at its own position.
    pub fn place_aircraft(&mut self, aircraft: Aircraft) -> Result<(), PlacementError> {
        self.place_techno(Techno::Aircraft(aircraft))
    }

    /// Places a structure at its own position.
    pub fn place_building(&mut self, structure: Structure) -> Result<(), PlacementError> {
        self.place_techno(Techno::Building(structure))
    }

    /// Places a vehicle at its own position.
    pub fn place_unit(&mut self, unit: Unit) -> Result<(), PlacementError> {
        self.place_techno(Techno::Unit(unit))
    }

    /// Places infantry into its assigned sub-cell at its own position.
    pub fn place_infantry(&mut self, infantry: Infantry) -> Result<(), PlacementError> {
        self.place_techno(Techno::Infantry(infantry))
    }

    /// Places any techno at its own position.
    ///
    /// The target slot is re-validated; an occupied slot is reported instead
    /// of overwritten and the map is left unchanged. An identity already
    /// carried by a techno elsewhere on the map is rejected.
    pub fn place_techno(&mut self, techno: Techno) -> Result<(), PlacementError> {
        let position = techno.position();
        let handle = techno.handle();
        let duplicate = self
            .find_techno(handle.id)
            .is_some_and(|existing| existing.handle() != handle);
        let result = if duplicate {
            Err(PlacementError::DuplicateId(handle.id))
        } else {
            self.cell_mut(position)?.insert_techno(techno)
        };
        match &result {
            Ok(()) => {
                self.reserve_object_id(handle.id);
                trace!("placed {:?} {} at {}", handle.kind, handle.id.get(), position);
            }
            Err(error) => warn!("rejected placement of {:?}: {error}", handle.kind),
        }
        result
    }

    /// Removes the aircraft at the provided coordinate.
    pub fn remove_aircraft(&mut self, point: Point2D) -> Option<Aircraft> {
        let removed = self.cell_mut(point).ok()?.take_aircraft()?;
        let _ = self.purge_overlaps(removed.id());
        Some(removed)
    }

    /// Removes the structure at the provided coordinate.
    pub fn remove_building(&mut self, point: Point2D) -> Option<Structure> {
        let removed = self.cell_mut(point).ok()?.take_structure()?;
        let _ = self.purge_overlaps(removed.id());
        Some(removed)
    }

    /// Removes the vehicle at the provided coordinate.
    pub fn remove_unit(&mut self, point: Point2D) -> Option<Unit> {
        let removed = self.cell_mut(point).ok()?.take_vehicle()?;
        let _ = self.purge_overlaps(removed.id());
        Some(removed)
    }

    /// Removes the infantry with the provided identity from the cell at
    /// `point`, whichever slot it occupies.
    pub fn remove_infantry(&mut self, point: Point2D, id: ObjectId) -> Option<Infantry> {
        let removed = self.cell_mut(point).ok()?.take_infantry(id)?;
        let _ = self.purge_overlaps(id);
        Some(removed)
    }

    /// Removes the techno located by the handle.
    ///
    /// Only an occupant whose identity matches the handle is removed.
    pub fn remove_techno(&mut self, handle: TechnoHandle) -> Option<Techno> {
        self.detach_techno(handle).map(|(techno, _)| techno)
    }

    /// Removes the techno located by the handle and returns the overlap
    /// entries purged with it, so the removal can be reverted exactly.
    pub fn detach_techno(&mut self, handle: TechnoHandle) -> Option<(Techno, PurgedOverlaps)> {
        let removed = self
            .cell_mut(handle.position)
            .ok()?
            .take_techno(handle.kind, handle.id)?;
        let purged = self.purge_overlaps(handle.id);
        trace!(
            "removed {:?} {} from {}",
            handle.kind,
            handle.id.get(),
            handle.position
        );
        Some((removed, purged))
    }

    /// Puts purged overlap entries back at their original list positions.
    pub fn restore_overlaps(&mut self, purged: PurgedOverlaps) {
        for (point, index, object) in purged.0 {
            if let Ok(cell) = self.cell_mut(point) {
                cell.insert_overlap_at(index, object);
            }
        }
    }

    /// Places a terrain object at its own position.
    pub fn place_terrain_object(&mut self, terrain: TerrainObject) -> Result<(), PlacementError> {
        let id = terrain.id();
        self.cell_mut(terrain.position())?
            .insert_terrain_object(terrain)?;
        self.reserve_object_id(id);
        Ok(())
    }

    /// Removes the terrain object at the provided coordinate.
    pub fn remove_terrain_object(&mut self, point: Point2D) -> Option<TerrainObject> {
        let removed = self.cell_mut(point).ok()?.take_terrain_object()?;
        let _ = self.purge_overlaps(removed.id());
        Some(removed)
    }

    /// Places an overlay at its own position.
    pub fn place_overlay(&mut self, overlay: Overlay) -> Result<(), PlacementError> {
        let id = overlay.id();
        self.cell_mut(overlay.position())?.insert_overlay(overlay)?;
        self.reserve_object_id(id);
        Ok(())
    }

    /// Removes the overlay at the provided coordinate.
    pub fn remove_overlay(&mut self, point: Point2D) -> Option<Overlay> {
        self.cell_mut(point).ok()?.take_overlay()
    }

    /// Places a smudge at its own position.
    pub fn place_smudge(&mut self, smudge: Smudge) -> Result<(), PlacementError> {
        let id = smudge.id();
        self.cell_mut(smudge.position())?.insert_smudge(smudge)?;
        self.reserve_object_id(id);
        Ok(())
    }

    /// Removes the smudge at the provided coordinate.
    pub fn remove_smudge(&mut self, point: Point2D) -> Option<Smudge> {
        self.cell_mut(point).ok()?.take_smudge()
    }

    /// Places a waypoint at its own position.
    pub fn place_waypoint(&mut self, waypoint: Waypoint) -> Result<(), PlacementError> {
        let id = waypoint.id();
        self.cell_mut(waypoint.position())?.insert_waypoint(waypoint)?;
        self.reserve_object_id(id);
        Ok(())
    }

    /// Removes the waypoint at the provided coordinate.
    pub fn remove_waypoint(&mut self, point: Point2D) -> Option<Waypoint> {
        self.cell_mut(point).ok()?.take_waypoint()
    }

    /// Attaches a cell tag at its own position.
    pub fn place_cell_tag(&mut self, cell_tag: CellTag) -> Result<(), PlacementError> {
        let id = cell_tag.id();
        self.cell_mut(cell_tag.position())?.insert_cell_tag(cell_tag)?;
        self.reserve_object_id(id);
        Ok(())
    }

    /// Detaches the cell tag at the provided coordinate.
    pub fn remove_cell_tag(&mut self, point: Point2D) -> Option<CellTag> {
        self.cell_mut(point).ok()?.take_cell_tag()
    }

    /// Changes the tile graphic of a cell, returning the previous selection.
    pub fn change_tile(
        &mut self,
        point: Point2D,
        tile_index: u32,
        sub_tile_index: u8,
    ) -> Option<(u32, u8)> {
        let cell = self.cell_mut(point).ok()?;
        Some(cell.change_tile_index(tile_index, sub_tile_index))
    }

    /// Records that `object` draws into the cell at `point`.
    pub fn add_overlap(&mut self, point: Point2D, object: ObjectRef) {
        if let Ok(cell) = self.cell_mut(point) {
            cell.push_overlap(object);
        }
    }

    /// Drops every overlap list so the renderer can rebuild them.
    pub fn clear_overlaps(&mut self) {
        for cell in &mut self.cells {
            cell.clear_overlaps();
        }
    }

    /// Records the refresh generation in which the cell at `point` was drawn.
    pub fn mark_drawn(&mut self, point: Point2D, generation: u64) {
        if let Ok(cell) = self.cell_mut(point) {
            cell.set_last_refresh_index(generation);
        }
    }

    /// Counts objects of the provided kind across the whole map.
    #[must_use]
    pub fn count_technos(&self, kind: ObjectKind) -> usize {
        self.technos().filter(|techno| techno.kind() == kind).count()
    }

    /// Resizes the map and moves its content by `offset`.
    ///
    /// Cells and their occupants are translated together. Cells that end up
    /// outside the new bounds are dropped and returned; overlap lists are
    /// cleared for the renderer to rebuild.
    pub fn resize(&mut self, width: u32, height: u32, offset: Point2D) -> Vec<Cell> {
        let mut cells = blank_cells(width, height);
        let mut dropped = Vec::new();
        for mut cell in std::mem::take(&mut self.cells) {
            cell.shift_position(offset.x, offset.y);
            cell.shift_occupants(offset);
            cell.clear_overlaps();
            match cell_index(width, height, cell.position()) {
                Some(index) if index < cells.len() => cells[index] = cell,
                _ => dropped.push(cell),
            }
        }
        debug!(
            "resized map from {}x{} to {width}x{height}, dropped {} cells",
            self.width,
            self.height,
            dropped.len()
        );
        self.width = width;
        self.height = height;
        self.cells = cells;
        dropped
    }

    fn purge_overlaps(&mut self, id: ObjectId) -> PurgedOverlaps {
        let mut purged = Vec::new();
        for cell in &mut self.cells {
            let point = cell.position();
            purged.extend(
                cell.purge_overlap(id)
                    .into_iter()
                    .map(|(index, object)| (point, index, object)),
            );
        }
        PurgedOverlaps(purged)
    }

    fn cell_mut(&mut self, point: Point2D) -> Result<&mut Cell, PlacementError> {
        self.index(point)
            .and_then(|index| self.cells.get_mut(index))
            .ok_or(PlacementError::OutOfBounds(point))
    }

    fn index(&self, point: Point2D) -> Option<usize> {
        cell_index(self.width, self.height, point)
    }
}

fn blank_cells(width: u32, height: u32) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            cells.push(Cell::new(Point2D::new(coordinate(x), coordinate(y))));
        }
    }
    cells
}

fn cell_index(width: u32, height: u32, point: Point2D) -> Option<usize> {
    let column = u32::try_from(point.x).ok()?;
    let row = u32::try_from(point.y).ok()?;
    if column < width && row < height {
        let row = usize::try_from(row).ok()?;
        let column = usize::try_from(column).ok()?;
        let width = usize::try_from(width).ok()?;
        Some(row * width + column)
    } else {
        None
    }
}

fn coordinate(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
