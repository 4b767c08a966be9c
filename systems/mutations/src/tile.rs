//! Painting tile graphics.

use log::debug;
use mapforge_core::Point2D;
use mapforge_world::MutationTarget;

use crate::{lifecycle::Lifecycle, Mutation, MutationError, MutationState};

/// Tile graphic chosen for a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TileSelection {
    /// Index of the tile graphic; zero is clear ground.
    pub tile_index: u32,
    /// Sub-tile within the tile graphic.
    pub sub_tile_index: u8,
}

impl TileSelection {
    /// Creates a selection from its parts.
    #[must_use]
    pub const fn new(tile_index: u32, sub_tile_index: u8) -> Self {
        Self {
            tile_index,
            sub_tile_index,
        }
    }
}

/// Changes the tile graphic of one or more cells.
#[derive(Debug)]
pub struct ChangeTileMutation {
    changes: Vec<(Point2D, TileSelection)>,
    previous: Vec<(Point2D, TileSelection)>,
    lifecycle: Lifecycle,
}

impl ChangeTileMutation {
    /// Creates a mutation applying `changes` in order.
    #[must_use]
    pub fn new(changes: Vec<(Point2D, TileSelection)>) -> Self {
        Self {
            changes,
            previous: Vec::new(),
            lifecycle: Lifecycle::default(),
        }
    }

    fn write(
        target: &mut dyn MutationTarget,
        changes: impl Iterator<Item = (Point2D, TileSelection)>,
    ) -> Result<Vec<(Point2D, TileSelection)>, MutationError> {
        let changes: Vec<_> = changes.collect();
        if let Some((point, _)) = changes
            .iter()
            .find(|(point, _)| !target.map().contains(*point))
        {
            return Err(MutationError::OutOfBounds(*point));
        }

        let mut replaced = Vec::with_capacity(changes.len());
        for (point, selection) in changes {
            if let Some((tile_index, sub_tile_index)) =
                target
                    .map_mut()
                    .change_tile(point, selection.tile_index, selection.sub_tile_index)
            {
                replaced.push((point, TileSelection::new(tile_index, sub_tile_index)));
            }
            target.add_refresh_point(point);
        }
        Ok(replaced)
    }
}

impl Mutation for ChangeTileMutation {
    fn display_name(&self) -> String {
        match self.changes.as_slice() {
            [(point, selection)] => format!("Paint tile {} at {}", selection.tile_index, point),
            changes => format!("Paint {} tiles", changes.len()),
        }
    }

    fn state(&self) -> MutationState {
        self.lifecycle.state()
    }

    fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_perform()?;
        self.previous = Self::write(target, self.changes.iter().copied())?;
        debug!("painted {} tiles", self.changes.len());
        self.lifecycle.mark_performed();
        Ok(())
    }

    fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError> {
        self.lifecycle.ensure_can_undo()?;
        // Reverse order so a cell painted twice ends on its original tile.
        let _ = Self::write(target, self.previous.iter().rev().copied())?;
        debug!("restored {} tiles", self.previous.len());
        self.previous.clear();
        self.lifecycle.mark_undone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapforge_world::EditorSession;

    #[test]
    fn repeated_cells_are_restored_to_their_first_value() {
        let mut session = EditorSession::new(4, 4);
        let point = Point2D::new(2, 2);
        let mut mutation = ChangeTileMutation::new(vec![
            (point, TileSelection::new(10, 1)),
            (point, TileSelection::new(20, 2)),
        ]);

        mutation.perform(&mut session).expect("in bounds");
        assert_eq!(session.map().tile(point).map(|cell| cell.tile_index()), Some(20));

        mutation.undo(&mut session).expect("performed");
        let cell = session.map().tile(point).expect("cell in bounds");
        assert!(cell.is_clear_ground());
        assert_eq!(cell.sub_tile_index(), 0);
    }

    #[test]
    fn out_of_bounds_change_leaves_map_untouched() {
        let mut session = EditorSession::new(4, 4);
        let before = session.map().clone();
        let mut mutation = ChangeTileMutation::new(vec![
            (Point2D::new(0, 0), TileSelection::new(3, 0)),
            (Point2D::new(4, 0), TileSelection::new(3, 0)),
        ]);

        assert_eq!(
            mutation.perform(&mut session),
            Err(MutationError::OutOfBounds(Point2D::new(4, 0)))
        );
        assert_eq!(session.map(), &before);
        assert_eq!(mutation.state(), MutationState::Created);
    }

    #[test]
    fn display_name_summarises_brush() {
        let single = ChangeTileMutation::new(vec![(Point2D::new(1, 2), TileSelection::new(7, 0))]);
        assert_eq!(single.display_name(), "Paint tile 7 at (1, 2)");

        let brush = ChangeTileMutation::new(vec![
            (Point2D::new(0, 0), TileSelection::default()),
            (Point2D::new(1, 0), TileSelection::default()),
        ]);
        assert_eq!(brush.display_name(), "Paint 2 tiles");
    }
}
