#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Undo/redo history for map edits.
//!
//! The history owns every executed [`Mutation`]. Undoing moves a mutation to
//! the redo stack, redoing moves it back. Executing a new mutation discards
//! whatever could have been redone.

use log::{debug, warn};
use mapforge_system_mutations::{Mutation, MutationError};
use mapforge_world::MutationTarget;

/// Depth used when a history is created with a maximum depth of zero.
pub const DEFAULT_MAX_DEPTH: usize = 200;

/// Bounded undo and redo stacks of performed mutations.
#[derive(Debug)]
pub struct MutationHistory {
    undo: Vec<Box<dyn Mutation>>,
    redo: Vec<Box<dyn Mutation>>,
    max_depth: usize,
}

impl Default for MutationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl MutationHistory {
    /// Creates an empty history keeping at most `max_depth` undo entries.
    ///
    /// A depth of zero selects [`DEFAULT_MAX_DEPTH`].
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        let max_depth = if max_depth == 0 {
            DEFAULT_MAX_DEPTH
        } else {
            max_depth
        };
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Maximum number of undo entries retained.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Performs `mutation` and records it for undo.
    ///
    /// A mutation that fails to perform is dropped and nothing is recorded.
    pub fn execute(
        &mut self,
        mut mutation: Box<dyn Mutation>,
        target: &mut dyn MutationTarget,
    ) -> Result<(), MutationError> {
        if let Err(error) = mutation.perform(target) {
            warn!("{} failed: {error}", mutation.display_name());
            return Err(error);
        }

        debug!("executed {}", mutation.display_name());
        self.redo.clear();
        self.undo.push(mutation);
        if self.undo.len() > self.max_depth {
            let excess = self.undo.len() - self.max_depth;
            let _ = self.undo.drain(..excess);
        }
        Ok(())
    }

    /// Undoes the most recent mutation.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. A mutation whose
    /// undo fails stays on the undo stack.
    pub fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<bool, MutationError> {
        let Some(mut mutation) = self.undo.pop() else {
            return Ok(false);
        };
        match mutation.undo(target) {
            Ok(()) => {
                debug!("undid {}", mutation.display_name());
                self.redo.push(mutation);
                Ok(true)
            }
            Err(error) => {
                warn!("undo of {} failed: {error}", mutation.display_name());
                self.undo.push(mutation);
                Err(error)
            }
        }
    }

    /// Performs the most recently undone mutation again.
    ///
    /// Returns `Ok(false)` when there is nothing to redo. A mutation whose
    /// perform fails stays on the redo stack.
    pub fn redo(&mut self, target: &mut dyn MutationTarget) -> Result<bool, MutationError> {
        let Some(mut mutation) = self.redo.pop() else {
            return Ok(false);
        };
        match mutation.perform(target) {
            Ok(()) => {
                debug!("redid {}", mutation.display_name());
                self.undo.push(mutation);
                Ok(true)
            }
            Err(error) => {
                warn!("redo of {} failed: {error}", mutation.display_name());
                self.redo.push(mutation);
                Err(error)
            }
        }
    }

    /// Whether [`MutationHistory::undo`] has anything to do.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether [`MutationHistory::redo`] has anything to do.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable mutations.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redoable mutations.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Forgets every recorded mutation without touching the map.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Display names of undoable mutations, most recent first.
    #[must_use]
    pub fn undo_names(&self) -> Vec<String> {
        self.undo.iter().rev().map(|m| m.display_name()).collect()
    }

    /// Display names of redoable mutations, most recent first.
    #[must_use]
    pub fn redo_names(&self) -> Vec<String> {
        self.redo.iter().rev().map(|m| m.display_name()).collect()
    }
}
