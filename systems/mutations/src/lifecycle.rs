//! Perform/undo ordering shared by every mutation.

use std::fmt;

use crate::MutationError;

/// Position of a mutation in its `Created -> Performed -> (Undone ->
/// Performed)*` cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MutationState {
    /// Constructed, never performed.
    #[default]
    Created,
    /// Applied to the map.
    Performed,
    /// Applied and then reversed.
    Undone,
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Created => "created",
            Self::Performed => "performed",
            Self::Undone => "undone",
        })
    }
}

/// Entry point of the mutation contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// [`crate::Mutation::perform`].
    Perform,
    /// [`crate::Mutation::undo`].
    Undo,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Perform => "perform",
            Self::Undo => "undo",
        })
    }
}

/// Tracks and enforces the state machine of a single mutation.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Lifecycle {
    state: MutationState,
}

impl Lifecycle {
    pub(crate) const fn state(&self) -> MutationState {
        self.state
    }

    pub(crate) fn ensure_can_perform(&self) -> Result<(), MutationError> {
        match self.state {
            MutationState::Created | MutationState::Undone => Ok(()),
            MutationState::Performed => Err(self.out_of_order(Operation::Perform)),
        }
    }

    pub(crate) fn ensure_can_undo(&self) -> Result<(), MutationError> {
        match self.state {
            MutationState::Performed => Ok(()),
            MutationState::Created | MutationState::Undone => {
                Err(self.out_of_order(Operation::Undo))
            }
        }
    }

    pub(crate) fn mark_performed(&mut self) {
        self.state = MutationState::Performed;
    }

    pub(crate) fn mark_undone(&mut self) {
        self.state = MutationState::Undone;
    }

    fn out_of_order(&self, operation: Operation) -> MutationError {
        MutationError::OutOfOrder {
            operation,
            state: self.state,
        }
    }
}
