#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reversible map edits.
//!
//! Every edit is a [`Mutation`]: a command object that captures the
//! parameters needed to apply one change to a [`MutationTarget`] and later
//! reverse it exactly. The undo history calls [`Mutation::perform`] once when
//! the edit is executed and alternates [`Mutation::undo`] and
//! [`Mutation::perform`] while the user navigates. Objects taken off the map
//! by an undo stay owned by the mutation so that redo restores the very same
//! object identity.

use std::fmt;

use mapforge_core::{ObjectKind, PlacementError, Point2D};
use mapforge_world::MutationTarget;
use thiserror::Error;

mod clone;
mod delete;
mod lifecycle;
mod move_techno;
mod placement;
mod spawn;
mod tile;

pub use clone::CloneObjectMutation;
pub use delete::DeleteObjectMutation;
pub use lifecycle::{MutationState, Operation};
pub use move_techno::MoveTechnoMutation;
pub use spawn::PlaceTechnoMutation;
pub use tile::{ChangeTileMutation, TileSelection};

/// Reversible command representing one atomic map edit.
pub trait Mutation: fmt::Debug {
    /// Short human-readable description for history listings.
    fn display_name(&self) -> String;

    /// Position of the mutation in its perform/undo cycle.
    fn state(&self) -> MutationState;

    /// Applies the edit.
    ///
    /// Legal only when the mutation was just created or undone. On error the
    /// map is left as it was and the state does not change.
    fn perform(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError>;

    /// Reverses the most recent [`Mutation::perform`].
    ///
    /// Legal only directly after a successful perform.
    fn undo(&mut self, target: &mut dyn MutationTarget) -> Result<(), MutationError>;
}

/// Failures reported by mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The mutation cannot operate on objects of this kind.
    #[error("{kind:?} objects are not supported by this mutation")]
    UnsupportedObject {
        /// Kind that was offered.
        kind: ObjectKind,
    },
    /// `perform`/`undo` was called out of order.
    #[error("cannot {operation} a mutation that is {state}")]
    OutOfOrder {
        /// Operation that was attempted.
        operation: Operation,
        /// State the mutation was in.
        state: MutationState,
    },
    /// The map refused to place an object.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// The object the mutation works on is not where it was expected.
    #[error("no {kind:?} found at {position}")]
    MissingObject {
        /// Kind that was looked for.
        kind: ObjectKind,
        /// Cell that was searched.
        position: Point2D,
    },
    /// A coordinate lies outside the map.
    #[error("position {0} lies outside the map")]
    OutOfBounds(Point2D),
}
