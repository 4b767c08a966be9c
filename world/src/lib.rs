#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative editor state for Mapforge.
//!
//! The [`EditorSession`] owns the single [`Map`] being edited together with
//! the [`RefreshTracker`] that tells the renderer which regions changed.
//! Renderers and adapters read through [`EditorSession::map`] and the
//! [`query`] helpers; writes happen only through the [`MutationTarget`]
//! surface handed to mutations by the undo history. Everything runs on the
//! editor's update thread; no state here is shared across threads.

mod cell;
mod map;
mod refresh;

use log::debug;
use mapforge_core::Point2D;

pub use cell::Cell;
pub use map::{Map, PurgedOverlaps};
pub use refresh::{RefreshFrame, RefreshRegion, RefreshTracker, DEFAULT_REFRESH_RADIUS};

/// Context a mutation operates against: grid access plus redraw signalling.
pub trait MutationTarget {
    /// Read-only access to the map.
    fn map(&self) -> &Map;

    /// Write access to the map.
    fn map_mut(&mut self) -> &mut Map;

    /// Requests a redraw of the region around the provided cell.
    fn add_refresh_point(&mut self, point: Point2D);

    /// Requests a redraw of the whole map.
    fn invalidate_map(&mut self);
}

/// Editing session owning the authoritative map.
#[derive(Debug)]
pub struct EditorSession {
    map: Map,
    refresh: RefreshTracker,
}

impl EditorSession {
    /// Creates a session editing a blank map of the provided size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_map(Map::new(width, height))
    }

    /// Creates a session editing an existing map.
    #[must_use]
    pub fn from_map(map: Map) -> Self {
        debug!("editing {}x{} map", map.width(), map.height());
        Self {
            map,
            refresh: RefreshTracker::new(),
        }
    }

    /// Read-only view of the map for renderers and adapters.
    #[must_use]
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Read-only view of the queued refresh state.
    #[must_use]
    pub fn refresh(&self) -> &RefreshTracker {
        &self.refresh
    }

    /// Starts a new render frame, draining queued refresh regions.
    pub fn begin_refresh_frame(&mut self) -> RefreshFrame {
        self.refresh.begin_frame()
    }

    /// Stamps the cell at `point` as drawn during `frame`.
    pub fn mark_drawn(&mut self, frame: &RefreshFrame, point: Point2D) {
        self.map.mark_drawn(point, frame.generation());
    }
}

impl MutationTarget for EditorSession {
    fn map(&self) -> &Map {
        &self.map
    }

    fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    fn add_refresh_point(&mut self, point: Point2D) {
        self.refresh.add_refresh_point(point);
    }

    fn invalidate_map(&mut self) {
        self.refresh.invalidate_all();
    }
}

/// Query functions that provide read-only access to the session state.
pub mod query {
    use mapforge_core::{ObjectId, Point2D, SubCell, TechnoHandle, TechnoRef};

    use super::{Cell, EditorSession, RefreshRegion};

    /// Looks up the cell at the provided coordinate.
    #[must_use]
    pub fn tile(session: &EditorSession, point: Point2D) -> Option<&Cell> {
        session.map.tile(point)
    }

    /// Regions queued for the next render frame.
    #[must_use]
    pub fn pending_refresh(session: &EditorSession) -> &[RefreshRegion] {
        session.refresh.pending()
    }

    /// Captures a read-only view of every techno on the map.
    #[must_use]
    pub fn techno_view(session: &EditorSession) -> TechnoView {
        let mut snapshots: Vec<TechnoSnapshot> = session
            .map
            .technos()
            .map(|techno| TechnoSnapshot {
                handle: techno.handle(),
                type_name: techno.attributes().type_name.clone(),
                owner: techno.attributes().owner.clone(),
                sub_cell: match techno {
                    TechnoRef::Infantry(infantry) => infantry.sub_cell(),
                    _ => None,
                },
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.handle.id);
        TechnoView { snapshots }
    }

    /// Read-only snapshot describing all technos on the map.
    #[derive(Clone, Debug, Default)]
    pub struct TechnoView {
        snapshots: Vec<TechnoSnapshot>,
    }

    impl TechnoView {
        /// Iterator over the captured snapshots ordered by identity.
        pub fn iter(&self) -> impl Iterator<Item = &TechnoSnapshot> {
            self.snapshots.iter()
        }

        /// Finds the snapshot of the techno with the provided identity.
        #[must_use]
        pub fn get(&self, id: ObjectId) -> Option<&TechnoSnapshot> {
            self.snapshots
                .binary_search_by_key(&id, |snapshot| snapshot.handle.id)
                .ok()
                .and_then(|index| self.snapshots.get(index))
        }

        /// Number of captured technos.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Whether the map holds no technos.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }

    /// Immutable representation of a single techno used for queries.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct TechnoSnapshot {
        /// Locator of the techno.
        pub handle: TechnoHandle,
        /// Rules identifier of the techno type.
        pub type_name: String,
        /// House owning the techno.
        pub owner: String,
        /// Sub-cell slot for infantry.
        pub sub_cell: Option<SubCell>,
    }
}
