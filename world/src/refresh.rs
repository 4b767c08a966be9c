//! Generation-based redraw bookkeeping consumed by the renderer.

use log::trace;
use mapforge_core::Point2D;

use crate::cell::Cell;

/// Radius, in cells, of the region invalidated around a refresh point.
pub const DEFAULT_REFRESH_RADIUS: u32 = 10;

/// Square region of cells that must be redrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefreshRegion {
    center: Point2D,
    radius: u32,
}

impl RefreshRegion {
    /// Creates a region covering every cell within `radius` of `center`.
    #[must_use]
    pub const fn new(center: Point2D, radius: u32) -> Self {
        Self { center, radius }
    }

    /// Cell the region is centred on.
    #[must_use]
    pub const fn center(&self) -> Point2D {
        self.center
    }

    /// Chebyshev radius of the region.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Reports whether the region covers the provided cell.
    #[must_use]
    pub fn contains(&self, point: Point2D) -> bool {
        self.center.chebyshev_distance(point) <= self.radius
    }
}

/// Regions collected since the previous frame, stamped with a generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshFrame {
    generation: u64,
    regions: Vec<RefreshRegion>,
    full_redraw: bool,
}

impl RefreshFrame {
    /// Generation number of the frame.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Regions invalidated since the previous frame.
    #[must_use]
    pub fn regions(&self) -> &[RefreshRegion] {
        &self.regions
    }

    /// Whether the whole map must be redrawn.
    #[must_use]
    pub const fn full_redraw(&self) -> bool {
        self.full_redraw
    }

    /// Reports whether the cell must be drawn during this frame.
    ///
    /// Cells already stamped with this frame's generation are skipped.
    #[must_use]
    pub fn needs_redraw(&self, cell: &Cell) -> bool {
        if cell.last_refresh_index() == self.generation {
            return false;
        }
        self.full_redraw
            || self
                .regions
                .iter()
                .any(|region| region.contains(cell.position()))
    }
}

/// Accumulates invalidated regions between frames.
#[derive(Debug)]
pub struct RefreshTracker {
    generation: u64,
    pending: Vec<RefreshRegion>,
    full_redraw: bool,
}

impl Default for RefreshTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshTracker {
    /// Creates a tracker whose first frame redraws the whole map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            generation: 0,
            pending: Vec::new(),
            full_redraw: true,
        }
    }

    /// Generation of the most recently started frame.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Regions queued for the next frame.
    #[must_use]
    pub fn pending(&self) -> &[RefreshRegion] {
        &self.pending
    }

    /// Reports whether the next frame redraws the whole map.
    #[must_use]
    pub const fn full_redraw_pending(&self) -> bool {
        self.full_redraw
    }

    /// Queues a default-sized region around the provided cell.
    pub fn add_refresh_point(&mut self, point: Point2D) {
        self.add_refresh_region(RefreshRegion::new(point, DEFAULT_REFRESH_RADIUS));
    }

    /// Queues an explicit region.
    pub fn add_refresh_region(&mut self, region: RefreshRegion) {
        if self.pending.contains(&region) {
            return;
        }
        trace!(
            "refresh queued around {} (radius {})",
            region.center(),
            region.radius()
        );
        self.pending.push(region);
    }

    /// Requests a full redraw on the next frame.
    pub fn invalidate_all(&mut self) {
        self.full_redraw = true;
    }

    /// Starts a new frame, draining everything queued so far.
    pub fn begin_frame(&mut self) -> RefreshFrame {
        self.generation = self.generation.wrapping_add(1);
        RefreshFrame {
            generation: self.generation,
            regions: std::mem::take(&mut self.pending),
            full_redraw: std::mem::replace(&mut self.full_redraw, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_contains_uses_chebyshev_distance() {
        let region = RefreshRegion::new(Point2D::new(5, 5), 2);
        assert!(region.contains(Point2D::new(7, 3)));
        assert!(!region.contains(Point2D::new(8, 5)));
    }

    #[test]
    fn first_frame_is_a_full_redraw() {
        let mut tracker = RefreshTracker::new();
        let frame = tracker.begin_frame();
        assert!(frame.full_redraw());
        assert_eq!(frame.generation(), 1);
        assert!(frame.needs_redraw(&Cell::new(Point2D::new(40, 40))));

        let next = tracker.begin_frame();
        assert!(!next.full_redraw());
        assert!(!next.needs_redraw(&Cell::new(Point2D::new(40, 40))));
    }

    #[test]
    fn refresh_points_are_drained_once() {
        let mut tracker = RefreshTracker::new();
        let _ = tracker.begin_frame();

        tracker.add_refresh_point(Point2D::new(3, 3));
        tracker.add_refresh_point(Point2D::new(3, 3));
        assert_eq!(tracker.pending().len(), 1);

        let frame = tracker.begin_frame();
        assert_eq!(frame.regions().len(), 1);
        assert!(frame.needs_redraw(&Cell::new(Point2D::new(12, 3))));
        assert!(!frame.needs_redraw(&Cell::new(Point2D::new(14, 3))));
        assert!(tracker.pending().is_empty());
    }

    #[test]
    fn cells_stamped_with_current_generation_are_skipped() {
        let mut tracker = RefreshTracker::new();
        let frame = tracker.begin_frame();
        let mut cell = Cell::new(Point2D::new(0, 0));
        cell.set_last_refresh_index(frame.generation());
        assert!(!frame.needs_redraw(&cell));
    }

    #[test]
    fn invalidate_all_forces_full_redraw() {
        let mut tracker = RefreshTracker::new();
        let _ = tracker.begin_frame();
        tracker.invalidate_all();
        assert!(tracker.full_redraw_pending());
        assert!(tracker.begin_frame().full_redraw());
    }
}
