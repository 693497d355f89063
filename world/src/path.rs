//! Path geometry derived from the playfield viewport.

use social_defence_core::{GridCell, Viewport, WorldPoint, TILE_LENGTH};

/// Polyline the enemies traverse, fixed for a session.
///
/// The layout is regenerated only when the viewport changes. Enemies enter
/// one tile left of the playfield and exit one tile past its right edge, so
/// the leak check on the playfield boundary always fires before the final
/// waypoint is reached.
#[derive(Clone, Debug, PartialEq)]
pub struct PathLayout {
    waypoints: Vec<WorldPoint>,
}

impl PathLayout {
    /// Derives the session path from the provided playfield dimensions.
    #[must_use]
    pub(crate) fn from_viewport(viewport: Viewport) -> Self {
        let width = viewport.width();
        let height = viewport.height();
        let half = TILE_LENGTH / 2.0;

        let y1 = (height / TILE_LENGTH / 4.0).floor() * TILE_LENGTH + half;
        let x1 = (width / TILE_LENGTH / 3.0).floor() * TILE_LENGTH + half;
        let y2 = (height / TILE_LENGTH * 0.7).floor() * TILE_LENGTH + half;
        let x2 = (width / TILE_LENGTH * 0.75).floor() * TILE_LENGTH + half;
        let y3 = (height / TILE_LENGTH / 5.0).floor() * TILE_LENGTH + half;

        Self {
            waypoints: vec![
                WorldPoint::new(-TILE_LENGTH, y1),
                WorldPoint::new(x1, y1),
                WorldPoint::new(x1, y2),
                WorldPoint::new(x2, y2),
                WorldPoint::new(x2, y3),
                WorldPoint::new(width + TILE_LENGTH, y3),
            ],
        }
    }

    /// Ordered waypoints composing the polyline.
    #[must_use]
    pub fn waypoints(&self) -> &[WorldPoint] {
        &self.waypoints
    }

    /// Entry point where enemies spawn.
    #[must_use]
    pub fn start(&self) -> WorldPoint {
        self.waypoints[0]
    }

    /// Reports whether the cell overlaps the path corridor.
    ///
    /// Each segment's bounding box is inflated by half a tile, matching the
    /// corridor the path ribbon occupies on screen.
    #[must_use]
    pub fn blocks_cell(&self, cell: GridCell) -> bool {
        let center = cell.center();
        let half = TILE_LENGTH / 2.0;

        self.waypoints.windows(2).any(|segment| {
            let (a, b) = (segment[0], segment[1]);
            center.x() > a.x().min(b.x()) - half
                && center.x() < a.x().max(b.x()) + half
                && center.y() > a.y().min(b.y()) - half
                && center.y() < a.y().max(b.y()) + half
        })
    }
}
