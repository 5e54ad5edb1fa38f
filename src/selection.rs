use crate::cell::CellCoord;

/// Two corners of an axis-aligned cuboid. The order of the corners only matters for which end
/// keeps moving when the region is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRegion {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl SelectionRegion {
    pub fn point(coord: CellCoord) -> Self {
        Self { start: coord, end: coord }
    }

    pub fn bounds(&self) -> RegionBounds {
        RegionBounds::from_corners(self.start, self.end)
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }
}

/// Inclusive min/max per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
    pub min_z: u32,
    pub max_z: u32,
}

impl RegionBounds {
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min_x: a.x.min(b.x),
            max_x: a.x.max(b.x),
            min_y: a.y.min(b.y),
            max_y: a.y.max(b.y),
            min_z: a.z.min(b.z),
            max_z: a.z.max(b.z),
        }
    }

    pub fn min(&self) -> CellCoord {
        CellCoord::new(self.min_x, self.min_y, self.min_z)
    }

    pub fn max(&self) -> CellCoord {
        CellCoord::new(self.max_x, self.max_y, self.max_z)
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        (self.min_x..=self.max_x).contains(&coord.x)
            && (self.min_y..=self.max_y).contains(&coord.y)
            && (self.min_z..=self.max_z).contains(&coord.z)
    }

    pub fn cell_count(&self) -> u64 {
        (self.max_x - self.min_x + 1) as u64
            * (self.max_y - self.min_y + 1) as u64
            * (self.max_z - self.min_z + 1) as u64
    }

    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let b = *self;
        (b.min_z..=b.max_z).flat_map(move |z| {
            (b.min_y..=b.max_y).flat_map(move |y| (b.min_x..=b.max_x).map(move |x| CellCoord::new(x, y, z)))
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    region: Option<SelectionRegion>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(&self) -> Option<SelectionRegion> {
        self.region
    }

    pub fn start(&self) -> Option<CellCoord> {
        self.region.map(|r| r.start)
    }

    pub fn end(&self) -> Option<CellCoord> {
        self.region.map(|r| r.end)
    }

    pub fn is_active(&self) -> bool {
        self.region.is_some()
    }

    pub fn begin(&mut self, coord: CellCoord) {
        self.region = Some(SelectionRegion::point(coord));
    }

    /// Moves the end corner. With no selection this behaves like `begin`. Returns true if the end
    /// actually changed, which is what separates a drag from a click-release on the same cell.
    pub fn extend_to(&mut self, coord: CellCoord) -> bool {
        match self.region.as_mut() {
            Some(region) => {
                let changed = region.end != coord;
                region.end = coord;
                changed
            }
            None => {
                self.begin(coord);
                true
            }
        }
    }

    pub fn move_to(&mut self, coord: CellCoord) {
        self.begin(coord);
    }

    pub fn bounds(&self) -> Option<RegionBounds> {
        self.region.map(|r| r.bounds())
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.bounds().is_some_and(|b| b.contains(coord))
    }

    pub fn clear(&mut self) {
        self.region = None;
    }
}

/// Pointer drag-select bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragTracker {
    active: bool,
    moved: bool,
}

impl DragTracker {
    pub fn start(&mut self) {
        self.active = true;
        self.moved = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn note_extend(&mut self, changed: bool) {
        if self.active && changed {
            self.moved = true;
        }
    }

    /// Ends the drag and reports whether it moved; a drag that never moved is a click.
    pub fn finish(&mut self) -> bool {
        let moved = self.active && self.moved;
        self.active = false;
        self.moved = false;
        moved
    }
}
